//! Open-event payload enrichment.

use crate::domain::collaborators::PayloadEnricher;
use crate::domain::entities::{EmailOpenMessage, RequestContext};

/// Copies selected request headers into the payload's custom values.
///
/// Headers absent from the request are skipped.
pub struct HeaderCaptureEnricher {
    headers: Vec<String>,
}

impl HeaderCaptureEnricher {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }
}

impl PayloadEnricher for HeaderCaptureEnricher {
    fn enrich(&self, payload: &mut EmailOpenMessage, request: &RequestContext) {
        for name in &self.headers {
            if let Some(value) = request.header(name) {
                payload
                    .custom_values
                    .insert(name.clone(), value.to_string());
            }
        }
    }
}
