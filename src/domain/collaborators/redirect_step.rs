//! Resolution pipeline step contract.

use async_trait::async_trait;
use url::Url;

use crate::domain::entities::{EventData, QueryParams};

/// Arguments shared by every step of the redirect pipeline.
///
/// Steps read the inputs and set [`redirect_to`](Self::redirect_to).
#[derive(Debug, Clone)]
pub struct RedirectUrlArgs {
    pub event_data: EventData,
    pub query: QueryParams,
    pub original_link: String,
    pub session_active: bool,
    pub redirect_to: Option<Url>,
}

impl RedirectUrlArgs {
    pub fn new(
        event_data: EventData,
        query: QueryParams,
        original_link: String,
        session_active: bool,
    ) -> Self {
        Self {
            event_data,
            query,
            original_link,
            session_active,
            redirect_to: None,
        }
    }
}

/// What the pipeline does after a step returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    Continue,
    Abort,
}

/// One ordered step of the redirect resolution pipeline.
///
/// Steps must not fail for recoverable conditions: leaving `redirect_to`
/// unset is a valid outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectStep: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn process(&self, args: &mut RedirectUrlArgs) -> StepFlow;
}
