//! Built-in redirect pipeline steps.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::warn;
use url::Url;

use crate::domain::collaborators::{RedirectStep, RedirectUrlArgs, StepFlow};

/// Parses the original link as the initial redirect target.
///
/// Only absolute `http` and `https` URLs are accepted. Anything else aborts
/// the pipeline, leaving no result.
pub struct ParseTargetStep;

#[async_trait]
impl RedirectStep for ParseTargetStep {
    fn name(&self) -> &'static str {
        "parse_target"
    }

    async fn process(&self, args: &mut RedirectUrlArgs) -> StepFlow {
        match Url::parse(&args.original_link) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                args.redirect_to = Some(url);
                StepFlow::Continue
            }
            Ok(url) => {
                warn!("Tracked link has unsupported scheme '{}'", url.scheme());
                StepFlow::Abort
            }
            Err(e) => {
                warn!("Tracked link is not an absolute URL: {}", e);
                StepFlow::Abort
            }
        }
    }
}

/// Copies click query parameters with configured prefixes onto the target.
///
/// Parameters already present on the target are left untouched.
pub struct ForwardQueryStep {
    prefixes: Vec<String>,
}

impl ForwardQueryStep {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    fn forwards(&self, key: &str) -> bool {
        self.prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

#[async_trait]
impl RedirectStep for ForwardQueryStep {
    fn name(&self) -> &'static str {
        "forward_query"
    }

    async fn process(&self, args: &mut RedirectUrlArgs) -> StepFlow {
        let Some(target) = args.redirect_to.as_mut() else {
            return StepFlow::Continue;
        };

        let existing: HashSet<String> = target.query_pairs().map(|(k, _)| k.into_owned()).collect();

        let forwarded: Vec<(&str, &str)> = args
            .query
            .iter()
            .filter(|(k, _)| self.forwards(k) && !existing.contains(*k))
            .collect();

        if !forwarded.is_empty() {
            target.query_pairs_mut().extend_pairs(forwarded);
        }

        StepFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ClickEvent, EventData, QueryParams, TrackedMessage};
    use uuid::Uuid;

    fn args(link: &str, query: &str) -> RedirectUrlArgs {
        let message = TrackedMessage {
            message_id: Uuid::new_v4(),
            target_language: "en".to_string(),
            test_value_index: None,
            email_address_history_entry_id: None,
        };

        RedirectUrlArgs::new(
            EventData::new(None, ClickEvent::for_message(&message)),
            QueryParams::parse(Some(query)),
            link.to_string(),
            false,
        )
    }

    #[tokio::test]
    async fn test_parse_accepts_http_urls() {
        let mut args = args("https://example.com/page?a=1", "");

        assert_eq!(ParseTargetStep.process(&mut args).await, StepFlow::Continue);
        assert_eq!(
            args.redirect_to.unwrap().as_str(),
            "https://example.com/page?a=1"
        );
    }

    #[tokio::test]
    async fn test_parse_rejects_relative_and_other_schemes() {
        let mut relative = args("/page", "");
        assert_eq!(ParseTargetStep.process(&mut relative).await, StepFlow::Abort);
        assert!(relative.redirect_to.is_none());

        let mut script = args("javascript:alert(1)", "");
        assert_eq!(ParseTargetStep.process(&mut script).await, StepFlow::Abort);
        assert!(script.redirect_to.is_none());
    }

    #[tokio::test]
    async fn test_forward_appends_matching_params() {
        let step = ForwardQueryStep::new(["utm_"]);
        let mut args = args(
            "https://example.com/page?a=1",
            "ec_url=x&utm_source=mail&utm_medium=email&other=1",
        );
        args.redirect_to = Some(Url::parse("https://example.com/page?a=1").unwrap());

        assert_eq!(step.process(&mut args).await, StepFlow::Continue);
        assert_eq!(
            args.redirect_to.unwrap().as_str(),
            "https://example.com/page?a=1&utm_source=mail&utm_medium=email"
        );
    }

    #[tokio::test]
    async fn test_forward_keeps_existing_params() {
        let step = ForwardQueryStep::new(["utm_"]);
        let mut args = args("", "utm_source=mail");
        args.redirect_to = Some(Url::parse("https://example.com/?utm_source=site").unwrap());

        step.process(&mut args).await;

        assert_eq!(
            args.redirect_to.unwrap().as_str(),
            "https://example.com/?utm_source=site"
        );
    }

    #[tokio::test]
    async fn test_forward_without_target_is_noop() {
        let step = ForwardQueryStep::new(["utm_"]);
        let mut args = args("", "utm_source=mail");

        assert_eq!(step.process(&mut args).await, StepFlow::Continue);
        assert!(args.redirect_to.is_none());
    }

    #[tokio::test]
    async fn test_forward_without_matches_leaves_url_unchanged() {
        let step = ForwardQueryStep::new(["utm_"]);
        let mut args = args("", "other=1");
        args.redirect_to = Some(Url::parse("https://example.com/page").unwrap());

        step.process(&mut args).await;

        assert_eq!(args.redirect_to.unwrap().as_str(), "https://example.com/page");
    }
}
