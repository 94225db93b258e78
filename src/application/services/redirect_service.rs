//! Tracked click orchestration.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::open_registrar::{OpenEventRegistrar, RegistrationOutcome};
use super::redirect_resolver::RedirectResolver;
use crate::domain::collaborators::{AnalyticsTracker, RedirectUrlArgs, RobotFilter};
use crate::domain::entities::{
    ClickEvent, ContactIdentifier, EventData, QueryParams, RequestContext, TrackedMessage,
};

/// Query parameter carrying the original destination of a tracked link.
pub const LINK_PARAM: &str = "ec_url";

/// Name of the resolution pipeline, used in logs.
pub const PIPELINE_NAME: &str = "redirectUrl";

/// Default bound on a full pipeline run.
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(2);

/// Input errors of a tracked click.
///
/// Both are caught inside [`RedirectService::handle`] and turned into a
/// failure redirect.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("The '{0}' query string parameter is empty.")]
    MissingLink(&'static str),

    #[error("The context message is missing.")]
    MissingMessage,
}

/// How the redirect target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// The pipeline produced a URL.
    Resolved,
    /// The pipeline produced nothing; the original link is used verbatim.
    Fallback,
    /// An input error occurred; original link if captured, else not-found URL.
    Failed,
}

impl RedirectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
        }
    }
}

/// Final decision for a tracked click. `location` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    pub location: String,
    pub kind: RedirectKind,
    /// Result of the open registration, `None` when it was not attempted.
    pub open_registration: Option<RegistrationOutcome>,
}

/// Everything the orchestrator needs to know about one click request.
///
/// Request-scoped values are passed explicitly rather than read from
/// ambient state.
#[derive(Clone, Copy)]
pub struct ClickRequest<'a> {
    pub query: &'a QueryParams,
    pub message: Option<&'a TrackedMessage>,
    pub contact: Option<&'a ContactIdentifier>,
    pub request: &'a RequestContext,
    pub tracker: Option<&'a dyn AnalyticsTracker>,
    pub site_name: &'a str,
}

/// Single entry point for tracked email clicks.
///
/// Sequences robot filtering, open registration, click event construction
/// and pipeline resolution, and picks the redirect target. Stateless apart
/// from injected collaborators, so it is shared across requests.
pub struct RedirectService {
    registrar: OpenEventRegistrar,
    resolver: RedirectResolver,
    robot_filter: Arc<dyn RobotFilter>,
    item_not_found_url: String,
    resolver_timeout: Duration,
}

impl RedirectService {
    /// Creates the orchestrator.
    ///
    /// `item_not_found_url` is the target of failure redirects when no
    /// original link was captured; it must be non-empty.
    pub fn new(
        registrar: OpenEventRegistrar,
        resolver: RedirectResolver,
        robot_filter: Arc<dyn RobotFilter>,
        item_not_found_url: String,
    ) -> Self {
        Self {
            registrar,
            resolver,
            robot_filter,
            item_not_found_url,
            resolver_timeout: DEFAULT_RESOLVER_TIMEOUT,
        }
    }

    pub fn with_resolver_timeout(mut self, timeout: Duration) -> Self {
        self.resolver_timeout = timeout;
        self
    }

    pub fn item_not_found_url(&self) -> &str {
        &self.item_not_found_url
    }

    /// Handles one tracked click and returns where to send the visitor.
    ///
    /// Never fails: input errors are routed to the failure redirect.
    pub async fn handle(&self, click: ClickRequest<'_>) -> RedirectDecision {
        let decision = match self.redirect(click).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Tracked click could not be processed: {}", e);
                self.failed(click)
            }
        };

        metrics::counter!("exm_redirects_total", "outcome" => decision.kind.as_str())
            .increment(1);

        decision
    }

    async fn redirect(&self, click: ClickRequest<'_>) -> Result<RedirectDecision, RedirectError> {
        let original_link = click
            .query
            .get_non_empty(LINK_PARAM)
            .ok_or(RedirectError::MissingLink(LINK_PARAM))?;

        let message = click.message.ok_or(RedirectError::MissingMessage)?;

        let is_robot = self.robot_filter.is_excluded(click.request);

        let open_registration = match click.contact {
            Some(contact) if !is_robot => Some(
                self.registrar
                    .register_open(message, contact, click.request, click.site_name)
                    .await,
            ),
            Some(_) => {
                debug!("Visitor excluded as robot, skipping open registration");
                None
            }
            None => None,
        };

        let event_data = EventData::new(click.contact.cloned(), ClickEvent::for_message(message));
        let session_active = click.tracker.is_some_and(|t| t.is_active());

        let args = RedirectUrlArgs::new(
            event_data,
            click.query.clone(),
            original_link.to_string(),
            session_active,
        );

        let resolved = match tokio::time::timeout(self.resolver_timeout, self.resolver.resolve(args))
            .await
        {
            Ok(resolved) => resolved,
            Err(_) => {
                warn!(
                    "{} did not finish within {:?}",
                    PIPELINE_NAME, self.resolver_timeout
                );
                None
            }
        };

        let decision = match resolved {
            Some(url) => RedirectDecision {
                location: url.to_string(),
                kind: RedirectKind::Resolved,
                open_registration,
            },
            None => {
                warn!(
                    "{} returned empty RedirectToUrl, falling back to {}",
                    PIPELINE_NAME, original_link
                );
                RedirectDecision {
                    location: original_link.to_string(),
                    kind: RedirectKind::Fallback,
                    open_registration,
                }
            }
        };

        Ok(decision)
    }

    /// Failure path: cancel the tracked page and redirect somewhere safe.
    fn failed(&self, click: ClickRequest<'_>) -> RedirectDecision {
        if let Some(tracker) = click.tracker
            && let Err(e) = tracker.cancel_current_page()
        {
            debug!("Could not cancel tracked page: {}", e);
        }

        let location = click
            .query
            .get_non_empty(LINK_PARAM)
            .unwrap_or(&self.item_not_found_url)
            .to_string();

        RedirectDecision {
            location,
            kind: RedirectKind::Failed,
            open_registration: None,
        }
    }
}
