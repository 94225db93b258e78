//! Deduplicated "email opened" registration.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error};

use crate::domain::collaborators::{PayloadEnricher, TelemetrySink};
use crate::domain::duplicate_window::DuplicateWindowPolicy;
use crate::domain::entities::{ContactIdentifier, EmailOpenMessage, RequestContext, TrackedMessage};
use crate::domain::repositories::{EmailEventStorage, StoreError};

/// Default bound on a single event store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// What a registration attempt ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// First open in the window; telemetry was sent.
    Sent,
    /// An earlier open is still within the window; nothing was sent.
    Duplicate,
    /// The store failed or timed out; nothing was sent.
    StoreFailed,
    /// First open in the window, but the sink rejected the payload.
    Dropped,
}

/// Registers email opens against the event store and forwards first opens
/// to the telemetry sink.
///
/// Holds only injected configuration and collaborator handles, so one
/// instance is shared by all requests. The at-most-once-per-window guarantee
/// comes from the store's atomic register operation; this type does no
/// locking of its own.
pub struct OpenEventRegistrar {
    storage: Arc<dyn EmailEventStorage>,
    telemetry: Arc<dyn TelemetrySink>,
    enricher: Option<Arc<dyn PayloadEnricher>>,
    window: DuplicateWindowPolicy,
    store_timeout: Duration,
}

impl OpenEventRegistrar {
    /// Creates a registrar without payload enrichment.
    pub fn new(
        storage: Arc<dyn EmailEventStorage>,
        telemetry: Arc<dyn TelemetrySink>,
        window: DuplicateWindowPolicy,
    ) -> Self {
        Self {
            storage,
            telemetry,
            enricher: None,
            window,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Installs a strategy that appends custom fields to every payload.
    pub fn with_enricher(mut self, enricher: Arc<dyn PayloadEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn window(&self) -> DuplicateWindowPolicy {
        self.window
    }

    /// Registers an open of `message` by `contact`.
    ///
    /// Never fails: store errors and timeouts are logged and reported as
    /// [`RegistrationOutcome::StoreFailed`] so the redirect can continue.
    pub async fn register_open(
        &self,
        message: &TrackedMessage,
        contact: &ContactIdentifier,
        request: &RequestContext,
        site_name: &str,
    ) -> RegistrationOutcome {
        let registration = match self.register_with_timeout(message, contact).await {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to get a registration result: {}", e);
                return RegistrationOutcome::StoreFailed;
            }
        };

        if registration.is_duplicate {
            debug!(
                "Email opened registration not processed as open is within duplicate protection interval. Message id: {}, instance id: {}, contact id: {}",
                message.message_id,
                message.instance_id(),
                contact.to_log_string()
            );
            metrics::counter!("exm_open_events_duplicate_total").increment(1);
            return RegistrationOutcome::Duplicate;
        }

        let mut payload = EmailOpenMessage {
            ip_address: request.ip_address.clone(),
            user_agent: request.user_agent.clone(),
            request_registered: Utc::now(),
            message_id: message.message_id,
            contact_identifier: contact.clone(),
            instance_id: message.instance_id(),
            site_name: site_name.to_string(),
            target_language: message.target_language.clone(),
            test_value_index: message.test_value_index,
            email_address_history_entry_id: message.email_address_history_entry_id,
            custom_values: BTreeMap::new(),
        };

        if let Some(enricher) = &self.enricher {
            enricher.enrich(&mut payload, request);
        }

        if !self.telemetry.send(payload) {
            return RegistrationOutcome::Dropped;
        }
        metrics::counter!("exm_open_events_sent_total").increment(1);

        RegistrationOutcome::Sent
    }

    async fn register_with_timeout(
        &self,
        message: &TrackedMessage,
        contact: &ContactIdentifier,
    ) -> Result<crate::domain::entities::RegistrationResult, StoreError> {
        let call = self.storage.register_email_opened(
            message.message_id,
            message.instance_id(),
            contact,
            self.window.interval(),
        );

        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout))?
    }
}
