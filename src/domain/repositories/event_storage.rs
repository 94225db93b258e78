//! Repository trait for deduplicated email event registration.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::form_urlencoded::byte_serialize;
use uuid::Uuid;

use crate::domain::entities::{ContactIdentifier, RegistrationResult};

/// Errors raised by an email event store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event store unavailable: {0}")]
    Unavailable(String),

    #[error("event store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Event store holding "email opened" registrations.
///
/// # Contract
///
/// [`register_email_opened`](Self::register_email_opened) is an atomic
/// register-or-detect-duplicate operation keyed by
/// `(message_id, instance_id, contact)`. Under concurrent callers with the
/// same key, at most one call per `duplicate_window` may report
/// `is_duplicate = false`.
///
/// # Implementations
///
/// - [`crate::infrastructure::event_store::RedisEventStorage`] - `SET NX PX` backed
/// - [`crate::infrastructure::event_store::InMemoryEventStorage`] - single-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailEventStorage: Send + Sync {
    /// Registers an open unless one was registered within `duplicate_window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be reached.
    async fn register_email_opened(
        &self,
        message_id: Uuid,
        instance_id: Uuid,
        contact: &ContactIdentifier,
        duplicate_window: Duration,
    ) -> Result<RegistrationResult, StoreError>;

    /// Checks if the store backend is healthy.
    async fn health_check(&self) -> bool;
}

/// Builds the store key for an open registration.
///
/// Contact source and identifier are percent-encoded, so a `:` inside either
/// can never shift the boundary between them.
pub fn open_registration_key(
    message_id: Uuid,
    instance_id: Uuid,
    contact: &ContactIdentifier,
) -> String {
    format!(
        "exm:open:{}:{}:{}:{}",
        message_id,
        instance_id,
        encode_component(&contact.source),
        encode_component(&contact.identifier)
    )
}

fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_registration_key() {
        let id = Uuid::nil();
        let contact = ContactIdentifier::new("exm", "c-1");

        assert_eq!(
            open_registration_key(id, id, &contact),
            "exm:open:00000000-0000-0000-0000-000000000000:00000000-0000-0000-0000-000000000000:exm:c-1"
        );
    }

    #[test]
    fn test_open_registration_key_separates_colon_bearing_contacts() {
        let id = Uuid::nil();
        let first = ContactIdentifier::new("crm:x", "1");
        let second = ContactIdentifier::new("crm", "x:1");

        let first_key = open_registration_key(id, id, &first);
        let second_key = open_registration_key(id, id, &second);

        assert_ne!(first_key, second_key);
        assert!(first_key.ends_with(":crm%3Ax:1"));
        assert!(second_key.ends_with(":crm:x%3A1"));
    }
}
