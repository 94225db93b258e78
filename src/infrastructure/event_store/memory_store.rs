//! Single-process event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::domain::duplicate_window::DuplicateWindowPolicy;
use crate::domain::entities::{ContactIdentifier, RegistrationResult};
use crate::domain::repositories::{EmailEventStorage, StoreError, open_registration_key};

/// Event store keeping registrations in process memory.
///
/// Check-and-set happens under one mutex, so concurrent requests in this
/// process see at most one first registration per window. Registrations are
/// not shared between processes; use
/// [`RedisEventStorage`](super::RedisEventStorage) when running several
/// instances.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Single-instance deployments
/// - Tests
#[derive(Default)]
pub struct InMemoryEventStorage {
    registrations: Mutex<HashMap<String, (DateTime<Utc>, DuplicateWindowPolicy)>>,
}

impl InMemoryEventStorage {
    pub fn new() -> Self {
        debug!("Using in-memory event store");
        Self::default()
    }

    /// Registers at an explicit point in time.
    pub fn register_at(
        &self,
        key: String,
        window: DuplicateWindowPolicy,
        now: DateTime<Utc>,
    ) -> Result<RegistrationResult, StoreError> {
        let mut registrations = self
            .registrations
            .lock()
            .map_err(|_| StoreError::Unavailable("registration lock poisoned".to_string()))?;

        registrations.retain(|_, (at, policy)| policy.suppresses(*at, now));

        if registrations.contains_key(&key) {
            return Ok(RegistrationResult::duplicate());
        }

        if window.suppresses(now, now) {
            registrations.insert(key, (now, window));
        }

        Ok(RegistrationResult::registered())
    }

    /// Number of registrations currently held, expired ones included until the next write.
    pub fn len(&self) -> usize {
        self.registrations.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EmailEventStorage for InMemoryEventStorage {
    async fn register_email_opened(
        &self,
        message_id: Uuid,
        instance_id: Uuid,
        contact: &ContactIdentifier,
        duplicate_window: Duration,
    ) -> Result<RegistrationResult, StoreError> {
        let key = open_registration_key(message_id, instance_id, contact);
        self.register_at(key, DuplicateWindowPolicy::new(duplicate_window), Utc::now())
    }

    async fn health_check(&self) -> bool {
        self.registrations.lock().is_ok()
    }
}
