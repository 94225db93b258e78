//! Redis-backed event store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::{ContactIdentifier, RegistrationResult};
use crate::domain::repositories::{EmailEventStorage, StoreError, open_registration_key};

/// Event store using Redis `SET NX PX` as the atomic register-or-detect step.
///
/// The first writer of a key within the window gets `OK`; every other
/// writer gets nil until the key expires. Redis evaluates each command
/// atomically, so concurrent service instances share one guarantee.
pub struct RedisEventStorage {
    client: ConnectionManager,
}

impl RedisEventStorage {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to Redis event store");

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis event store");

        Ok(Self { client: manager })
    }
}

/// Longest expiry Redis accepts for `PX` without overflowing its clock arithmetic.
const MAX_PX_MILLIS: u64 = (i64::MAX / 2) as u64;

/// Converts a window to a `PX` argument, saturating instead of truncating.
fn px_millis(window: Duration) -> u64 {
    u64::try_from(window.as_millis())
        .unwrap_or(u64::MAX)
        .min(MAX_PX_MILLIS)
}

#[async_trait]
impl EmailEventStorage for RedisEventStorage {
    async fn register_email_opened(
        &self,
        message_id: Uuid,
        instance_id: Uuid,
        contact: &ContactIdentifier,
        duplicate_window: Duration,
    ) -> Result<RegistrationResult, StoreError> {
        let window_ms = px_millis(duplicate_window);
        if window_ms == 0 {
            return Ok(RegistrationResult::registered());
        }

        let key = open_registration_key(message_id, instance_id, contact);
        let mut conn = self.client.clone();

        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(1)
            .arg("NX")
            .arg("PX")
            .arg(window_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis SET failed: {}", e)))?;

        if reply.is_some() {
            debug!("Open registered: {}", key);
            Ok(RegistrationResult::registered())
        } else {
            debug!("Open already registered within window: {}", key);
            Ok(RegistrationResult::duplicate())
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_millis() {
        assert_eq!(px_millis(Duration::from_secs(300)), 300_000);
        assert_eq!(px_millis(Duration::ZERO), 0);
        assert_eq!(px_millis(Duration::MAX), MAX_PX_MILLIS);
    }
}
