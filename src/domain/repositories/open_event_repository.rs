//! Repository trait for delivered open events.

use async_trait::async_trait;

use crate::domain::entities::EmailOpenMessage;
use crate::error::AppError;

/// Durable destination of open-event telemetry, written by the open worker.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgOpenEventRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OpenEventRepository: Send + Sync {
    /// Persists one open event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record_open(&self, event: &EmailOpenMessage) -> Result<(), AppError>;
}
