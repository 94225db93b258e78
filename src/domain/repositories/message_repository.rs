//! Repository trait for sent message lookups.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::MessageItem;
use crate::error::AppError;

/// Read access to message definitions owned by the delivery system.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMessageRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Finds a message by its identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(MessageItem))` if the message exists
    /// - `Ok(None)` if it does not
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageItem>, AppError>;

    /// Checks database connectivity.
    async fn health_check(&self) -> bool;
}
