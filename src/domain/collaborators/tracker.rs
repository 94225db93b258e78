//! Analytics session tracking handles.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::entities::RequestContext;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no page is being tracked")]
    NoCurrentPage,

    #[error("tracker failure: {0}")]
    Failed(String),
}

/// The analytics session attached to the current request.
#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsTracker: Send + Sync {
    /// Whether the analytics session is active.
    fn is_active(&self) -> bool;

    /// Cancels the page entry currently being tracked.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] when there is nothing to cancel or the
    /// tracker rejects the call.
    fn cancel_current_page(&self) -> Result<(), TrackerError>;
}

/// Resolves the analytics tracker for a request, if any.
///
/// A request without a tracker is treated as having no active session.
#[cfg_attr(test, mockall::automock)]
pub trait TrackerProvider: Send + Sync {
    fn current(&self, request: &RequestContext) -> Option<Arc<dyn AnalyticsTracker>>;
}
