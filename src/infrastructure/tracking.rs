//! Cookie-based analytics session tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::info;

use crate::domain::collaborators::{AnalyticsTracker, TrackerError, TrackerProvider};
use crate::domain::entities::RequestContext;

/// Default name of the analytics session cookie.
pub const DEFAULT_ANALYTICS_COOKIE: &str = "exm_analytics";

/// Provides a tracker for requests carrying the analytics session cookie.
///
/// Requests without the cookie get no tracker, which the click flow treats
/// as an inactive session. Page cancellations of every tracker handed out
/// are tallied in [`cancelled_pages`](Self::cancelled_pages).
pub struct CookieTrackerProvider {
    cookie_name: String,
    cancelled: Arc<AtomicU64>,
}

impl CookieTrackerProvider {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            cancelled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Pages cancelled since startup.
    pub fn cancelled_pages(&self) -> u64 {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl TrackerProvider for CookieTrackerProvider {
    fn current(&self, request: &RequestContext) -> Option<Arc<dyn AnalyticsTracker>> {
        let session_id = request
            .cookie(&self.cookie_name)
            .filter(|v| !v.is_empty())?;

        Some(Arc::new(CookieSessionTracker::with_counter(
            session_id,
            self.cancelled.clone(),
        )))
    }
}

/// Analytics session identified by a cookie value, tracking one page.
///
/// Cancelling the page excludes it from the session's page views: the
/// cancellation is logged at info level, counted in
/// `exm_tracked_pages_cancelled_total` and in the provider's tally.
pub struct CookieSessionTracker {
    session_id: String,
    page_cancelled: AtomicBool,
    cancelled: Arc<AtomicU64>,
}

impl CookieSessionTracker {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_counter(session_id, Arc::new(AtomicU64::new(0)))
    }

    fn with_counter(session_id: impl Into<String>, cancelled: Arc<AtomicU64>) -> Self {
        Self {
            session_id: session_id.into(),
            page_cancelled: AtomicBool::new(false),
            cancelled,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_page_cancelled(&self) -> bool {
        self.page_cancelled.load(Ordering::SeqCst)
    }
}

impl AnalyticsTracker for CookieSessionTracker {
    fn is_active(&self) -> bool {
        true
    }

    fn cancel_current_page(&self) -> Result<(), TrackerError> {
        if self.page_cancelled.swap(true, Ordering::SeqCst) {
            return Err(TrackerError::NoCurrentPage);
        }

        self.cancelled.fetch_add(1, Ordering::SeqCst);
        metrics::counter!("exm_tracked_pages_cancelled_total").increment(1);
        info!("Cancelled tracked page for session {}", self.session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_cookie(cookie: &str) -> RequestContext {
        let mut request = RequestContext::default();
        request
            .headers
            .insert("cookie".to_string(), cookie.to_string());
        request
    }

    #[test]
    fn test_provider_returns_tracker_for_cookie() {
        let provider = CookieTrackerProvider::new(DEFAULT_ANALYTICS_COOKIE);
        let tracker = provider
            .current(&request_with_cookie("exm_analytics=s-1"))
            .unwrap();

        assert!(tracker.is_active());
    }

    #[test]
    fn test_provider_without_cookie() {
        let provider = CookieTrackerProvider::new(DEFAULT_ANALYTICS_COOKIE);

        assert!(provider.current(&RequestContext::default()).is_none());
        assert!(provider.current(&request_with_cookie("other=1")).is_none());
        assert!(provider.current(&request_with_cookie("exm_analytics=")).is_none());
    }

    #[test]
    fn test_cancel_page_once() {
        let tracker = CookieSessionTracker::new("s-1");

        assert!(tracker.cancel_current_page().is_ok());
        assert!(tracker.is_page_cancelled());
        assert!(matches!(
            tracker.cancel_current_page(),
            Err(TrackerError::NoCurrentPage)
        ));
        assert_eq!(tracker.session_id(), "s-1");
    }

    #[test]
    fn test_provider_tallies_cancelled_pages() {
        let provider = CookieTrackerProvider::new(DEFAULT_ANALYTICS_COOKIE);
        let request = request_with_cookie("exm_analytics=s-1");

        let first = provider.current(&request).unwrap();
        let second = provider.current(&request).unwrap();

        first.cancel_current_page().unwrap();
        assert!(first.cancel_current_page().is_err());
        second.cancel_current_page().unwrap();

        assert_eq!(provider.cancelled_pages(), 2);
    }
}
