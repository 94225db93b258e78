//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::RedirectService;
use crate::domain::collaborators::TrackerProvider;
use crate::domain::repositories::{EmailEventStorage, MessageRepository};
use crate::infrastructure::telemetry::QueueTelemetrySink;

/// Request-independent settings of the tracking endpoint.
#[derive(Debug, Clone)]
pub struct TrackingSettings {
    /// When false the tracking endpoint answers 404.
    pub enabled: bool,
    pub site_name: String,
    /// Read the client IP from proxy headers.
    pub behind_proxy: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            site_name: "website".to_string(),
            behind_proxy: false,
        }
    }
}

/// Collaborators built once at the composition root and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub event_storage: Arc<dyn EmailEventStorage>,
    pub tracker_provider: Arc<dyn TrackerProvider>,
    pub open_sink: QueueTelemetrySink,
    pub settings: Arc<TrackingSettings>,
}
