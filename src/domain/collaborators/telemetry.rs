//! Downstream delivery of open-event telemetry.

use crate::domain::entities::{EmailOpenMessage, RequestContext};

/// Receives open-event payloads for delivery.
///
/// Fire-and-forget: implementations own buffering and retry and must not
/// block the calling request. `send` reports whether the payload was
/// accepted for delivery.
///
/// # Implementations
///
/// - [`crate::infrastructure::telemetry::QueueTelemetrySink`] - bounded channel to the open worker
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySink: Send + Sync {
    fn send(&self, payload: EmailOpenMessage) -> bool;
}

/// Appends custom fields to an open-event payload before it is sent.
///
/// No enricher is configured by default.
///
/// # Implementations
///
/// - [`crate::infrastructure::enrichment::HeaderCaptureEnricher`] - copies request headers
#[cfg_attr(test, mockall::automock)]
pub trait PayloadEnricher: Send + Sync {
    fn enrich(&self, payload: &mut EmailOpenMessage, request: &RequestContext);
}
