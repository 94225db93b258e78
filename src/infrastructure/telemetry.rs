//! Queue-backed telemetry sink.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::domain::collaborators::TelemetrySink;
use crate::domain::entities::EmailOpenMessage;

/// Hands open-event payloads to the background open worker.
///
/// Sending never blocks the request: when the bounded queue is full or the
/// worker has stopped, the payload is dropped and counted.
#[derive(Clone)]
pub struct QueueTelemetrySink {
    sender: mpsc::Sender<EmailOpenMessage>,
}

impl QueueTelemetrySink {
    pub fn new(sender: mpsc::Sender<EmailOpenMessage>) -> Self {
        Self { sender }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

impl TelemetrySink for QueueTelemetrySink {
    fn send(&self, payload: EmailOpenMessage) -> bool {
        match self.sender.try_send(payload) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(
                    "Open event queue full, dropping event for message {}",
                    event.message_id
                );
                metrics::counter!("exm_open_events_dropped_total", "reason" => "full").increment(1);
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(
                    "Open event queue closed, dropping event for message {}",
                    event.message_id
                );
                metrics::counter!("exm_open_events_dropped_total", "reason" => "closed")
                    .increment(1);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ContactIdentifier;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn payload() -> EmailOpenMessage {
        EmailOpenMessage {
            ip_address: None,
            user_agent: None,
            request_registered: Utc::now(),
            message_id: Uuid::new_v4(),
            contact_identifier: ContactIdentifier::new("exm", "c-1"),
            instance_id: Uuid::new_v4(),
            site_name: "website".to_string(),
            target_language: "en".to_string(),
            test_value_index: None,
            email_address_history_entry_id: None,
            custom_values: BTreeMap::new(),
        }
    }

    #[test]
    fn test_send_enqueues_payload() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = QueueTelemetrySink::new(tx);
        let payload = payload();

        assert!(sink.send(payload.clone()));

        assert_eq!(rx.try_recv().unwrap(), payload);
        assert_eq!(sink.capacity(), 4);
    }

    #[test]
    fn test_full_queue_drops_payload() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = QueueTelemetrySink::new(tx);

        assert!(sink.send(payload()));
        assert!(!sink.send(payload()));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_queue_drops_payload() {
        let (tx, rx) = mpsc::channel(1);
        let sink = QueueTelemetrySink::new(tx);
        drop(rx);

        assert!(!sink.send(payload()));
        assert!(sink.is_closed());
    }
}
