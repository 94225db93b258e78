//! Background delivery of open-event telemetry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info};

use crate::domain::entities::EmailOpenMessage;
use crate::domain::repositories::OpenEventRepository;

/// Attempts made to persist one event before it is dropped.
const PERSIST_ATTEMPTS: usize = 3;

/// Drains the open-event queue and persists each payload.
///
/// Up to `concurrency` events are persisted at once. Each write is retried
/// with exponential backoff; an event that still fails is logged and counted,
/// never re-queued. Returns once the channel is closed and in-flight writes
/// have finished.
pub async fn run_open_worker(
    mut rx: mpsc::Receiver<EmailOpenMessage>,
    repository: Arc<dyn OpenEventRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        tokio::spawn(async move {
            persist_with_retry(repository.as_ref(), &event).await;
            drop(permit);
        });
    }

    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Open worker stopped");
}

/// Persists one event, retrying transient failures.
///
/// Returns `true` when the event was stored.
pub async fn persist_with_retry(repository: &dyn OpenEventRepository, event: &EmailOpenMessage) -> bool {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(PERSIST_ATTEMPTS - 1);

    match Retry::start(strategy, || repository.record_open(event)).await {
        Ok(()) => {
            debug!(
                "Open event stored for message {} contact {}",
                event.message_id,
                event.contact_identifier.to_log_string()
            );
            true
        }
        Err(e) => {
            error!(
                "Dropping open event for message {} after {} attempts: {:?}",
                event.message_id, PERSIST_ATTEMPTS, e
            );
            metrics::counter!("exm_open_events_persist_failed_total").increment(1);
            false
        }
    }
}
