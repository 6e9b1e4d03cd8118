//! Shutdown sequencing for the server binary

use std::time::Duration;

use tokio::task::JoinHandle;

use domain_notification::ReminderScheduler;

/// Waits for the notification worker, then cancels pending reminders
///
/// The worker must be drained first: a queued scheduler job can still
/// reschedule reminders. Returns false when the worker did not finish
/// within `timeout`; reminders are cancelled either way.
pub async fn drain_notifications(
    worker: JoinHandle<()>,
    scheduler: &ReminderScheduler,
    timeout: Duration,
) -> bool {
    let drained = tokio::time::timeout(timeout, worker).await.is_ok();
    if !drained {
        tracing::warn!(
            timeout_ms = timeout.as_millis() as u64,
            "Timed out waiting for pending notifications"
        );
    }
    scheduler.cancel_all();
    drained
}
