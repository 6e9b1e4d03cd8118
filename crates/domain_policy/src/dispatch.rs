//! Notification work queue
//!
//! Store mutations never wait on notifications. They submit a job to an
//! unbounded channel; a worker task drains the channel and runs every job as
//! its own task, so a slow SMS never holds up the next one. Job outcomes are
//! only logged.
//!
//! The worker exits once every `NotificationDispatcher` handle is dropped,
//! after the jobs already in flight have finished. Awaiting the worker's
//! `JoinHandle` therefore waits for all submitted notifications.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::policy::Policy;
use crate::ports::PolicyNotifier;

/// Work submitted to the notification worker
#[derive(Debug, Clone)]
pub enum NotificationJob {
    /// A policy was added to the store
    PolicyAdded(Policy),
    /// The store finished loading this list
    InitializeScheduler(Vec<Policy>),
}

impl NotificationJob {
    fn kind(&self) -> &'static str {
        match self {
            NotificationJob::PolicyAdded(_) => "policy_added",
            NotificationJob::InitializeScheduler(_) => "initialize_scheduler",
        }
    }
}

/// Handle for submitting notification jobs
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<NotificationJob>,
}

impl NotificationDispatcher {
    /// Starts the worker on the current tokio runtime
    pub fn spawn(notifier: Arc<dyn PolicyNotifier>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(notifier, receiver));
        (Self { sender }, worker)
    }

    /// Queues a job without waiting for it
    ///
    /// Returns false when the worker is gone; the job is dropped and logged.
    pub fn submit(&self, job: NotificationJob) -> bool {
        let kind = job.kind();
        match self.sender.send(job) {
            Ok(()) => {
                tracing::debug!(job = kind, "Notification job queued");
                true
            }
            Err(_) => {
                tracing::warn!(job = kind, "Notification worker stopped, job dropped");
                false
            }
        }
    }
}

async fn run_worker(
    notifier: Arc<dyn PolicyNotifier>,
    mut receiver: mpsc::UnboundedReceiver<NotificationJob>,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            job = receiver.recv() => match job {
                Some(job) => {
                    in_flight.spawn(execute(Arc::clone(&notifier), job));
                }
                None => break,
            },
            Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_join(result);
            }
        }
    }

    while let Some(result) = in_flight.join_next().await {
        log_join(result);
    }
    tracing::debug!("Notification worker stopped");
}

async fn execute(notifier: Arc<dyn PolicyNotifier>, job: NotificationJob) {
    match job {
        NotificationJob::PolicyAdded(policy) => match notifier.send_policy_added(&policy).await {
            Ok(true) => {
                tracing::info!(policy_id = %policy.id, "Policy added notification sent");
            }
            Ok(false) => {
                tracing::debug!(policy_id = %policy.id, "Policy added notification not delivered");
            }
            Err(error) => {
                tracing::error!(
                    policy_id = %policy.id,
                    error = %error,
                    transient = error.is_transient(),
                    "Failed to send policy added notification"
                );
            }
        },
        NotificationJob::InitializeScheduler(policies) => {
            match notifier.initialize_scheduler(&policies).await {
                Ok(()) => {
                    tracing::info!(policies = policies.len(), "Reminder scheduler initialized");
                }
                Err(error) => {
                    tracing::error!(error = %error, "Failed to initialize reminder scheduler");
                }
            }
        }
    }
}

fn log_join(result: Result<(), JoinError>) {
    if let Err(error) = result {
        if error.is_panic() {
            tracing::error!(error = %error, "Notification job panicked");
        }
    }
}
