//! Policy Domain Ports
//!
//! The store depends on two collaborators, each behind a port trait so the
//! storage medium and the notification channel can be swapped:
//!
//! - `PolicyRepository`: loads and saves the whole policy list as one unit
//! - `PolicyNotifier`: announces new policies and arranges reminders
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_policy::{PolicyStore, NotificationDispatcher, StoreSettings};
//! use std::sync::Arc;
//!
//! let (dispatcher, worker) = NotificationDispatcher::spawn(notifier);
//! let store = PolicyStore::new(repository, dispatcher, clock, StoreSettings::default());
//! store.load().await;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError};

use crate::policy::{Policy, PolicyRecord};

/// Durable storage for the policy list
///
/// There is no incremental persistence: every save replaces the whole
/// collection.
#[async_trait]
pub trait PolicyRepository: DomainPort + HealthCheckable {
    /// Loads the persisted list in its stored order
    ///
    /// Returns an empty list when nothing has been persisted yet.
    async fn load(&self) -> Result<Vec<PolicyRecord>, PortError>;

    /// Replaces the persisted list
    async fn save(&self, policies: &[Policy]) -> Result<(), PortError>;
}

/// Outbound notifications about policies
#[async_trait]
pub trait PolicyNotifier: DomainPort {
    /// Announces a newly added policy
    ///
    /// Returns `Ok(false)` when the message was deliberately not delivered.
    async fn send_policy_added(&self, policy: &Policy) -> Result<bool, PortError>;

    /// Arranges future reminders for the given policies
    async fn initialize_scheduler(&self, policies: &[Policy]) -> Result<(), PortError>;
}

/// In-memory implementations of the policy ports for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::RwLock;

    /// Repository that keeps records in memory and remembers every save
    #[derive(Debug, Default)]
    pub struct MockPolicyRepository {
        records: RwLock<Vec<PolicyRecord>>,
        saves: RwLock<Vec<Vec<Policy>>>,
        fail_loads: AtomicBool,
        fail_saves: AtomicBool,
    }

    impl MockPolicyRepository {
        /// Creates an empty repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with persisted records
        pub fn with_records(records: Vec<PolicyRecord>) -> Self {
            Self {
                records: RwLock::new(records),
                ..Self::default()
            }
        }

        /// Makes every subsequent load fail
        pub fn fail_loads(&self) {
            self.fail_loads.store(true, Ordering::SeqCst);
        }

        /// Makes every subsequent save fail
        pub fn fail_saves(&self) {
            self.fail_saves.store(true, Ordering::SeqCst);
        }

        /// Every list passed to `save`, oldest first
        pub async fn saves(&self) -> Vec<Vec<Policy>> {
            self.saves.read().await.clone()
        }

        pub async fn save_count(&self) -> usize {
            self.saves.read().await.len()
        }

        /// Records as currently persisted
        pub async fn records(&self) -> Vec<PolicyRecord> {
            self.records.read().await.clone()
        }
    }

    impl DomainPort for MockPolicyRepository {}

    #[async_trait]
    impl HealthCheckable for MockPolicyRepository {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-policy-repository".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl PolicyRepository for MockPolicyRepository {
        async fn load(&self) -> Result<Vec<PolicyRecord>, PortError> {
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err(PortError::transformation("stored policies are not valid JSON"));
            }
            Ok(self.records.read().await.clone())
        }

        async fn save(&self, policies: &[Policy]) -> Result<(), PortError> {
            self.saves.write().await.push(policies.to_vec());
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(PortError::internal("storage quota exceeded"));
            }
            *self.records.write().await = policies.iter().cloned().map(PolicyRecord::from).collect();
            Ok(())
        }
    }

    /// Notifier that records calls instead of sending anything
    #[derive(Debug, Default)]
    pub struct MockNotifier {
        added: RwLock<Vec<Policy>>,
        scheduled: RwLock<Vec<Vec<Policy>>>,
        fail_sends: AtomicBool,
        delay: Option<Duration>,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays every send, to observe that callers do not wait on it
        pub fn with_delay(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        /// Makes every subsequent send fail
        pub fn fail_sends(&self) {
            self.fail_sends.store(true, Ordering::SeqCst);
        }

        /// Policies announced so far
        pub async fn added(&self) -> Vec<Policy> {
            self.added.read().await.clone()
        }

        /// Lists passed to `initialize_scheduler`
        pub async fn scheduled(&self) -> Vec<Vec<Policy>> {
            self.scheduled.read().await.clone()
        }
    }

    impl DomainPort for MockNotifier {}

    #[async_trait]
    impl PolicyNotifier for MockNotifier {
        async fn send_policy_added(&self, policy: &Policy) -> Result<bool, PortError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-sms".to_string(),
                });
            }
            self.added.write().await.push(policy.clone());
            Ok(true)
        }

        async fn initialize_scheduler(&self, policies: &[Policy]) -> Result<(), PortError> {
            self.scheduled.write().await.push(policies.to_vec());
            Ok(())
        }
    }
}
