//! Policy store
//!
//! The store owns the ordered policy list, mirrors it to the repository on
//! every mutation and derives statistics and renewal alerts on demand.
//!
//! # Lifecycle
//!
//! ```text
//! new() ── loading ──▶ load() ── loaded
//!                       │
//!                       ├─ backfill missing frequencies (write back if any)
//!                       └─ queue InitializeScheduler (non-empty list only)
//! ```
//!
//! No operation returns an error. Persistence failures are logged; a failed
//! load starts the store empty and a failed save still updates memory.
//! Notification failures never reach the caller.
//!
//! Every mutation holds the state lock across read, modify and save, so two
//! concurrent mutations are applied one after the other.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockWriteGuard};

use core_kernel::{Clock, PolicyId, DEFAULT_DUE_SOON_DAYS};

use crate::alerts::{renewal_alerts, RenewalAlert};
use crate::dispatch::{NotificationDispatcher, NotificationJob};
use crate::migration::migrate_records;
use crate::policy::{NewPolicy, Policy, PolicyPatch};
use crate::ports::PolicyRepository;
use crate::stats::PolicyStats;

/// Tunables of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Lookahead window, in days, for renewal alerts
    pub due_soon_days: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

#[derive(Debug)]
struct StoreState {
    policies: Vec<Policy>,
    loading: bool,
}

/// In-process service holding the policy list
pub struct PolicyStore {
    repository: Arc<dyn PolicyRepository>,
    notifications: NotificationDispatcher,
    clock: Arc<dyn Clock>,
    settings: StoreSettings,
    state: RwLock<StoreState>,
}

impl PolicyStore {
    /// Creates an empty store in the loading state
    pub fn new(
        repository: Arc<dyn PolicyRepository>,
        notifications: NotificationDispatcher,
        clock: Arc<dyn Clock>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            repository,
            notifications,
            clock,
            settings,
            state: RwLock::new(StoreState {
                policies: Vec::new(),
                loading: true,
            }),
        }
    }

    /// Loads the persisted list
    ///
    /// Only the first call does any work. Mutations issued before `load`
    /// trigger it themselves so they never overwrite unread data.
    pub async fn load(&self) {
        let mut state = self.state.write().await;
        self.load_locked(&mut state).await;
    }

    /// Snapshot of the policy list in insertion order
    pub async fn policies(&self) -> Vec<Policy> {
        self.state.read().await.policies.clone()
    }

    /// Looks up a single policy
    pub async fn policy(&self, id: &PolicyId) -> Option<Policy> {
        self.state
            .read()
            .await
            .policies
            .iter()
            .find(|policy| &policy.id == id)
            .cloned()
    }

    /// True until the initial load has completed
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub fn settings(&self) -> StoreSettings {
        self.settings
    }

    /// Adds a policy and queues its notification
    ///
    /// The returned record carries a fresh id and identical creation and
    /// update timestamps. The add stands whatever happens to the
    /// notification.
    pub async fn add_policy(&self, input: NewPolicy) -> Policy {
        let mut state = self.loaded_state().await;

        let policy = input.into_policy(PolicyId::generate(), self.clock.now());
        state.policies.push(policy.clone());
        self.persist(&state.policies).await;
        drop(state);

        tracing::info!(
            policy_id = %policy.id,
            insurance_type = %policy.insurance_type,
            frequency = %policy.renewal_frequency,
            "Policy added"
        );
        self.notifications
            .submit(NotificationJob::PolicyAdded(policy.clone()));

        policy
    }

    /// Merges `patch` into the policy with `id` and stamps `updatedAt`
    ///
    /// An unknown id changes nothing and returns `None`; the list is still
    /// written back.
    pub async fn update_policy(&self, id: &PolicyId, patch: PolicyPatch) -> Option<Policy> {
        let mut state = self.loaded_state().await;
        let now = self.clock.now();

        let updated = state
            .policies
            .iter_mut()
            .find(|policy| &policy.id == id)
            .map(|policy| {
                patch.apply_to(policy);
                policy.updated_at = now;
                policy.clone()
            });
        self.persist(&state.policies).await;

        match &updated {
            Some(_) => tracing::info!(policy_id = %id, "Policy updated"),
            None => tracing::debug!(policy_id = %id, "Update ignored, policy not found"),
        }
        updated
    }

    /// Removes the policy with `id`
    ///
    /// Returns false for an unknown id; the list is still written back.
    pub async fn delete_policy(&self, id: &PolicyId) -> bool {
        let mut state = self.loaded_state().await;

        let before = state.policies.len();
        state.policies.retain(|policy| &policy.id != id);
        let removed = state.policies.len() < before;
        self.persist(&state.policies).await;

        if removed {
            tracing::info!(policy_id = %id, "Policy deleted");
        } else {
            tracing::debug!(policy_id = %id, "Delete ignored, policy not found");
        }
        removed
    }

    /// Statistics over the current list
    pub async fn stats(&self) -> PolicyStats {
        let state = self.state.read().await;
        PolicyStats::compute(&state.policies, self.clock.today())
    }

    /// Due-soon policies, soonest renewal first
    pub async fn renewal_alerts(&self) -> Vec<RenewalAlert> {
        let state = self.state.read().await;
        renewal_alerts(&state.policies, self.clock.today(), self.settings.due_soon_days)
    }

    async fn loaded_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        let mut state = self.state.write().await;
        self.load_locked(&mut state).await;
        state
    }

    async fn load_locked(&self, state: &mut StoreState) {
        if !state.loading {
            return;
        }

        let records = match self.repository.load().await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to read stored policies, starting empty");
                Vec::new()
            }
        };

        let outcome = migrate_records(records);
        if outcome.requires_write_back() {
            tracing::info!(
                migrated = outcome.migrated,
                "Backfilled missing renewal frequencies"
            );
            self.persist(&outcome.policies).await;
        }

        state.policies = outcome.policies;
        state.loading = false;
        tracing::info!(policies = state.policies.len(), "Policy store loaded");

        if !state.policies.is_empty() {
            self.notifications
                .submit(NotificationJob::InitializeScheduler(state.policies.clone()));
        }
    }

    async fn persist(&self, policies: &[Policy]) {
        if let Err(error) = self.repository.save(policies).await {
            tracing::error!(
                error = %error,
                policies = policies.len(),
                "Failed to persist policies"
            );
        }
    }
}

impl std::fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
