//! Store Test Harness
//!
//! Wires a `PolicyStore` to in-memory ports and a manual clock, and keeps
//! handles on all of them so tests can inspect saves and notifications.

use std::sync::Arc;

use chrono::Duration;
use core_kernel::ManualClock;
use domain_policy::ports::mock::{MockNotifier, MockPolicyRepository};
use domain_policy::{NotificationDispatcher, PolicyRecord, PolicyStore, StoreSettings};
use tokio::task::JoinHandle;

use crate::fixtures::TemporalFixtures;

/// A store plus the mocks behind it
pub struct TestStore {
    pub store: Arc<PolicyStore>,
    pub repository: Arc<MockPolicyRepository>,
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<ManualClock>,
    worker: JoinHandle<()>,
}

impl TestStore {
    /// Empty repository, clock at the fixture date
    pub fn new() -> Self {
        Self::with_parts(
            MockPolicyRepository::new(),
            MockNotifier::new(),
            StoreSettings::default(),
        )
    }

    /// Repository pre-populated with `records`
    pub fn with_records(records: Vec<PolicyRecord>) -> Self {
        Self::with_parts(
            MockPolicyRepository::with_records(records),
            MockNotifier::new(),
            StoreSettings::default(),
        )
    }

    pub fn with_parts(
        repository: MockPolicyRepository,
        notifier: MockNotifier,
        settings: StoreSettings,
    ) -> Self {
        let repository = Arc::new(repository);
        let notifier = Arc::new(notifier);
        let clock = Arc::new(TemporalFixtures::clock());
        let (dispatcher, worker) = NotificationDispatcher::spawn(notifier.clone());
        let store = Arc::new(PolicyStore::new(
            repository.clone(),
            dispatcher,
            clock.clone(),
            settings,
        ));

        Self {
            store,
            repository,
            notifier,
            clock,
            worker,
        }
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Drops the store and waits for every queued notification to finish
    ///
    /// Returns the notifier for inspection. Panics if another handle to the
    /// store is still alive.
    pub async fn finish(self) -> Arc<MockNotifier> {
        let TestStore {
            store,
            notifier,
            worker,
            ..
        } = self;
        assert_eq!(
            Arc::strong_count(&store),
            1,
            "store still shared, notification worker would never stop"
        );
        drop(store);
        worker.await.expect("notification worker panicked");
        notifier
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
