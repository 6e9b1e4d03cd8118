//! Policy Tracking Domain
//!
//! This crate implements the policy store for a single insurance agent: an
//! ordered list of policies mirrored to durable storage on every change,
//! with statistics and renewal alerts derived on demand.
//!
//! # Architecture
//!
//! The domain layer is infrastructure-agnostic:
//! - **Records**: `Policy`, its persisted form `PolicyRecord`, and the
//!   `NewPolicy` / `PolicyPatch` inputs
//! - **Derived views**: `PolicyStats`, `RenewalAlert`
//! - **Service**: `PolicyStore`
//! - **Ports**: `PolicyRepository`, `PolicyNotifier`
//! - **Work queue**: `NotificationDispatcher`
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{NewPolicy, NotificationDispatcher, PolicyStore, StoreSettings};
//!
//! let (dispatcher, _worker) = NotificationDispatcher::spawn(notifier);
//! let store = PolicyStore::new(repository, dispatcher, clock, StoreSettings::default());
//! store.load().await;
//!
//! let policy = store.add_policy(new_policy).await;
//! let stats = store.stats().await;
//! ```

pub mod policy;
pub mod migration;
pub mod stats;
pub mod alerts;
pub mod ports;
pub mod dispatch;
pub mod store;
pub mod error;

pub use policy::{NewPolicy, Policy, PolicyPatch, PolicyRecord, RenewalFrequency, MAX_PREMIUM};
pub use migration::{migrate_records, MigrationOutcome};
pub use stats::{Distribution, PolicyStats};
pub use alerts::{renewal_alerts, RenewalAlert};
pub use ports::{PolicyNotifier, PolicyRepository};
pub use dispatch::{NotificationDispatcher, NotificationJob};
pub use store::{PolicyStore, StoreSettings};
pub use error::PolicyError;
