//! Load-time schema migration
//!
//! Persisted lists may contain records written before renewal frequencies
//! existed. They are backfilled with `yearly` once, when the store loads.

use crate::policy::{Policy, PolicyRecord};

/// Result of migrating a persisted list
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOutcome {
    /// Policies in their persisted order
    pub policies: Vec<Policy>,
    /// Number of records that needed a backfill
    pub migrated: usize,
}

impl MigrationOutcome {
    /// Returns true when the migrated list differs from what is persisted
    pub fn requires_write_back(&self) -> bool {
        self.migrated > 0
    }
}

/// Converts persisted records into policies, counting backfilled records
pub fn migrate_records(records: Vec<PolicyRecord>) -> MigrationOutcome {
    let mut migrated = 0;
    let policies = records
        .into_iter()
        .map(|record| {
            let (policy, changed) = record.into_policy();
            if changed {
                migrated += 1;
            }
            policy
        })
        .collect();

    MigrationOutcome { policies, migrated }
}
