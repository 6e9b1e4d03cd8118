//! Portfolio statistics
//!
//! Statistics are recomputed from the current policy list on every call and
//! are never stored.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Borrow;

use core_kernel::{age_group, calculate_age, month_label, AgeGroup};

use crate::policy::{Policy, RenewalFrequency};

/// Ordered (key, count) mapping
///
/// Keys keep the order in which they were first recorded. Serializes as a
/// JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Default for Distribution<K> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: PartialEq> Distribution<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `key`, appending it on first sight
    pub fn record(&mut self, key: K) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key, 1)),
        }
    }

    /// Count for `key`, zero when absent
    pub fn get<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.entries
            .iter()
            .find(|(existing, _)| <K as Borrow<Q>>::borrow(existing) == key)
            .map_or(0, |(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl<K: PartialEq> FromIterator<K> for Distribution<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut distribution = Distribution::new();
        for key in iter {
            distribution.record(key);
        }
        distribution
    }
}

impl<K: Serialize> Serialize for Distribution<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Aggregate view over the policy list
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStats {
    pub total_policies: usize,
    /// Sum of per-payment premiums, regardless of frequency
    pub total_premium: Decimal,
    /// Zero when there are no policies
    pub avg_premium: Decimal,
    pub by_category: Distribution<String>,
    pub by_age_group: Distribution<AgeGroup>,
    /// Keyed by month label, e.g. `Jan 2025`
    pub renewals_by_month: Distribution<String>,
    pub by_frequency: Distribution<RenewalFrequency>,
    pub monthly_premium_total: Decimal,
    pub yearly_premium_total: Decimal,
}

impl PolicyStats {
    /// Computes statistics for `policies` as of `today`
    ///
    /// `today` only affects the age groups. Premium sums saturate at
    /// `Decimal::MAX` instead of overflowing.
    pub fn compute(policies: &[Policy], today: NaiveDate) -> Self {
        let mut stats = PolicyStats {
            total_policies: policies.len(),
            total_premium: Decimal::ZERO,
            avg_premium: Decimal::ZERO,
            by_category: Distribution::new(),
            by_age_group: Distribution::new(),
            renewals_by_month: Distribution::new(),
            by_frequency: Distribution::new(),
            monthly_premium_total: Decimal::ZERO,
            yearly_premium_total: Decimal::ZERO,
        };

        for policy in policies {
            stats.total_premium = stats.total_premium.saturating_add(policy.premium);
            stats.monthly_premium_total =
                stats.monthly_premium_total.saturating_add(policy.monthly_premium());
            stats.yearly_premium_total =
                stats.yearly_premium_total.saturating_add(policy.yearly_premium());

            stats.by_category.record(policy.insurance_type.clone());
            stats
                .by_age_group
                .record(age_group(calculate_age(policy.date_of_birth, today)));
            stats.renewals_by_month.record(month_label(policy.renewal_date));
            stats.by_frequency.record(policy.renewal_frequency);
        }

        if let Some(average) = stats.total_premium.checked_div(Decimal::from(policies.len())) {
            stats.avg_premium = average;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_keeps_first_seen_order() {
        let distribution: Distribution<&str> = ["life", "health", "life", "motor"].into_iter().collect();

        let keys: Vec<&&str> = distribution.keys().collect();
        assert_eq!(keys, vec![&"life", &"health", &"motor"]);
        assert_eq!(distribution.get("life"), 2);
        assert_eq!(distribution.get("travel"), 0);
        assert_eq!(distribution.total(), 4);
    }

    #[test]
    fn test_distribution_serializes_as_object() {
        let mut distribution = Distribution::new();
        distribution.record(RenewalFrequency::Monthly);
        distribution.record(RenewalFrequency::Yearly);
        distribution.record(RenewalFrequency::Monthly);

        let json = serde_json::to_string(&distribution).unwrap();
        assert_eq!(json, r#"{"monthly":2,"yearly":1}"#);
    }

    #[test]
    fn test_empty_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let stats = PolicyStats::compute(&[], today);

        assert_eq!(stats.total_policies, 0);
        assert_eq!(stats.avg_premium, Decimal::ZERO);
        assert!(stats.by_category.is_empty());
        assert!(stats.by_age_group.is_empty());
        assert!(stats.renewals_by_month.is_empty());
        assert!(stats.by_frequency.is_empty());
    }
}
