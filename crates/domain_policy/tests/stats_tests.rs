//! Statistics and Renewal Alert Tests
//!
//! - `premium_totals` - Totals, averages and frequency normalisation
//! - `distributions` - Category, age group, month and frequency counts
//! - `alerts` - Due-soon filtering and ordering
//! - `invariants` - Property-based checks over random portfolios

use core_kernel::AgeGroup;
use domain_policy::{renewal_alerts, PolicyStats, RenewalFrequency, MAX_PREMIUM};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{date, TemporalFixtures, TestPolicyBuilder, TestStore};

mod premium_totals {
    use super::*;

    #[test]
    fn test_mixed_frequency_example() {
        let policies = vec![
            TestPolicyBuilder::new().with_premium(dec!(1200)).monthly().build(),
            TestPolicyBuilder::new().with_premium(dec!(1200)).yearly().build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        assert_eq!(stats.total_policies, 2);
        assert_eq!(stats.total_premium, dec!(2400));
        assert_eq!(stats.avg_premium, dec!(1200));
        assert_eq!(stats.monthly_premium_total, dec!(1300));
        assert_eq!(stats.yearly_premium_total, dec!(15600));
    }

    #[test]
    fn test_empty_portfolio_has_zero_average() {
        let stats = PolicyStats::compute(&[], TemporalFixtures::today());

        assert_eq!(stats.total_policies, 0);
        assert_eq!(stats.total_premium, Decimal::ZERO);
        assert_eq!(stats.avg_premium, Decimal::ZERO);
        assert_eq!(stats.monthly_premium_total, Decimal::ZERO);
        assert_eq!(stats.yearly_premium_total, Decimal::ZERO);
        assert!(stats.by_category.is_empty());
        assert!(stats.by_age_group.is_empty());
        assert!(stats.renewals_by_month.is_empty());
        assert!(stats.by_frequency.is_empty());
    }

    #[test]
    fn test_huge_premiums_saturate_instead_of_panicking() {
        let policies = vec![
            TestPolicyBuilder::new().with_premium(Decimal::MAX / Decimal::from(2)).monthly().build(),
            TestPolicyBuilder::new().with_premium(Decimal::MAX).yearly().build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        assert_eq!(stats.total_policies, 2);
        assert_eq!(stats.total_premium, Decimal::MAX);
        assert_eq!(stats.yearly_premium_total, Decimal::MAX);
        assert_eq!(stats.avg_premium, Decimal::MAX / Decimal::from(2));
        assert!(stats.monthly_premium_total < Decimal::MAX);
    }

    #[test]
    fn test_largest_accepted_premiums_sum_exactly() {
        let policies: Vec<_> = (0..50)
            .map(|_| TestPolicyBuilder::new().with_premium(MAX_PREMIUM).monthly().build())
            .collect();
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        assert_eq!(stats.total_premium, MAX_PREMIUM * Decimal::from(50));
        assert_eq!(stats.yearly_premium_total, MAX_PREMIUM * Decimal::from(600));
        assert_eq!(stats.avg_premium, MAX_PREMIUM);
    }

    #[test]
    fn test_average_of_uneven_premiums() {
        let policies = vec![
            TestPolicyBuilder::new().with_premium(dec!(100)).build(),
            TestPolicyBuilder::new().with_premium(dec!(250)).build(),
            TestPolicyBuilder::new().with_premium(dec!(400)).build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());
        assert_eq!(stats.avg_premium, dec!(250));
    }
}

mod distributions {
    use super::*;

    #[test]
    fn test_counts_by_category_in_first_seen_order() {
        let policies = vec![
            TestPolicyBuilder::new().with_type("life").build(),
            TestPolicyBuilder::new().with_type("motor").build(),
            TestPolicyBuilder::new().with_type("life").build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        let entries: Vec<(&String, usize)> = stats.by_category.iter().collect();
        assert_eq!(entries, vec![(&"life".to_string(), 2), (&"motor".to_string(), 1)]);
    }

    #[test]
    fn test_counts_by_age_group() {
        let policies = vec![
            TestPolicyBuilder::new().aged(22).build(),
            TestPolicyBuilder::new().aged(25).build(),
            TestPolicyBuilder::new().aged(70).build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        assert_eq!(stats.by_age_group.get(&AgeGroup::From18To25), 2);
        assert_eq!(stats.by_age_group.get(&AgeGroup::Over65), 1);
        assert_eq!(stats.by_age_group.len(), 2);
    }

    #[test]
    fn test_renewals_grouped_by_month_label() {
        let policies = vec![
            TestPolicyBuilder::new().with_renewal_date(date(2025, 1, 3)).build(),
            TestPolicyBuilder::new().with_renewal_date(date(2025, 1, 28)).build(),
            TestPolicyBuilder::new().with_renewal_date(date(2026, 1, 3)).build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        assert_eq!(stats.renewals_by_month.get("Jan 2025"), 2);
        assert_eq!(stats.renewals_by_month.get("Jan 2026"), 1);
    }

    #[test]
    fn test_counts_by_frequency() {
        let policies = vec![
            TestPolicyBuilder::new().monthly().build(),
            TestPolicyBuilder::new().yearly().build(),
            TestPolicyBuilder::new().monthly().build(),
        ];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

        assert_eq!(stats.by_frequency.get(&RenewalFrequency::Monthly), 2);
        assert_eq!(stats.by_frequency.get(&RenewalFrequency::Yearly), 1);
    }

    #[test]
    fn test_stats_serialize_with_camel_case_keys() {
        let policies = vec![TestPolicyBuilder::new().with_type("health").monthly().build()];
        let stats = PolicyStats::compute(&policies, TemporalFixtures::today());
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalPolicies"], 1);
        assert_eq!(json["byCategory"]["health"], 1);
        assert_eq!(json["byFrequency"]["monthly"], 1);
        assert_eq!(json["byAgeGroup"]["36-45"], 1);
    }
}

mod alerts {
    use super::*;

    #[test]
    fn test_alerts_sorted_soonest_first() {
        let policies = vec![
            TestPolicyBuilder::new().with_id("later").renewing_in(20).build(),
            TestPolicyBuilder::new().with_id("soon").renewing_in(3).build(),
        ];
        let alerts = renewal_alerts(&policies, TemporalFixtures::today(), 30);

        let ids: Vec<&str> = alerts.iter().map(|a| a.policy.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "later"]);
        assert_eq!(alerts[0].days_until_renewal, 3);
        assert_eq!(alerts[1].days_until_renewal, 20);
    }

    #[test]
    fn test_ties_keep_list_order() {
        let policies = vec![
            TestPolicyBuilder::new().with_id("first").renewing_in(7).build(),
            TestPolicyBuilder::new().with_id("second").renewing_in(7).build(),
            TestPolicyBuilder::new().with_id("third").renewing_in(1).build(),
        ];
        let alerts = renewal_alerts(&policies, TemporalFixtures::today(), 30);

        let ids: Vec<&str> = alerts.iter().map(|a| a.policy.id.as_str()).collect();
        assert_eq!(ids, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_outside_window_and_overdue_are_excluded() {
        let policies = vec![
            TestPolicyBuilder::new().renewing_in(31).build(),
            TestPolicyBuilder::new().renewing_in(-2).build(),
            TestPolicyBuilder::new().with_id("today").renewing_in(0).build(),
        ];
        let alerts = renewal_alerts(&policies, TemporalFixtures::today(), 30);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].policy.id.as_str(), "today");
    }

    #[tokio::test]
    async fn test_store_uses_configured_window() {
        let harness = TestStore::with_parts(
            domain_policy::ports::mock::MockPolicyRepository::with_records(vec![
                TestPolicyBuilder::new().renewing_in(10).build_record(),
                TestPolicyBuilder::new().renewing_in(3).build_record(),
            ]),
            domain_policy::ports::mock::MockNotifier::new(),
            domain_policy::StoreSettings { due_soon_days: 5 },
        );
        harness.store.load().await;

        let alerts = harness.store.renewal_alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].days_until_renewal, 3);
    }
}

mod invariants {
    use super::*;

    /// Same value as `MAX_PREMIUM`
    const PREMIUM_CEILING: u64 = 1_000_000_000_000;

    fn portfolio() -> impl Strategy<Value = Vec<(u64, bool, u8, i64)>> {
        let premium = prop_oneof![0u64..100_000, 0u64..=PREMIUM_CEILING];
        prop::collection::vec((premium, any::<bool>(), 0u8..4, -60i64..400), 0..40)
    }

    proptest! {
        #[test]
        fn prop_counts_add_up(entries in portfolio()) {
            let categories = ["health", "life", "motor", "travel"];
            let policies: Vec<_> = entries
                .iter()
                .map(|(premium, monthly, category, renewal)| {
                    let builder = TestPolicyBuilder::new()
                        .with_premium(Decimal::from(*premium))
                        .with_type(categories[*category as usize])
                        .renewing_in(*renewal);
                    if *monthly { builder.monthly().build() } else { builder.yearly().build() }
                })
                .collect();

            let stats = PolicyStats::compute(&policies, TemporalFixtures::today());

            prop_assert_eq!(stats.total_policies, policies.len());
            prop_assert_eq!(stats.by_category.total(), policies.len());
            prop_assert_eq!(stats.by_age_group.total(), policies.len());
            prop_assert_eq!(stats.renewals_by_month.total(), policies.len());
            prop_assert_eq!(stats.by_frequency.total(), policies.len());

            let sum: Decimal = policies.iter().map(|p| p.premium).sum();
            prop_assert_eq!(stats.total_premium, sum);
            prop_assert!(stats.monthly_premium_total <= stats.yearly_premium_total);
        }

        #[test]
        fn prop_alerts_are_sorted_and_within_window(entries in portfolio(), window in 0i64..60) {
            let policies: Vec<_> = entries
                .iter()
                .map(|(_, _, _, renewal)| TestPolicyBuilder::new().renewing_in(*renewal).build())
                .collect();

            let alerts = renewal_alerts(&policies, TemporalFixtures::today(), window);

            prop_assert!(alerts.windows(2).all(|w| w[0].days_until_renewal <= w[1].days_until_renewal));
            prop_assert!(alerts.iter().all(|a| a.days_until_renewal >= 0 && a.days_until_renewal <= window));
            let expected = entries.iter().filter(|(_, _, _, r)| *r >= 0 && *r <= window).count();
            prop_assert_eq!(alerts.len(), expected);
        }
    }
}
