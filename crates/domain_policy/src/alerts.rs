//! Renewal alerts

use chrono::NaiveDate;
use serde::Serialize;

use core_kernel::{days_until_renewal, is_renewal_due_soon};

use crate::policy::Policy;

/// A policy whose renewal is due soon, with its countdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalAlert {
    pub policy: Policy,
    pub days_until_renewal: i64,
}

/// Collects due-soon policies, soonest renewal first
///
/// The sort is stable, so policies renewing on the same day keep their
/// list order.
pub fn renewal_alerts(policies: &[Policy], today: NaiveDate, window_days: i64) -> Vec<RenewalAlert> {
    let mut alerts: Vec<RenewalAlert> = policies
        .iter()
        .filter(|policy| is_renewal_due_soon(policy.renewal_date, today, window_days))
        .map(|policy| RenewalAlert {
            policy: policy.clone(),
            days_until_renewal: days_until_renewal(policy.renewal_date, today),
        })
        .collect();

    alerts.sort_by_key(|alert| alert.days_until_renewal);
    alerts
}
