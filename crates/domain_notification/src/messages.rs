//! SMS message templates

use chrono::NaiveDate;

use domain_policy::Policy;

fn short_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Sent to the agent when a policy is added
pub fn policy_added(policy: &Policy) -> String {
    format!(
        "New policy added: {} ({}), premium {} {}, renews {}.",
        policy.name,
        policy.insurance_type,
        policy.premium,
        policy.renewal_frequency,
        short_date(policy.renewal_date),
    )
}

/// Reminds the agent to greet a policyholder on their birthday
pub fn birthday_reminder(policy: &Policy, birthday: NaiveDate, turning: u32) -> String {
    format!(
        "Reminder: {} turns {} on {}. Send birthday wishes!",
        policy.name,
        turning,
        short_date(birthday),
    )
}

/// Reminds the agent of an upcoming renewal
pub fn renewal_reminder(policy: &Policy, days_left: i64) -> String {
    let when = match days_left {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days => format!("in {days} days"),
    };
    format!(
        "Reminder: {}'s {} policy renews {} on {}. Premium {} {}.",
        policy.name,
        policy.insurance_type,
        when,
        short_date(policy.renewal_date),
        policy.premium,
        policy.renewal_frequency,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_kernel::PolicyId;
    use domain_policy::RenewalFrequency;
    use rust_decimal_macros::dec;

    fn policy() -> Policy {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        Policy {
            id: PolicyId::from_string("POL-1"),
            name: "Ravi Kumar".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 7, 14).unwrap(),
            insurance_type: "life".to_string(),
            premium: dec!(1200),
            renewal_date: NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
            renewal_frequency: RenewalFrequency::Monthly,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_policy_added_mentions_key_fields() {
        let body = policy_added(&policy());
        assert_eq!(
            body,
            "New policy added: Ravi Kumar (life), premium 1200 monthly, renews 03 Aug 2025."
        );
    }

    #[test]
    fn test_birthday_reminder() {
        let body = birthday_reminder(&policy(), NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(), 40);
        assert_eq!(body, "Reminder: Ravi Kumar turns 40 on 14 Jul 2025. Send birthday wishes!");
    }

    #[test]
    fn test_renewal_reminder_wording() {
        assert!(renewal_reminder(&policy(), 7).contains("renews in 7 days on 03 Aug 2025"));
        assert!(renewal_reminder(&policy(), 1).contains("renews tomorrow"));
        assert!(renewal_reminder(&policy(), 0).contains("renews today"));
    }
}
