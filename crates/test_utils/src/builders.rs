//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::PolicyId;
use domain_policy::{NewPolicy, Policy, PolicyRecord, RenewalFrequency};
use rust_decimal::Decimal;

use crate::fixtures::{PremiumFixtures, TemporalFixtures};

/// Builder for policy inputs, stored policies and persisted records
#[derive(Debug, Clone)]
pub struct TestPolicyBuilder {
    id: PolicyId,
    name: String,
    date_of_birth: NaiveDate,
    insurance_type: String,
    premium: Decimal,
    renewal_date: NaiveDate,
    renewal_frequency: Option<RenewalFrequency>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for TestPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPolicyBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: PolicyId::generate(),
            name: "Priya Sharma".to_string(),
            date_of_birth: TemporalFixtures::birth_date_for_age(40),
            insurance_type: "health".to_string(),
            premium: PremiumFixtures::standard(),
            renewal_date: TemporalFixtures::days_from_today(90),
            renewal_frequency: Some(RenewalFrequency::Yearly),
            created_at: TemporalFixtures::now(),
            updated_at: TemporalFixtures::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = PolicyId::from_string(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    /// Sets the date of birth so the holder is `age` today
    pub fn aged(mut self, age: i32) -> Self {
        self.date_of_birth = TemporalFixtures::birth_date_for_age(age);
        self
    }

    pub fn with_type(mut self, insurance_type: impl Into<String>) -> Self {
        self.insurance_type = insurance_type.into();
        self
    }

    pub fn with_premium(mut self, premium: Decimal) -> Self {
        self.premium = premium;
        self
    }

    pub fn with_renewal_date(mut self, renewal_date: NaiveDate) -> Self {
        self.renewal_date = renewal_date;
        self
    }

    /// Sets the renewal `days` after the fixture date
    pub fn renewing_in(mut self, days: i64) -> Self {
        self.renewal_date = TemporalFixtures::days_from_today(days);
        self
    }

    pub fn monthly(mut self) -> Self {
        self.renewal_frequency = Some(RenewalFrequency::Monthly);
        self
    }

    pub fn yearly(mut self) -> Self {
        self.renewal_frequency = Some(RenewalFrequency::Yearly);
        self
    }

    /// Drops the frequency, as in records persisted by older versions
    pub fn without_frequency(mut self) -> Self {
        self.renewal_frequency = None;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Builds the add-policy input
    pub fn build_new(self) -> NewPolicy {
        NewPolicy {
            name: self.name,
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type,
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency: self.renewal_frequency.unwrap_or_default(),
        }
    }

    /// Builds a stored policy
    pub fn build(self) -> Policy {
        Policy {
            id: self.id,
            name: self.name,
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type,
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency: self.renewal_frequency.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Builds a persisted record, keeping a missing frequency missing
    pub fn build_record(self) -> PolicyRecord {
        PolicyRecord {
            id: self.id,
            name: self.name,
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type,
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency: self.renewal_frequency,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_missing_frequency() {
        let record = TestPolicyBuilder::new().without_frequency().build_record();
        assert!(record.renewal_frequency.is_none());
    }

    #[test]
    fn test_policy_defaults_missing_frequency() {
        let policy = TestPolicyBuilder::new().without_frequency().build();
        assert_eq!(policy.renewal_frequency, RenewalFrequency::Yearly);
    }
}
