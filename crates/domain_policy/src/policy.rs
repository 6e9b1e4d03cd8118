//! Policy records
//!
//! `Policy` is the in-memory record owned by the store. `PolicyRecord` is the
//! persisted shape, which may predate the renewal frequency field.
//! `NewPolicy` and `PolicyPatch` are the caller-supplied inputs for add and
//! update; neither carries an id or timestamps, which only the store sets.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::PolicyId;

use crate::error::PolicyError;

/// Largest premium accepted from callers (one trillion)
///
/// Yearly totals over a list of premiums this size stay far below
/// `Decimal::MAX`.
pub const MAX_PREMIUM: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Billing cadence of a policy
///
/// Deserializes through `FromStr`, so stored values are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenewalFrequency {
    /// Premium is charged every month
    Monthly,
    /// Premium is charged once a year
    #[default]
    Yearly,
}

impl RenewalFrequency {
    /// Returns the number of payments per year
    pub fn payments_per_year(&self) -> u32 {
        match self {
            RenewalFrequency::Monthly => 12,
            RenewalFrequency::Yearly => 1,
        }
    }

    /// Converts a per-payment premium into its yearly amount
    ///
    /// Saturates at `Decimal::MAX`.
    pub fn yearly_amount(&self, premium: Decimal) -> Decimal {
        premium.saturating_mul(Decimal::from(self.payments_per_year()))
    }

    /// Converts a per-payment premium into its monthly amount
    ///
    /// Monthly premiums are returned unchanged, yearly ones are divided by 12.
    pub fn monthly_amount(&self, premium: Decimal) -> Decimal {
        match self {
            RenewalFrequency::Monthly => premium,
            RenewalFrequency::Yearly => premium / Decimal::from(12),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalFrequency::Monthly => "monthly",
            RenewalFrequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for RenewalFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RenewalFrequency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for RenewalFrequency {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(RenewalFrequency::Monthly),
            "yearly" => Ok(RenewalFrequency::Yearly),
            other => Err(PolicyError::InvalidFrequency(other.to_string())),
        }
    }
}

/// A single insurance policy tracked by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Store-assigned identifier, immutable
    pub id: PolicyId,
    /// Policyholder name
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// Insurance category, e.g. "health", "life", "motor"
    pub insurance_type: String,
    /// Amount charged per payment
    pub premium: Decimal,
    pub renewal_date: NaiveDate,
    pub renewal_frequency: RenewalFrequency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// Premium normalised to one month
    pub fn monthly_premium(&self) -> Decimal {
        self.renewal_frequency.monthly_amount(self.premium)
    }

    /// Premium normalised to one year
    pub fn yearly_premium(&self) -> Decimal {
        self.renewal_frequency.yearly_amount(self.premium)
    }
}

/// Persisted form of a policy
///
/// Records written before renewal frequencies existed have no
/// `renewalFrequency` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub insurance_type: String,
    pub premium: Decimal,
    pub renewal_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_frequency: Option<RenewalFrequency>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolicyRecord {
    /// Converts to a policy, backfilling a missing frequency with `yearly`
    ///
    /// The flag is true when the record needed the backfill.
    pub fn into_policy(self) -> (Policy, bool) {
        let migrated = self.renewal_frequency.is_none();
        let policy = Policy {
            id: self.id,
            name: self.name,
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type,
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency: self.renewal_frequency.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (policy, migrated)
    }
}

impl From<Policy> for PolicyRecord {
    fn from(policy: Policy) -> Self {
        Self {
            id: policy.id,
            name: policy.name,
            date_of_birth: policy.date_of_birth,
            insurance_type: policy.insurance_type,
            premium: policy.premium,
            renewal_date: policy.renewal_date,
            renewal_frequency: Some(policy.renewal_frequency),
            created_at: policy.created_at,
            updated_at: policy.updated_at,
        }
    }
}

/// Input for adding a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub insurance_type: String,
    pub premium: Decimal,
    pub renewal_date: NaiveDate,
    #[serde(default)]
    pub renewal_frequency: RenewalFrequency,
}

impl NewPolicy {
    /// Stamps the input with an id and a creation instant
    pub fn into_policy(self, id: PolicyId, now: DateTime<Utc>) -> Policy {
        Policy {
            id,
            name: self.name,
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type,
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency: self.renewal_frequency,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a policy; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_frequency: Option<RenewalFrequency>,
}

impl PolicyPatch {
    /// Merges the present fields over `policy`
    ///
    /// Identity and timestamps are never touched here.
    pub fn apply_to(&self, policy: &mut Policy) {
        if let Some(name) = &self.name {
            policy.name = name.clone();
        }
        if let Some(date_of_birth) = self.date_of_birth {
            policy.date_of_birth = date_of_birth;
        }
        if let Some(insurance_type) = &self.insurance_type {
            policy.insurance_type = insurance_type.clone();
        }
        if let Some(premium) = self.premium {
            policy.premium = premium;
        }
        if let Some(renewal_date) = self.renewal_date {
            policy.renewal_date = renewal_date;
        }
        if let Some(renewal_frequency) = self.renewal_frequency {
            policy.renewal_frequency = renewal_frequency;
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_premium(mut self, premium: Decimal) -> Self {
        self.premium = Some(premium);
        self
    }

    pub fn with_renewal_date(mut self, renewal_date: NaiveDate) -> Self {
        self.renewal_date = Some(renewal_date);
        self
    }

    pub fn with_frequency(mut self, frequency: RenewalFrequency) -> Self {
        self.renewal_frequency = Some(frequency);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_frequency_normalisation() {
        assert_eq!(RenewalFrequency::Monthly.monthly_amount(dec!(100)), dec!(100));
        assert_eq!(RenewalFrequency::Monthly.yearly_amount(dec!(100)), dec!(1200));
        assert_eq!(RenewalFrequency::Yearly.monthly_amount(dec!(1200)), dec!(100));
        assert_eq!(RenewalFrequency::Yearly.yearly_amount(dec!(1200)), dec!(1200));
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("Monthly".parse::<RenewalFrequency>().unwrap(), RenewalFrequency::Monthly);
        assert!("weekly".parse::<RenewalFrequency>().is_err());
    }

    #[test]
    fn test_record_without_frequency_deserializes() {
        let json = r#"{
            "id": "1718000000000",
            "name": "Asha",
            "dateOfBirth": "1990-04-02",
            "insuranceType": "health",
            "premium": 1200,
            "renewalDate": "2025-05-01",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#;
        let record: PolicyRecord = serde_json::from_str(json).unwrap();
        assert!(record.renewal_frequency.is_none());

        let (policy, migrated) = record.into_policy();
        assert!(migrated);
        assert_eq!(policy.renewal_frequency, RenewalFrequency::Yearly);
        assert_eq!(policy.premium, dec!(1200));
    }

    #[test]
    fn test_stored_frequency_is_case_insensitive() {
        let json = r#"{
            "id": "p-7",
            "name": "Meera",
            "dateOfBirth": "1979-09-12",
            "insuranceType": "life",
            "premium": "300",
            "renewalDate": "2025-10-01",
            "renewalFrequency": "Monthly",
            "createdAt": "2024-10-01T10:00:00Z",
            "updatedAt": "2024-10-01T10:00:00Z"
        }"#;
        let record: PolicyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.renewal_frequency, Some(RenewalFrequency::Monthly));

        let bad = json.replace("Monthly", "weekly");
        assert!(serde_json::from_str::<PolicyRecord>(&bad).is_err());
    }

    #[test]
    fn test_yearly_amount_saturates() {
        assert_eq!(RenewalFrequency::Monthly.yearly_amount(Decimal::MAX), Decimal::MAX);
        assert_eq!(RenewalFrequency::Yearly.yearly_amount(Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn test_max_premium_is_one_trillion() {
        assert_eq!(MAX_PREMIUM, Decimal::from(1_000_000_000_000u64));
    }

    #[test]
    fn test_patch_leaves_absent_fields() {
        let now = Utc::now();
        let mut policy = NewPolicy {
            name: "Ravi".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 1, 1).unwrap(),
            insurance_type: "life".to_string(),
            premium: dec!(500),
            renewal_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            renewal_frequency: RenewalFrequency::Monthly,
        }
        .into_policy(PolicyId::from_string("p1"), now);

        PolicyPatch::default().with_premium(dec!(650)).apply_to(&mut policy);

        assert_eq!(policy.premium, dec!(650));
        assert_eq!(policy.name, "Ravi");
        assert_eq!(policy.renewal_frequency, RenewalFrequency::Monthly);
    }
}
