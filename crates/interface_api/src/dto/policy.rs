//! Policy DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use domain_policy::{NewPolicy, Policy, PolicyError, PolicyPatch, RenewalFrequency, MAX_PREMIUM};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create"))]
pub struct CreatePolicyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub insurance_type: String,
    pub premium: Decimal,
    pub renewal_date: NaiveDate,
    /// `monthly` or `yearly`; yearly when omitted
    pub renewal_frequency: Option<String>,
}

fn validate_create(request: &CreatePolicyRequest) -> Result<(), ValidationError> {
    check_premium(request.premium)?;
    check_not_blank(&request.name, "blank_name")?;
    check_not_blank(&request.insurance_type, "blank_insurance_type")
}

impl CreatePolicyRequest {
    pub fn into_new_policy(self) -> Result<NewPolicy, PolicyError> {
        let renewal_frequency =
            parse_frequency(self.renewal_frequency.as_deref())?.unwrap_or_default();
        Ok(NewPolicy {
            name: self.name.trim().to_string(),
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type.trim().to_string(),
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update"))]
pub struct UpdatePolicyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub insurance_type: Option<String>,
    pub premium: Option<Decimal>,
    pub renewal_date: Option<NaiveDate>,
    pub renewal_frequency: Option<String>,
}

fn validate_update(request: &UpdatePolicyRequest) -> Result<(), ValidationError> {
    if let Some(premium) = request.premium {
        check_premium(premium)?;
    }
    if let Some(name) = &request.name {
        check_not_blank(name, "blank_name")?;
    }
    if let Some(insurance_type) = &request.insurance_type {
        check_not_blank(insurance_type, "blank_insurance_type")?;
    }
    Ok(())
}

impl UpdatePolicyRequest {
    pub fn into_patch(self) -> Result<PolicyPatch, PolicyError> {
        Ok(PolicyPatch {
            name: self.name.map(|name| name.trim().to_string()),
            date_of_birth: self.date_of_birth,
            insurance_type: self.insurance_type.map(|kind| kind.trim().to_string()),
            premium: self.premium,
            renewal_date: self.renewal_date,
            renewal_frequency: parse_frequency(self.renewal_frequency.as_deref())?,
        })
    }
}

fn parse_frequency(value: Option<&str>) -> Result<Option<RenewalFrequency>, PolicyError> {
    value.map(str::parse).transpose()
}

fn check_premium(premium: Decimal) -> Result<(), ValidationError> {
    if premium < Decimal::ZERO {
        let mut error = ValidationError::new("negative_premium");
        error.message = Some("premium must not be negative".into());
        return Err(error);
    }
    if premium > MAX_PREMIUM {
        let mut error = ValidationError::new("premium_too_large");
        error.message = Some(format!("premium must not exceed {MAX_PREMIUM}").into());
        return Err(error);
    }
    Ok(())
}

fn check_not_blank(value: &str, code: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(code));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyListResponse {
    pub policies: Vec<Policy>,
    pub loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> CreatePolicyRequest {
        CreatePolicyRequest {
            name: "Sana Khan".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1991, 3, 4).unwrap(),
            insurance_type: "motor".to_string(),
            premium: dec!(899.99),
            renewal_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            renewal_frequency: None,
        }
    }

    #[test]
    fn test_valid_request_defaults_to_yearly() {
        let request = request();
        assert!(request.validate().is_ok());

        let policy = request.into_new_policy().unwrap();
        assert_eq!(policy.renewal_frequency, RenewalFrequency::Yearly);
    }

    #[test]
    fn test_negative_premium_is_rejected() {
        let request = CreatePolicyRequest {
            premium: dec!(-1),
            ..request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_zero_premium_is_allowed() {
        let request = CreatePolicyRequest {
            premium: dec!(0),
            ..request()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_premium_above_limit_is_rejected() {
        let at_limit = CreatePolicyRequest {
            premium: MAX_PREMIUM,
            ..request()
        };
        assert!(at_limit.validate().is_ok());

        let over_limit = CreatePolicyRequest {
            premium: MAX_PREMIUM + dec!(0.01),
            ..request()
        };
        assert!(over_limit.validate().is_err());

        let patch = UpdatePolicyRequest {
            premium: Some(Decimal::MAX),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let request = CreatePolicyRequest {
            name: "   ".to_string(),
            ..request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_frequency_is_an_error() {
        let request = CreatePolicyRequest {
            renewal_frequency: Some("weekly".to_string()),
            ..request()
        };
        assert!(matches!(
            request.into_new_policy(),
            Err(PolicyError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_update_only_carries_present_fields() {
        let request = UpdatePolicyRequest {
            premium: Some(dec!(120)),
            renewal_frequency: Some("Monthly".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let patch = request.into_patch().unwrap();
        assert_eq!(patch.premium, Some(dec!(120)));
        assert_eq!(patch.renewal_frequency, Some(RenewalFrequency::Monthly));
        assert!(patch.name.is_none());
    }
}
