//! Application configuration
//!
//! Every setting can be supplied as a `POLICY_`-prefixed environment
//! variable, e.g. `POLICY_PORT=9000` or `POLICY_SMS_API_KEY=...`. Anything
//! left unset takes the default below.

use std::path::PathBuf;

use serde::Deserialize;
use validator::Validate;

use core_kernel::{Timezone, DEFAULT_DUE_SOON_DAYS};
use domain_notification::{ReminderSettings, SmsGatewayConfig};
use domain_policy::StoreSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,

    /// JSON file holding the policy list
    pub storage_path: PathBuf,
    /// The agent's timezone, used for "today" and reminder send times
    pub timezone: Timezone,
    /// Lookahead window for renewal alerts, in days
    #[validate(range(min = 0, max = 366))]
    pub due_soon_days: i64,

    /// SMS provider base URL; without it messages are only logged
    pub sms_base_url: Option<String>,
    pub sms_api_key: Option<String>,
    pub sms_sender: String,
    /// The agent's phone number, recipient of every message
    pub agent_phone: String,
    #[validate(range(min = 1, max = 120))]
    pub sms_timeout_secs: u64,
    #[validate(range(max = 10))]
    pub sms_retry_attempts: u32,

    /// Days before a renewal that its reminder is sent
    #[validate(range(min = 0, max = 365))]
    pub reminder_lead_days: i64,
    /// Local hour at which reminders are sent
    #[validate(range(max = 23))]
    pub reminder_send_hour: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let reminders = ReminderSettings::default();
        let sms = SmsGatewayConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            storage_path: PathBuf::from("data/policies.json"),
            timezone: Timezone::default(),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            sms_base_url: None,
            sms_api_key: None,
            sms_sender: "POLICY".to_string(),
            agent_phone: String::new(),
            sms_timeout_secs: sms.timeout_secs,
            sms_retry_attempts: sms.retry_attempts,
            reminder_lead_days: reminders.renewal_lead_days,
            reminder_send_hour: reminders.send_hour,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("POLICY"))
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|errors| config::ConfigError::Message(errors.to_string()))?;
        Ok(config)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            due_soon_days: self.due_soon_days,
        }
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings {
            renewal_lead_days: self.reminder_lead_days,
            send_hour: self.reminder_send_hour,
        }
    }

    /// Settings for the HTTP SMS gateway
    ///
    /// `None` unless both the base URL and the API key are set.
    pub fn sms_gateway_config(&self) -> Option<SmsGatewayConfig> {
        let base_url = self.sms_base_url.as_deref().filter(|url| !url.trim().is_empty())?;
        let api_key = self.sms_api_key.as_deref().filter(|key| !key.trim().is_empty())?;

        Some(SmsGatewayConfig {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            sender: self.sms_sender.clone(),
            timeout_secs: self.sms_timeout_secs,
            retry_attempts: self.sms_retry_attempts,
            ..SmsGatewayConfig::default()
        })
    }
}
