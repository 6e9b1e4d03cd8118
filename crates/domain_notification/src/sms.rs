//! SMS Gateway Port and Adapters
//!
//! `SmsGateway` is the outbound port for text messages. Two adapters ship
//! with the crate:
//!
//! - `HttpSmsGateway` posts messages to a REST SMS provider
//! - `LogSmsGateway` only logs them, for dry runs and local development
//!
//! # Error Handling
//!
//! Provider responses are mapped to `PortError` variants:
//! - 401/403 -> `PortError::Unauthorized`
//! - 404 -> `PortError::NotFound`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Other -> `PortError::Internal`
//!
//! Transient failures are retried with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};

use crate::error::NotificationError;

/// A text message to a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

impl SmsMessage {
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
        }
    }
}

/// Outcome of handing a message to a gateway
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmsReceipt {
    /// False when the gateway deliberately did not send the message
    pub delivered: bool,
    /// Provider-assigned message id, when one was returned
    pub message_id: Option<String>,
}

impl SmsReceipt {
    pub fn delivered(message_id: Option<String>) -> Self {
        Self {
            delivered: true,
            message_id,
        }
    }

    pub fn skipped() -> Self {
        Self::default()
    }
}

/// Outbound SMS port
#[async_trait]
pub trait SmsGateway: DomainPort {
    /// Sends one message
    async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, PortError>;
}

/// Connection settings for `HttpSmsGateway`
#[derive(Debug, Clone)]
pub struct SmsGatewayConfig {
    /// Base URL of the provider API; messages go to `{base_url}/messages`
    pub base_url: String,

    /// Bearer token for the provider
    pub api_key: String,

    /// Sender number or alphanumeric sender id
    pub sender: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Number of retries after the first attempt
    pub retry_attempts: u32,

    /// Delay before the first retry; doubles on every further retry
    pub retry_backoff_ms: u64,
}

impl Default for SmsGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            sender: String::new(),
            timeout_secs: 10,
            retry_attempts: 3,
            retry_backoff_ms: 500,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Gateway posting messages to a REST SMS provider
#[derive(Debug)]
pub struct HttpSmsGateway {
    config: SmsGatewayConfig,
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSmsGateway {
    /// Builds the gateway and its HTTP client
    pub fn new(config: SmsGatewayConfig) -> Result<Self, NotificationError> {
        if config.base_url.trim().is_empty() {
            return Err(NotificationError::MissingSetting("sms base_url"));
        }
        if config.api_key.trim().is_empty() {
            return Err(NotificationError::MissingSetting("sms api_key"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!("{}/messages", config.base_url.trim_end_matches('/'));

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, message: &SmsMessage) -> Result<SmsReceipt, PortError> {
        let request = SendRequest {
            to: &message.to,
            from: &self.config.sender,
            body: &message.body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| self.map_transport_error(error))?;

        let status = response.status();
        if status.is_success() {
            // Providers differ in what they return; the id is a courtesy.
            let body = response.json::<SendResponse>().await.unwrap_or_default();
            return Ok(SmsReceipt::delivered(body.id));
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read body>".to_string());

        Err(map_status(status, retry_after, &message.to, &body))
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "send_sms".to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if error.is_connect() {
            PortError::Connection {
                message: format!("SMS provider unreachable at {}", self.endpoint),
                source: Some(Box::new(error)),
            }
        } else {
            PortError::internal_with_source("SMS request failed", error)
        }
    }

    fn backoff(&self, attempt: u32, error: &PortError) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        let exponential = Duration::from_millis(self.config.retry_backoff_ms.saturating_mul(factor));
        match error {
            PortError::RateLimited { retry_after_secs } => {
                exponential.max(Duration::from_secs(*retry_after_secs))
            }
            _ => exponential,
        }
    }
}

/// Maps a non-success provider status onto a port error
pub fn map_status(status: StatusCode, retry_after: Option<u64>, to: &str, body: &str) -> PortError {
    match status.as_u16() {
        401 | 403 => PortError::Unauthorized {
            message: format!("SMS provider rejected credentials ({status})"),
        },
        404 => PortError::not_found("SmsRecipient", to),
        429 => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        },
        500..=599 => PortError::ServiceUnavailable {
            service: format!("SMS provider returned {status}"),
        },
        _ => PortError::internal(format!("SMS provider returned {status}: {body}")),
    }
}

impl DomainPort for HttpSmsGateway {}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, PortError> {
        let mut attempt = 0;
        loop {
            match self.send_once(message).await {
                Ok(receipt) => {
                    tracing::debug!(
                        to = %message.to,
                        message_id = ?receipt.message_id,
                        attempt = attempt + 1,
                        "SMS accepted by provider"
                    );
                    return Ok(receipt);
                }
                Err(error) if error.is_transient() && attempt < self.config.retry_attempts => {
                    attempt += 1;
                    let backoff = self.backoff(attempt, &error);
                    tracing::warn!(
                        error = %error,
                        attempt = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retrying SMS after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Gateway that only logs messages
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSmsGateway;

impl DomainPort for LogSmsGateway {}

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, PortError> {
        tracing::info!(to = %message.to, body = %message.body, "SMS (log-only mode)");
        Ok(SmsReceipt::skipped())
    }
}

/// Recording gateway for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    /// Keeps every message it is asked to send
    #[derive(Debug, Default)]
    pub struct RecordingSmsGateway {
        sent: Mutex<Vec<SmsMessage>>,
        fail: AtomicBool,
    }

    impl RecordingSmsGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every later send fail with `ServiceUnavailable`
        pub fn fail_sends(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        pub async fn sent(&self) -> Vec<SmsMessage> {
            self.sent.lock().await.clone()
        }
    }

    impl DomainPort for RecordingSmsGateway {}

    #[async_trait]
    impl SmsGateway for RecordingSmsGateway {
        async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, PortError> {
            self.sent.lock().await.push(message.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "recording gateway".to_string(),
                });
            }
            Ok(SmsReceipt::delivered(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmsGatewayConfig {
        SmsGatewayConfig {
            base_url: "https://sms.example.com/v1/".to_string(),
            api_key: "key".to_string(),
            sender: "AGENT".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_drops_trailing_slash() {
        let gateway = HttpSmsGateway::new(config()).unwrap();
        assert_eq!(gateway.endpoint(), "https://sms.example.com/v1/messages");
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let result = HttpSmsGateway::new(SmsGatewayConfig {
            api_key: " ".to_string(),
            ..config()
        });
        assert!(matches!(result, Err(NotificationError::MissingSetting(_))));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, None, "+1", ""),
            PortError::Unauthorized { .. }
        ));
        assert!(map_status(StatusCode::NOT_FOUND, None, "+1", "").is_not_found());
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, Some(12), "+1", ""),
            PortError::RateLimited { retry_after_secs: 12 }
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, None, "+1", ""),
            PortError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, None, "+1", "bad number"),
            PortError::Internal { .. }
        ));
    }

    #[test]
    fn test_backoff_doubles_and_honours_retry_after() {
        let gateway = HttpSmsGateway::new(config()).unwrap();
        let unavailable = PortError::ServiceUnavailable {
            service: "sms".to_string(),
        };
        assert_eq!(gateway.backoff(1, &unavailable), Duration::from_millis(500));
        assert_eq!(gateway.backoff(3, &unavailable), Duration::from_millis(2000));

        let limited = PortError::RateLimited { retry_after_secs: 5 };
        assert_eq!(gateway.backoff(1, &limited), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_log_gateway_reports_undelivered() {
        let receipt = LogSmsGateway
            .send(&SmsMessage::new("+15550100", "hello"))
            .await
            .unwrap();
        assert!(!receipt.delivered);
    }
}
