//! Notification error types

use thiserror::Error;

/// Errors raised while setting up notification adapters
///
/// Failures while sending are reported as `PortError` instead.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// A required setting was empty
    #[error("Missing notification setting: {0}")]
    MissingSetting(&'static str),

    /// A setting was present but unusable
    #[error("Invalid notification setting {setting}: {message}")]
    InvalidSetting {
        setting: &'static str,
        message: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
