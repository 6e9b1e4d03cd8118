//! Policy domain errors
//!
//! Store operations never fail towards their callers; these errors cover
//! input parsing done at the edges of the domain.

use thiserror::Error;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Unknown renewal frequency value
    #[error("Invalid renewal frequency: {0} (expected monthly or yearly)")]
    InvalidFrequency(String),
}
