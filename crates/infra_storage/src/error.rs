//! Storage error types
//!
//! This module defines the error types that can occur while reading or
//! writing the persisted policy list, and their mapping onto `PortError`.

use std::path::PathBuf;

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading, writing or renaming the storage file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored content is not a valid policy list
    #[error("Malformed policy data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The policy list could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Malformed {
            path: path.into(),
            source,
        }
    }

    /// Checks if this error means the stored data cannot be understood
    pub fn is_malformed(&self) -> bool {
        matches!(self, StorageError::Malformed { .. })
    }
}

impl From<StorageError> for PortError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Malformed { .. } => PortError::transformation(error.to_string()),
            StorageError::Serialization(_) => PortError::transformation(error.to_string()),
            StorageError::Io { .. } => PortError::internal_with_source("policy storage failed", error),
        }
    }
}
