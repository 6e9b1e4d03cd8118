//! Strongly-typed identifiers for domain entities
//!
//! Identifiers are opaque strings. Newly generated values are time-ordered
//! UUIDs (v7) carrying a short prefix, but any non-empty string read back
//! from storage is accepted so that records written by older versions keep
//! their identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a new unique identifier
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::now_v7().simple()))
            }

            /// Wraps an existing identifier value
            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the identifier prefix used for generated values
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::validation(concat!(
                        stringify!($name),
                        " must not be empty"
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

define_id!(PolicyId, "POL");
define_id!(ReminderId, "REM");
