//! Strongly-typed business codes
//!
//! Project codes, policy numbers and transaction numbers all travel as plain
//! strings on the wire. Newtype wrappers keep them from being mixed up and
//! guarantee they are trimmed and non-empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a code fails to parse
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} must not be empty")]
pub struct EmptyCodeError {
    pub kind: &'static str,
}

macro_rules! define_code {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a code from a string, trimming surrounding whitespace
            pub fn new(value: impl AsRef<str>) -> Result<Self, EmptyCodeError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(EmptyCodeError { kind: $kind });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = EmptyCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyCodeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> String {
                code.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_code!(ProjectCode, "project code");
define_code!(PolicyNo, "policy number");
define_code!(TransactionNo, "transaction number");

impl TransactionNo {
    /// Generates a local transaction number for payments that never received
    /// one from a gateway.
    ///
    /// The suffix is a UUID v7, so locally generated numbers sort by creation
    /// time.
    pub fn generate_local() -> Self {
        Self(format!("LOC-{}", Uuid::now_v7().simple()).to_uppercase())
    }

    /// Returns true if this number was generated on the device
    pub fn is_local(&self) -> bool {
        self.0.starts_with("LOC-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_trimmed() {
        let code = ProjectCode::new("  ABA ").unwrap();
        assert_eq!(code.as_str(), "ABA");
    }

    #[test]
    fn test_empty_code_rejected() {
        let err = PolicyNo::new("   ").unwrap_err();
        assert_eq!(err.kind, "policy number");
    }

    #[test]
    fn test_local_transaction_numbers_are_unique() {
        let first = TransactionNo::generate_local();
        let second = TransactionNo::generate_local();
        assert!(first.is_local());
        assert_ne!(first, second);
    }

    #[test]
    fn test_serde_rejects_blank_codes() {
        let parsed: Result<TransactionNo, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());

        let parsed: TransactionNo = serde_json::from_str("\"T1\"").unwrap();
        assert_eq!(parsed.as_str(), "T1");
    }
}
