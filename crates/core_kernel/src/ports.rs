//! Ports and Adapters Infrastructure
//!
//! Domains declare the capabilities they need from the outside world as port
//! traits; adapters in the infrastructure crates implement them.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Application shell (interface_app)      │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  Port traits: RateLookup, PaymentConfirmation │
//! │  Port, KeyValueStore                          │
//! └──────────────────────────────────────────────┘
//!            ▲                        ▲
//!   ┌────────┴────────┐     ┌─────────┴────────┐
//!   │  infra_store    │     │   infra_http     │
//!   │ (memory / file) │     │ (policy backend) │
//!   └─────────────────┘     └──────────────────┘
//! ```
//!
//! Every port reports failures as [`PortError`], so domain services can tell a
//! transient network problem from a malformed response without knowing which
//! adapter produced it.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// Authentication or authorization failed
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// A response or stored value could not be decoded
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Opaque durable key-value storage
///
/// Values are whole strings; callers encode and decode their own payloads.
/// An adapter must make `set` atomic for a single key: a reader sees either
/// the previous value or the new one, never a torn write.
#[async_trait]
pub trait KeyValueStore: DomainPort {
    /// Returns the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>, PortError>;

    /// Replaces the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), PortError>;

    /// Deletes `key`; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), PortError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), PortError> {
        (**self).remove(key).await
    }
}

impl<T: DomainPort + ?Sized> DomainPort for std::sync::Arc<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Rate", "ABA/010530");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("ABA/010530"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "confirm_payment".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());
        assert!(PortError::connection("offline").is_transient());
        assert!(!PortError::validation("bad amount").is_transient());
    }
}
