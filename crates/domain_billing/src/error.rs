//! Billing domain errors

use thiserror::Error;
use validator::ValidationErrors;

use core_kernel::{PortError, TransactionNo};

/// Errors raised by the payment sync queue
///
/// Confirmation failures are not errors; a payment that cannot be confirmed
/// is deferred and stays queued.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The key-value store failed
    #[error("Storage error: {0}")]
    Store(#[from] PortError),

    /// The stored queue could not be decoded; it is left untouched
    #[error("Stored queue under {key:?} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The queue could not be encoded for storage
    #[error("Failed to encode queue: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The payment failed validation and was neither sent nor queued
    #[error("Invalid payment: {0}")]
    Validation(#[from] ValidationErrors),

    /// The server confirmed the payment but the queue entry could not be removed
    #[error("Payment {transaction_no} confirmed but still queued: {source}")]
    RemovalFailed {
        transaction_no: TransactionNo,
        #[source]
        source: Box<SyncError>,
    },
}
