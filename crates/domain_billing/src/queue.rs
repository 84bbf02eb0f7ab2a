//! Durable queue of payments awaiting confirmation
//!
//! The whole queue is one JSON array under a single key. Every operation reads
//! the latest array, changes it and writes it back; an async mutex serialises
//! those read-modify-write cycles within the process.

use tokio::sync::Mutex;
use tracing::{debug, info};
use validator::Validate;

use core_kernel::{KeyValueStore, TransactionNo};

use crate::error::SyncError;
use crate::payment::QueuedPayment;

/// Storage key the queue lives under
pub const SYNC_PAYMENTS_KEY: &str = "syncPayments";

/// Whether an enqueue added a new entry or replaced one with the same
/// transaction number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Added,
    Replaced,
}

/// Payments waiting to be replayed, persisted in a [`KeyValueStore`]
pub struct PendingPayments<S> {
    store: S,
    key: String,
    lock: Mutex<()>,
}

impl<S: KeyValueStore> PendingPayments<S> {
    /// Creates a queue under the standard [`SYNC_PAYMENTS_KEY`]
    pub fn new(store: S) -> Self {
        Self::with_key(store, SYNC_PAYMENTS_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds a payment to the end of the queue
    ///
    /// A payment whose transaction number is already queued replaces the
    /// existing entry in place, keeping its position.
    ///
    /// # Errors
    ///
    /// Validation failures, an undecodable stored queue, or store errors.
    pub async fn enqueue(&self, payment: QueuedPayment) -> Result<EnqueueOutcome, SyncError> {
        payment.validate()?;

        let _guard = self.lock.lock().await;
        let mut payments = self.load().await?;

        let outcome = match payments
            .iter_mut()
            .find(|queued| queued.transaction_no == payment.transaction_no)
        {
            Some(existing) => {
                *existing = payment;
                EnqueueOutcome::Replaced
            }
            None => {
                payments.push(payment);
                EnqueueOutcome::Added
            }
        };

        self.save(&payments).await?;
        info!(pending = payments.len(), ?outcome, "Payment queued for sync");
        Ok(outcome)
    }

    /// Returns the queued payments in insertion order
    pub async fn list_pending(&self) -> Result<Vec<QueuedPayment>, SyncError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Number of queued payments
    pub async fn len(&self) -> Result<usize, SyncError> {
        Ok(self.list_pending().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, SyncError> {
        Ok(self.len().await? == 0)
    }

    /// Removes the entry with `transaction_no`
    ///
    /// Returns false, without writing, when nothing matched.
    pub async fn remove(&self, transaction_no: &TransactionNo) -> Result<bool, SyncError> {
        let _guard = self.lock.lock().await;
        let mut payments = self.load().await?;

        let before = payments.len();
        payments.retain(|queued| &queued.transaction_no != transaction_no);
        if payments.len() == before {
            debug!(%transaction_no, "No queued payment to remove");
            return Ok(false);
        }

        self.save(&payments).await?;
        debug!(%transaction_no, pending = payments.len(), "Queued payment removed");
        Ok(true)
    }

    async fn load(&self) -> Result<Vec<QueuedPayment>, SyncError> {
        match self.store.get(&self.key).await? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| SyncError::Corrupt {
                key: self.key.clone(),
                source,
            }),
        }
    }

    async fn save(&self, payments: &[QueuedPayment]) -> Result<(), SyncError> {
        let encoded = serde_json::to_string(payments).map_err(SyncError::Serialization)?;
        self.store.set(&self.key, &encoded).await?;
        Ok(())
    }
}
