//! Replaying queued payments
//!
//! `PaymentSyncService` owns the confirmation side of the queue: it submits a
//! freshly settled payment, queues it when the backend cannot be reached, and
//! replays the queue on app start or when the user asks for a sync.
//!
//! # Lifecycle
//!
//! ```text
//! gateway success --submit()--> confirm OK  --> Confirmed
//!                          \--> confirm err --> enqueue --> QueuedForSync
//!
//! app start / manual sync --replay_all()--> for each queued payment, in order:
//!        confirm OK  --> remove entry --> confirmed
//!        confirm err --> leave entry  --> deferred
//! ```
//!
//! There is no retry count or backoff. A payment the backend keeps rejecting
//! stays queued until it is removed explicitly.

use serde::Serialize;
use std::fmt;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use core_kernel::{KeyValueStore, TransactionNo};

use crate::error::SyncError;
use crate::payment::{ConfirmationReceipt, QueuedPayment};
use crate::ports::PaymentConfirmationPort;
use crate::queue::PendingPayments;

/// What started a sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    AppStart,
    Manual,
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTrigger::AppStart => f.write_str("app_start"),
            SyncTrigger::Manual => f.write_str("manual"),
        }
    }
}

/// Result of submitting a freshly settled payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Confirmed(ConfirmationReceipt),
    /// Confirmation failed; the payment will be replayed later
    QueuedForSync,
}

/// Result of replaying one queued payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Confirmed by the backend and removed from the queue
    Confirmed(ConfirmationReceipt),
    /// Not confirmed; the queue is unchanged
    Deferred {
        reason: String,
        transient: bool,
    },
}

/// Summary of a sync pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub trigger: SyncTrigger,
    pub confirmed: Vec<TransactionNo>,
    /// Still queued because confirmation failed
    pub deferred: Vec<TransactionNo>,
    /// Of `deferred`, those the backend rejected outright rather than being unreachable
    pub rejected: Vec<TransactionNo>,
    /// Confirmed by the backend but still present in the queue
    pub removal_failed: Vec<TransactionNo>,
}

impl SyncReport {
    fn new(trigger: SyncTrigger) -> Self {
        Self {
            trigger,
            confirmed: Vec::new(),
            deferred: Vec::new(),
            rejected: Vec::new(),
            removal_failed: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.confirmed.len() + self.deferred.len() + self.removal_failed.len()
    }

    /// True when the user should be told, once, that payments will sync later
    pub fn needs_deferred_notice(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.deferred.is_empty() && self.removal_failed.is_empty()
    }
}

/// Confirms payments with the backend, falling back to the durable queue
pub struct PaymentSyncService<S, C> {
    queue: PendingPayments<S>,
    confirmation: C,
}

impl<S, C> PaymentSyncService<S, C>
where
    S: KeyValueStore,
    C: PaymentConfirmationPort,
{
    pub fn new(queue: PendingPayments<S>, confirmation: C) -> Self {
        Self { queue, confirmation }
    }

    pub fn queue(&self) -> &PendingPayments<S> {
        &self.queue
    }

    /// Confirms a payment the gateway just settled, queueing it on failure
    ///
    /// # Errors
    ///
    /// Validation failures (nothing is sent or queued) and queue storage errors.
    #[instrument(skip(self, payment), fields(transaction_no = %payment.transaction_no))]
    pub async fn submit(&self, payment: QueuedPayment) -> Result<SubmissionStatus, SyncError> {
        payment.validate()?;

        match self.confirmation.confirm_payment(&payment).await {
            Ok(receipt) => {
                info!(message = %receipt.message, "Payment confirmed");
                Ok(SubmissionStatus::Confirmed(receipt))
            }
            Err(err) => {
                warn!(error = %err, "Payment confirmation failed, queueing for sync");
                self.queue.enqueue(payment).await?;
                Ok(SubmissionStatus::QueuedForSync)
            }
        }
    }

    /// Replays one queued payment
    ///
    /// On success the matching entry is removed. On failure nothing is written.
    ///
    /// # Errors
    ///
    /// [`SyncError::RemovalFailed`] when the backend confirmed the payment but
    /// the queue could not be updated. The entry stays queued and will be sent
    /// again on the next pass.
    #[instrument(skip(self, payment), fields(transaction_no = %payment.transaction_no))]
    pub async fn replay(&self, payment: &QueuedPayment) -> Result<ReplayOutcome, SyncError> {
        match self.confirmation.confirm_payment(payment).await {
            Ok(receipt) => {
                self.queue
                    .remove(&payment.transaction_no)
                    .await
                    .map_err(|source| SyncError::RemovalFailed {
                        transaction_no: payment.transaction_no.clone(),
                        source: Box::new(source),
                    })?;
                info!("Queued payment confirmed");
                Ok(ReplayOutcome::Confirmed(receipt))
            }
            Err(err) => {
                warn!(error = %err, "Queued payment still unconfirmed");
                Ok(ReplayOutcome::Deferred {
                    reason: err.to_string(),
                    transient: err.is_transient(),
                })
            }
        }
    }

    /// Replays every queued payment, one at a time, in queue order
    ///
    /// Each payment is attempted independently; a failure never stops the pass.
    ///
    /// # Errors
    ///
    /// Only when the queue itself cannot be read.
    #[instrument(skip(self))]
    pub async fn replay_all(&self, trigger: SyncTrigger) -> Result<SyncReport, SyncError> {
        let pending = self.queue.list_pending().await?;
        let mut report = SyncReport::new(trigger);

        for payment in &pending {
            match self.replay(payment).await {
                Ok(ReplayOutcome::Confirmed(_)) => report.confirmed.push(payment.transaction_no.clone()),
                Ok(ReplayOutcome::Deferred { transient, .. }) => {
                    if !transient {
                        report.rejected.push(payment.transaction_no.clone());
                    }
                    report.deferred.push(payment.transaction_no.clone());
                }
                Err(err) => {
                    error!(transaction_no = %payment.transaction_no, error = %err, "Confirmed payment left in queue");
                    report.removal_failed.push(payment.transaction_no.clone());
                }
            }
        }

        info!(
            attempted = report.attempted(),
            confirmed = report.confirmed.len(),
            deferred = report.deferred.len(),
            "Sync pass finished"
        );
        Ok(report)
    }
}
