//! Billing Domain - Offline Payment Sync
//!
//! When a gateway (bKash, Nagad, SSLCommerz) reports success, the backend
//! still has to record the payment. This crate makes that confirmation
//! durable: payments that cannot be confirmed are kept in a queue in local
//! storage and replayed later.
//!
//! # Components
//!
//! - **`QueuedPayment`**: the replayable confirmation payload
//! - **`PendingPayments`**: the durable queue, one JSON array under `syncPayments`
//! - **`PaymentSyncService`**: submit, replay, and replay-all
//! - **`PaymentConfirmationPort`**: the backend call, implemented in `infra_http`
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{PaymentSyncService, PendingPayments, SyncTrigger};
//!
//! let sync = PaymentSyncService::new(PendingPayments::new(store), confirmation);
//! let report = sync.replay_all(SyncTrigger::AppStart).await?;
//! if report.needs_deferred_notice() {
//!     notify_once("Your payment will be synced later");
//! }
//! ```

pub mod payment;
pub mod ports;
pub mod queue;
pub mod sync;
pub mod error;

pub use payment::{ConfirmationReceipt, PaymentMethod, QueuedPayment};
pub use ports::PaymentConfirmationPort;
pub use queue::{EnqueueOutcome, PendingPayments, SYNC_PAYMENTS_KEY};
pub use sync::{PaymentSyncService, ReplayOutcome, SubmissionStatus, SyncReport, SyncTrigger};
pub use error::SyncError;
