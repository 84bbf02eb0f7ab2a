//! Billing Domain Ports
//!
//! The sync queue needs two things from outside: a durable key-value store
//! (`core_kernel::KeyValueStore`) and the backend's payment confirmation call,
//! declared here.

use async_trait::async_trait;
use std::sync::Arc;

use core_kernel::{DomainPort, PortError};

use crate::payment::{ConfirmationReceipt, QueuedPayment};

/// Port for confirming a gateway-settled payment with the policy backend
#[async_trait]
pub trait PaymentConfirmationPort: DomainPort {
    /// Sends the stored payload; any error leaves the payment unconfirmed
    async fn confirm_payment(&self, payment: &QueuedPayment) -> Result<ConfirmationReceipt, PortError>;
}

#[async_trait]
impl<T: PaymentConfirmationPort + ?Sized> PaymentConfirmationPort for Arc<T> {
    async fn confirm_payment(&self, payment: &QueuedPayment) -> Result<ConfirmationReceipt, PortError> {
        (**self).confirm_payment(payment).await
    }
}

/// Scripted implementation of PaymentConfirmationPort for testing
///
/// Confirms every payment except the transaction numbers marked as failing,
/// and records each call in order.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use core_kernel::TransactionNo;

    #[derive(Debug, Default)]
    pub struct ScriptedConfirmation {
        failing: Mutex<HashSet<TransactionNo>>,
        offline: std::sync::atomic::AtomicBool,
        calls: Mutex<Vec<TransactionNo>>,
    }

    impl ScriptedConfirmation {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes confirmations of `transaction_no` fail with a connection error
        pub fn fail_for(self, transaction_no: &str) -> Self {
            self.set_failing(transaction_no, true);
            self
        }

        pub fn set_failing(&self, transaction_no: &str, failing: bool) {
            let tx = TransactionNo::new(transaction_no).expect("non-empty transaction number");
            let mut set = self.failing.lock().expect("lock poisoned");
            if failing {
                set.insert(tx);
            } else {
                set.remove(&tx);
            }
        }

        /// Makes every confirmation fail
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, std::sync::atomic::Ordering::SeqCst);
        }

        /// Transaction numbers sent so far, in call order
        pub fn calls(&self) -> Vec<TransactionNo> {
            self.calls.lock().expect("lock poisoned").clone()
        }
    }

    impl DomainPort for ScriptedConfirmation {}

    #[async_trait]
    impl PaymentConfirmationPort for ScriptedConfirmation {
        async fn confirm_payment(&self, payment: &QueuedPayment) -> Result<ConfirmationReceipt, PortError> {
            self.calls
                .lock()
                .expect("lock poisoned")
                .push(payment.transaction_no.clone());

            let failing = self.offline.load(std::sync::atomic::Ordering::SeqCst)
                || self
                    .failing
                    .lock()
                    .expect("lock poisoned")
                    .contains(&payment.transaction_no);
            if failing {
                return Err(PortError::connection("simulated network error"));
            }

            Ok(ConfirmationReceipt {
                message: format!("Payment {} recorded", payment.transaction_no),
            })
        }
    }
}
