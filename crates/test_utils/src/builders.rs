//! Test Data Builders
//!
//! Builders start from the fixtures so tests only spell out the fields they
//! care about.

use rust_decimal::Decimal;

use core_kernel::TransactionNo;
use domain_billing::{PaymentMethod, QueuedPayment};
use domain_policy::QuoteDraft;

use crate::fixtures::{PaymentFixtures, QuoteFixtures};

/// Builder for quote drafts, starting from [`QuoteFixtures::special_draft`]
pub struct QuoteDraftBuilder {
    draft: QuoteDraft,
}

impl Default for QuoteDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteDraftBuilder {
    pub fn new() -> Self {
        Self {
            draft: QuoteFixtures::special_draft(),
        }
    }

    pub fn project(mut self, code: impl Into<String>) -> Self {
        self.draft.project_code = Some(code.into());
        self
    }

    pub fn plan(mut self, code: impl Into<String>) -> Self {
        self.draft.plan_code = Some(code.into());
        self
    }

    pub fn sum_assured(mut self, amount: Decimal) -> Self {
        self.draft.sum_assured = Some(amount);
        self
    }

    /// Clears the mode, leaving the draft incomplete
    pub fn without_mode(mut self) -> Self {
        self.draft.mode = None;
        self
    }

    pub fn build(self) -> QuoteDraft {
        self.draft
    }
}

/// Builder for queued payments, starting from [`PaymentFixtures::bkash`]
pub struct QueuedPaymentBuilder {
    payment: QueuedPayment,
}

impl QueuedPaymentBuilder {
    pub fn new(transaction_no: &str) -> Self {
        Self {
            payment: PaymentFixtures::bkash(transaction_no),
        }
    }

    /// Uses a locally generated transaction number, as for cash collections
    pub fn local() -> Self {
        let mut builder = Self::new("placeholder");
        builder.payment.transaction_no = TransactionNo::generate_local();
        builder.payment.method = PaymentMethod::Cash;
        builder
    }

    pub fn build(self) -> QueuedPayment {
        self.payment
    }
}
