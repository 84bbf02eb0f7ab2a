//! Payments awaiting server confirmation
//!
//! A `QueuedPayment` carries everything needed to replay the confirmation
//! call after the gateway has already taken the money.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use core_kernel::{PolicyNo, ProjectCode, TransactionNo};

/// Gateway or channel the payer used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    SslCommerz,
    /// Collected in person by the agent
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Nagad => "nagad",
            PaymentMethod::SslCommerz => "sslcommerz",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

fn validate_partial_fields(payment: &QueuedPayment) -> Result<(), ValidationError> {
    if !payment.is_partial {
        return Ok(());
    }
    match payment.installments {
        Some(n) if n > 0 => {}
        _ => return Err(ValidationError::new("partial_payment_without_installments")),
    }
    if payment.due_amount.is_some_and(|due| due < Decimal::ZERO) {
        return Err(ValidationError::new("negative_due_amount"));
    }
    Ok(())
}

/// A gateway-settled payment whose server confirmation is still outstanding
///
/// Stored as one element of the JSON array under the sync queue key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_partial_fields"))]
pub struct QueuedPayment {
    /// Gateway transaction id or a locally generated number
    pub transaction_no: TransactionNo,
    pub policy_no: PolicyNo,
    pub project_code: ProjectCode,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// When the gateway reported success
    pub date_time: DateTime<Utc>,
    #[validate(length(min = 1, max = 32))]
    pub service_cell_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 32))]
    pub branch_code: Option<String>,
    #[serde(default)]
    pub is_partial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_amount: Option<Decimal>,
}

impl QueuedPayment {
    /// Creates a full payment recorded now
    pub fn new(
        transaction_no: TransactionNo,
        policy_no: PolicyNo,
        project_code: ProjectCode,
        amount: Decimal,
        method: PaymentMethod,
        service_cell_code: impl Into<String>,
    ) -> Self {
        Self {
            transaction_no,
            policy_no,
            project_code,
            amount,
            method,
            date_time: Utc::now(),
            service_cell_code: service_cell_code.into(),
            branch_code: None,
            is_partial: false,
            installments: None,
            due_amount: None,
        }
    }

    pub fn with_branch(mut self, branch_code: impl Into<String>) -> Self {
        self.branch_code = Some(branch_code.into());
        self
    }

    /// Marks the payment as covering only part of the due premium
    pub fn with_partial(mut self, installments: u32, due_amount: Decimal) -> Self {
        self.is_partial = true;
        self.installments = Some(installments);
        self.due_amount = Some(due_amount);
        self
    }

    pub fn recorded_at(mut self, date_time: DateTime<Utc>) -> Self {
        self.date_time = date_time;
        self
    }
}

/// Server acknowledgement of a confirmed payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationReceipt {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payment() -> QueuedPayment {
        QueuedPayment::new(
            TransactionNo::new("BK123").unwrap(),
            PolicyNo::new("P-0001").unwrap(),
            ProjectCode::new("ABA").unwrap(),
            dec!(2720),
            PaymentMethod::Bkash,
            "SC01",
        )
    }

    #[test]
    fn test_valid_payment() {
        assert!(payment().validate().is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut p = payment();
        p.amount = Decimal::ZERO;
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_partial_requires_installments() {
        let mut p = payment().with_partial(2, dec!(1000));
        assert!(p.validate().is_ok());

        p.installments = None;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(payment().with_branch("BR7")).unwrap();
        assert_eq!(json["transaction_no"], "BK123");
        assert_eq!(json["method"], "bkash");
        assert_eq!(json["branch_code"], "BR7");
        assert_eq!(json["is_partial"], false);
        assert!(json.get("installments").is_none());
    }
}
