//! Payment confirmation against the policy backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use core_kernel::{DomainPort, PortError};
use domain_billing::{ConfirmationReceipt, PaymentConfirmationPort, QueuedPayment};

use crate::client::ApiClient;

pub const PAYMENT_PATH: &str = "/api/payment";

/// Body of `POST /api/payment`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentConfirmationRequest<'a> {
    pub policy_no: &'a str,
    pub method: &'a str,
    pub amount: Decimal,
    pub transaction_no: &'a str,
    pub date_time: DateTime<Utc>,
    pub service_cell_code: &'a str,
    pub branch_code: Option<&'a str>,
    pub is_partial: bool,
    pub installments: Option<u32>,
    pub due_amount: Option<Decimal>,
}

impl<'a> From<&'a QueuedPayment> for PaymentConfirmationRequest<'a> {
    fn from(payment: &'a QueuedPayment) -> Self {
        Self {
            policy_no: payment.policy_no.as_str(),
            method: payment.method.as_str(),
            amount: payment.amount,
            transaction_no: payment.transaction_no.as_str(),
            date_time: payment.date_time,
            service_cell_code: &payment.service_cell_code,
            branch_code: payment.branch_code.as_deref(),
            is_partial: payment.is_partial,
            installments: payment.installments,
            due_amount: payment.due_amount,
        }
    }
}

/// [`PaymentConfirmationPort`] backed by `POST /api/payment`
#[derive(Debug, Clone)]
pub struct HttpPaymentConfirmation {
    client: ApiClient,
}

impl HttpPaymentConfirmation {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl DomainPort for HttpPaymentConfirmation {}

#[async_trait]
impl PaymentConfirmationPort for HttpPaymentConfirmation {
    #[instrument(skip(self, payment), fields(transaction_no = %payment.transaction_no, policy_no = %payment.policy_no))]
    async fn confirm_payment(&self, payment: &QueuedPayment) -> Result<ConfirmationReceipt, PortError> {
        let body = PaymentConfirmationRequest::from(payment);
        self.client.post_json(PAYMENT_PATH, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{PolicyNo, ProjectCode, TransactionNo};
    use domain_billing::PaymentMethod;
    use rust_decimal_macros::dec;

    #[test]
    fn test_request_body_shape() {
        let payment = QueuedPayment::new(
            TransactionNo::new("BK1").unwrap(),
            PolicyNo::new("P-9").unwrap(),
            ProjectCode::new("ABA").unwrap(),
            dec!(2720),
            PaymentMethod::SslCommerz,
            "SC01",
        )
        .with_partial(2, dec!(1360));

        let json = serde_json::to_value(PaymentConfirmationRequest::from(&payment)).unwrap();
        assert_eq!(json["policy_no"], "P-9");
        assert_eq!(json["method"], "sslcommerz");
        assert_eq!(json["transaction_no"], "BK1");
        assert_eq!(json["is_partial"], true);
        assert_eq!(json["installments"], 2);
        assert!(json["branch_code"].is_null());
        assert!(json.get("project_code").is_none());
    }
}
