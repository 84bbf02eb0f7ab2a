//! Policy Backend REST Adapters
//!
//! Implements the domain ports that talk to the policy backend over HTTP:
//!
//! - **`HttpRateLookup`** (`domain_policy::RateLookup`):
//!   `GET {base}/api/get-rate/{projectCode}/{rateCode}`
//! - **`HttpPaymentConfirmation`** (`domain_billing::PaymentConfirmationPort`):
//!   `POST {base}/api/payment` with a bearer token
//!
//! Both share one [`ApiClient`], which owns the connection pool, the request
//! timeout and the current bearer token.
//!
//! # Error Handling
//!
//! Failures are mapped to `PortError` variants:
//! - 401/403 -> `PortError::Unauthorized`
//! - 404 -> `PortError::NotFound`
//! - 400/422 -> `PortError::Validation`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Connect failures -> `PortError::Connection`
//! - Undecodable bodies -> `PortError::Transformation`
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(ApiClientConfig::new("https://backend.example.com"))?;
//! client.set_token(Some(token)).await;
//!
//! let rates = HttpRateLookup::new(client.clone());
//! let confirmation = HttpPaymentConfirmation::new(client);
//! ```

pub mod client;
pub mod payment;
pub mod rate;

pub use client::{ApiClient, ApiClientConfig};
pub use payment::{HttpPaymentConfirmation, PaymentConfirmationRequest};
pub use rate::HttpRateLookup;
