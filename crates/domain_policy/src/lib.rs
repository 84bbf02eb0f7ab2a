//! Policy Domain - First-Premium Rating
//!
//! This crate prices first premiums for the policy desk. It is
//! infrastructure-agnostic: the only outside call, the rate table lookup, goes
//! through the [`RateLookup`] port.
//!
//! # Pricing flow
//!
//! ```text
//! QuoteDraft --complete()--> PremiumQuoteRequest
//!     |                           |
//!     | incomplete                | age = underwriting_age(dob, today)
//!     v                           v
//!   None             ordinary project: sum / (12 x term)
//!                    special project:  RateLookup -> plan adjustment -> premium
//!                                 |
//!                                 v
//!              commission, 5% tax, net amount (PremiumBreakdown)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{PremiumService, QuoteDraft};
//!
//! let service = PremiumService::new(rate_lookup).with_special_projects(specials);
//! if let Some(quote) = service.quote(&draft, timezone.today()).await? {
//!     println!("rate code {}", quote.rate_code);
//! }
//! ```

pub mod plan;
pub mod rating;
pub mod premium;
pub mod error;
pub mod services;

pub use plan::{PaymentMode, PlanCode, PlanRule, Term};
pub use rating::{RateAge, RateCode, RateKey, RateLookup, StaticRateTable};
pub use premium::{
    commission_rate, compute_premium, PremiumBreakdown, PremiumQuoteRequest,
    PremiumQuoteResult, QuoteDraft, QuotedRate,
};
pub use error::PolicyError;
pub use services::PremiumService;
