//! Core Kernel - Foundational types for the premium desk
//!
//! This crate provides the building blocks shared by the premium calculator
//! and the payment sync queue:
//! - Taka money with checked decimal arithmetic and half-up rounding
//! - Business code newtypes (project, policy, transaction)
//! - Underwriting age and insurer-local calendar helpers
//! - Port traits and the shared port error

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{round_half_up, Money, MoneyError};
pub use temporal::{underwriting_age, Timezone};
pub use identifiers::{EmptyCodeError, ProjectCode, PolicyNo, TransactionNo};
pub use ports::{DomainPort, KeyValueStore, PortError};
