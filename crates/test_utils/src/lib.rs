//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! premium desk test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built quote drafts, rate tables and payments
//! - `builders`: Builder patterns for test data construction
//! - `doubles`: Scripted implementations of the rate and confirmation ports
//! - `assertions`: Assertion helpers for premium breakdowns and sync reports
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
