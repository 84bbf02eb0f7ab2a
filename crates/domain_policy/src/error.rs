//! Policy domain errors
//!
//! Errors raised while building or pricing a premium quote. Incomplete input
//! and failed rate lookups are not errors; they surface as `Ok(None)` and the
//! not-found rate sentinel respectively.

use thiserror::Error;

use core_kernel::{EmptyCodeError, MoneyError};

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Plan code is not one or two digits
    #[error("Invalid plan code: {0:?}")]
    InvalidPlanCode(String),

    /// Term outside 1..=99 years
    #[error("Invalid term: {0} years")]
    InvalidTerm(u32),

    /// Derived age cannot be used in a rate code
    #[error("Age {0} is outside the rateable range (0-99)")]
    AgeOutOfRange(i32),

    /// Submission flows require an adult policyholder
    #[error("Age {age} is below the minimum of {minimum} for submission")]
    AgeBelowMinimum {
        age: u8,
        minimum: u8,
    },

    /// Inputs too large for the premium formulas
    #[error("Premium calculation error: {0}")]
    PremiumCalculation(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }
}

impl From<EmptyCodeError> for PolicyError {
    fn from(err: EmptyCodeError) -> Self {
        PolicyError::MissingRequiredField(err.kind.to_string())
    }
}

impl From<MoneyError> for PolicyError {
    fn from(err: MoneyError) -> Self {
        PolicyError::PremiumCalculation(err.to_string())
    }
}
