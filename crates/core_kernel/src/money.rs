//! Money types with precise decimal arithmetic
//!
//! Premiums, commissions and payment amounts are carried as taka `Money`
//! backed by rust_decimal, so rounding happens only where the business rules
//! ask for it. Arithmetic is checked: a sum assured large enough to overflow
//! the decimal range is an error, never a panic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rounds half away from zero, the way premium and net amounts are rounded
/// on the collection receipt (`2.5 -> 3`, `-2.5 -> -3`).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Errors that can occur during money operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount overflowed during {operation}")]
    Overflow { operation: &'static str },

    #[error("Division by zero")]
    DivisionByZero,
}

/// Checked `a / b` for decimals, for formulas that run before a `Money` exists
pub fn checked_div(a: Decimal, b: Decimal) -> Result<Decimal, MoneyError> {
    if b.is_zero() {
        return Err(MoneyError::DivisionByZero);
    }
    a.checked_div(b).ok_or(MoneyError::Overflow { operation: "division" })
}

/// Checked `a * b` for decimals
pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, MoneyError> {
    a.checked_mul(b).ok_or(MoneyError::Overflow { operation: "multiplication" })
}

/// An amount in Bangladeshi taka
///
/// Amounts are held with 4 decimal places internally; rounding to whole taka
/// or paisa is explicit through [`Money::round_half_up`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    amount: Decimal,
}

impl Money {
    pub const SYMBOL: &'static str = "৳";

    pub fn new(amount: Decimal) -> Self {
        Self {
            amount: round_half_up(amount, 4),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Rounds half away from zero to `dp` decimal places
    pub fn round_half_up(&self, dp: u32) -> Self {
        Self {
            amount: round_half_up(self.amount, dp),
        }
    }

    /// Multiplies by a rate, e.g. a commission or tax rate
    pub fn checked_mul(&self, factor: Decimal) -> Result<Self, MoneyError> {
        checked_mul(self.amount, factor).map(Self::new)
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Self, MoneyError> {
        self.amount
            .checked_sub(other.amount)
            .map(Self::new)
            .ok_or(MoneyError::Overflow { operation: "subtraction" })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", Self::SYMBOL, self.amount)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_half_up_is_within_half_a_unit(cents in -100_000_000i64..100_000_000i64) {
            let value = Decimal::new(cents, 2);
            let rounded = round_half_up(value, 0);
            prop_assert!((rounded - value).abs() <= Decimal::new(5, 1));
        }

        #[test]
        fn checked_sub_matches_plain_subtraction(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
        ) {
            let ma = Money::new(Decimal::new(a, 2));
            let mb = Money::new(Decimal::new(b, 2));
            prop_assert_eq!(ma.checked_sub(&mb).unwrap().amount(), Decimal::new(a - b, 2));
        }
    }
}
