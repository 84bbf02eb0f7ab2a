//! Plan codes, policy terms and payment modes
//!
//! A plan code selects the rate adjustment rule applied before pricing. The
//! rules are small enough to live as a closed enum instead of a rules table.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::MoneyError;

use crate::error::PolicyError;

/// Payment frequency selected by the policyholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Yearly,
    HalfYearly,
    Quarterly,
    Monthly,
    /// Single lump sum
    Single,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 5] = [
        PaymentMode::Yearly,
        PaymentMode::HalfYearly,
        PaymentMode::Quarterly,
        PaymentMode::Monthly,
        PaymentMode::Single,
    ];

    /// Divisor applied to an annual tabulated premium
    pub fn installments_per_year(&self) -> u32 {
        match self {
            PaymentMode::Yearly => 1,
            PaymentMode::HalfYearly => 2,
            PaymentMode::Quarterly => 4,
            PaymentMode::Monthly => 12,
            PaymentMode::Single => 1,
        }
    }

    /// Months of cover bought by one installment of a plan 72 policy
    pub fn months_per_installment(&self) -> u32 {
        match self {
            PaymentMode::Monthly => 1,
            PaymentMode::Quarterly => 3,
            PaymentMode::HalfYearly => 6,
            PaymentMode::Yearly => 12,
            PaymentMode::Single => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Yearly => "yearly",
            PaymentMode::HalfYearly => "half_yearly",
            PaymentMode::Quarterly => "quarterly",
            PaymentMode::Monthly => "monthly",
            PaymentMode::Single => "single",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "yearly" => Ok(PaymentMode::Yearly),
            "half_yearly" => Ok(PaymentMode::HalfYearly),
            "quarterly" => Ok(PaymentMode::Quarterly),
            "monthly" => Ok(PaymentMode::Monthly),
            "single" => Ok(PaymentMode::Single),
            other => Err(PolicyError::validation(format!("Unknown payment mode: {}", other))),
        }
    }
}

/// A product plan, written as two digits on the wire ("01".."99")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlanCode(u8);

impl PlanCode {
    /// Parses one or two ASCII digits; `"1"` and `"01"` are the same plan
    pub fn parse(value: &str) -> Result<Self, PolicyError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > 2 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PolicyError::InvalidPlanCode(value.to_string()));
        }
        trimmed
            .parse::<u8>()
            .map(PlanCode)
            .map_err(|_| PolicyError::InvalidPlanCode(value.to_string()))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Rate adjustment rule for this plan
    pub fn rule(&self) -> PlanRule {
        match self.0 {
            72 => PlanRule::UnitPriced,
            1 | 2 | 3 | 5 => PlanRule::LoadedForFrequentModes,
            4 | 6 | 7 => PlanRule::DiscountedForLongModes,
            8 => PlanRule::ScaledByMode,
            9 => PlanRule::DiscountedByTens,
            _ => PlanRule::Standard,
        }
    }

    /// Plans paying the reduced single-premium style commission
    pub fn has_reduced_commission(&self) -> bool {
        matches!(self.0, 10 | 15)
    }
}

impl fmt::Display for PlanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for PlanCode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlanCode {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlanCode> for String {
    fn from(code: PlanCode) -> String {
        code.to_string()
    }
}

/// Policy duration in whole years (1..=99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Term(u8);

impl Term {
    pub const MAX_YEARS: u32 = 99;

    pub fn new(years: u32) -> Result<Self, PolicyError> {
        if years == 0 || years > Self::MAX_YEARS {
            return Err(PolicyError::InvalidTerm(years));
        }
        Ok(Term(years as u8))
    }

    pub fn years(&self) -> u32 {
        u32::from(self.0)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl TryFrom<u32> for Term {
    type Error = PolicyError;

    fn try_from(years: u32) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl From<Term> for u32 {
    fn from(term: Term) -> u32 {
        term.years()
    }
}

/// How a tabulated rate is turned into a base premium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRule {
    /// Plan 72: the rate is the sum assured per 500-unit of monthly premium
    UnitPriced,
    /// Plans 01, 02, 03, 05: +1 half-yearly, +2 quarterly
    LoadedForFrequentModes,
    /// Plans 04, 06, 07: -1 half-yearly, -2 yearly
    DiscountedForLongModes,
    /// Plan 08: x0.525 half-yearly, x0.275 quarterly
    ScaledByMode,
    /// Plan 09: -10 half-yearly, -20 yearly
    DiscountedByTens,
    /// Rate used as tabulated
    Standard,
}

impl PlanRule {
    /// Applies the plan adjustment to a fetched rate
    ///
    /// Unit-priced plans use the rate unchanged.
    pub fn adjust_rate(&self, rate: Decimal, mode: PaymentMode) -> Result<Decimal, MoneyError> {
        use PaymentMode::*;

        let adjusted = match (self, mode) {
            (PlanRule::LoadedForFrequentModes, HalfYearly) => rate.checked_add(dec!(1)),
            (PlanRule::LoadedForFrequentModes, Quarterly) => rate.checked_add(dec!(2)),
            (PlanRule::DiscountedForLongModes, HalfYearly) => rate.checked_sub(dec!(1)),
            (PlanRule::DiscountedForLongModes, Yearly) => rate.checked_sub(dec!(2)),
            (PlanRule::ScaledByMode, HalfYearly) => rate.checked_mul(dec!(0.525)),
            (PlanRule::ScaledByMode, Quarterly) => rate.checked_mul(dec!(0.275)),
            (PlanRule::DiscountedByTens, HalfYearly) => rate.checked_sub(dec!(10)),
            (PlanRule::DiscountedByTens, Yearly) => rate.checked_sub(dec!(20)),
            _ => Some(rate),
        };
        adjusted.ok_or(MoneyError::Overflow { operation: "rate adjustment" })
    }
}
