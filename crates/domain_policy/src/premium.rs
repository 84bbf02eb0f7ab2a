//! First-premium calculation
//!
//! This module prices a quote from the policy inputs:
//! - flat pricing for ordinary projects (sum assured spread over the term)
//! - tabulated pricing for special projects, after a plan/mode adjustment
//! - the agent commission, 5% withholding tax and the net amount collected
//!
//! Nothing here is persisted; a quote is recomputed whenever an input changes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::money::{checked_div, checked_mul};
use core_kernel::{round_half_up, underwriting_age, Money, ProjectCode};

use crate::error::PolicyError;
use crate::plan::{PaymentMode, PlanCode, PlanRule, Term};
use crate::rating::{RateAge, RateCode, RateKey, RateLookup};

/// Withholding tax charged on the gross commission
pub const WITHHOLDING_TAX_RATE: Decimal = dec!(0.05);

/// Minimum age for first-premium submission
pub const MINIMUM_SUBMISSION_AGE: u8 = 18;

/// Terms at or above this many years earn the long-term commission
pub const LONG_TERM_YEARS: u32 = 15;

/// Commission rate paid to the agent on the base premium
///
/// # Example
///
/// ```rust
/// use domain_policy::premium::commission_rate;
/// use domain_policy::plan::{PlanCode, Term};
/// use rust_decimal_macros::dec;
///
/// let plan = PlanCode::parse("28").unwrap();
/// assert_eq!(commission_rate(plan, Term::new(10).unwrap()), dec!(0.38));
/// assert_eq!(commission_rate(plan, Term::new(15).unwrap()), dec!(0.48));
/// ```
pub fn commission_rate(plan: PlanCode, term: Term) -> Decimal {
    if plan.has_reduced_commission() {
        dec!(0.06)
    } else if term.years() < LONG_TERM_YEARS {
        dec!(0.38)
    } else {
        dec!(0.48)
    }
}

/// Quote inputs as captured by a form; every field may still be blank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub project_code: Option<String>,
    pub plan_code: Option<String>,
    pub term: Option<u32>,
    pub mode: Option<PaymentMode>,
    pub date_of_birth: Option<NaiveDate>,
    pub sum_assured: Option<Decimal>,
}

impl QuoteDraft {
    /// Turns the draft into a request
    ///
    /// Returns `Ok(None)` while any required field is missing or blank, and an
    /// error only when a present value is malformed.
    pub fn complete(&self) -> Result<Option<PremiumQuoteRequest>, PolicyError> {
        let project_code = self.project_code.as_deref().filter(|s| !s.trim().is_empty());
        let plan_code = self.plan_code.as_deref().filter(|s| !s.trim().is_empty());

        let (Some(project_code), Some(plan_code), Some(term), Some(mode), Some(date_of_birth), Some(sum_assured)) = (
            project_code,
            plan_code,
            self.term,
            self.mode,
            self.date_of_birth,
            self.sum_assured,
        ) else {
            return Ok(None);
        };

        PremiumQuoteRequest::new(
            ProjectCode::new(project_code)?,
            PlanCode::parse(plan_code)?,
            Term::new(term)?,
            mode,
            date_of_birth,
            sum_assured,
        )
        .map(Some)
    }
}

/// Validated inputs for one premium quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumQuoteRequest {
    pub project_code: ProjectCode,
    pub plan_code: PlanCode,
    pub term: Term,
    pub mode: PaymentMode,
    pub date_of_birth: NaiveDate,
    pub sum_assured: Decimal,
}

impl PremiumQuoteRequest {
    pub fn new(
        project_code: ProjectCode,
        plan_code: PlanCode,
        term: Term,
        mode: PaymentMode,
        date_of_birth: NaiveDate,
        sum_assured: Decimal,
    ) -> Result<Self, PolicyError> {
        if sum_assured <= Decimal::ZERO {
            return Err(PolicyError::validation(format!(
                "Sum assured must be positive, got {}",
                sum_assured
            )));
        }

        Ok(Self {
            project_code,
            plan_code,
            term,
            mode,
            date_of_birth,
            sum_assured,
        })
    }

    /// Underwriting age on `today`, checked to fit a rate code
    pub fn age_on(&self, today: NaiveDate) -> Result<RateAge, PolicyError> {
        RateAge::new(underwriting_age(self.date_of_birth, today))
    }

    /// Rejects policyholders younger than [`MINIMUM_SUBMISSION_AGE`]
    pub fn ensure_submission_age(&self, today: NaiveDate) -> Result<RateAge, PolicyError> {
        let age = self.age_on(today)?;
        if age.years() < MINIMUM_SUBMISSION_AGE {
            return Err(PolicyError::AgeBelowMinimum {
                age: age.years(),
                minimum: MINIMUM_SUBMISSION_AGE,
            });
        }
        Ok(age)
    }

    pub fn rate_key(&self, age: RateAge) -> RateKey {
        RateKey {
            project_code: self.project_code.clone(),
            plan_code: self.plan_code,
            term: self.term,
            age,
        }
    }
}

/// Rate reported with a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuotedRate {
    /// Ordinary project, no table lookup; reported as 0
    Flat,
    /// Rate fetched from the table and the value after plan adjustment
    Tabulated {
        fetched: Decimal,
        adjusted: Decimal,
    },
    /// The lookup failed or returned a non-positive rate
    NotFound,
}

impl QuotedRate {
    /// Rate as displayed, `None` for the not-found sentinel
    pub fn value(&self) -> Option<Decimal> {
        match self {
            QuotedRate::Flat => Some(Decimal::ZERO),
            QuotedRate::Tabulated { adjusted, .. } => Some(*adjusted),
            QuotedRate::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QuotedRate::NotFound)
    }
}

/// Premium and commission amounts for a priced quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    /// Base premium per installment, whole taka
    pub base_premium: Money,
    pub commission_rate: Decimal,
    /// `base_premium x commission_rate`, two decimals
    pub gross_commission: Money,
    pub tax: Money,
    pub net_commission: Money,
    /// Amount collected from the payer, whole taka
    pub net_amount: Money,
}

impl PremiumBreakdown {
    /// Rounds the base premium and derives the commission lines from it
    ///
    /// # Errors
    ///
    /// [`PolicyError::PremiumCalculation`] when an amount overflows.
    pub fn from_base_premium(base_premium: Decimal, commission_rate: Decimal) -> Result<Self, PolicyError> {
        let base = Money::new(round_half_up(base_premium, 0));
        let gross = Money::new(round_half_up(checked_mul(base.amount(), commission_rate)?, 2));
        let tax = gross.checked_mul(WITHHOLDING_TAX_RATE)?;
        let net_commission = gross.checked_sub(&tax)?;
        let net_amount = base.checked_sub(&net_commission)?.round_half_up(0);

        Ok(Self {
            base_premium: base,
            commission_rate,
            gross_commission: gross,
            tax,
            net_commission,
            net_amount,
        })
    }
}

/// A computed quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumQuoteResult {
    pub rate_code: RateCode,
    pub age: RateAge,
    pub rate: QuotedRate,
    /// Absent when the rate was not found
    pub breakdown: Option<PremiumBreakdown>,
}

/// Prices a request for an ordinary project: `sum_assured / (12 x term)`
pub fn flat_quote(request: &PremiumQuoteRequest, age: RateAge) -> Result<PremiumQuoteResult, PolicyError> {
    let months = Decimal::from(12 * request.term.years());
    let base = checked_div(request.sum_assured, months)?;

    Ok(PremiumQuoteResult {
        rate_code: RateCode::new(request.plan_code, request.term, age),
        age,
        rate: QuotedRate::Flat,
        breakdown: Some(PremiumBreakdown::from_base_premium(
            base,
            commission_rate(request.plan_code, request.term),
        )?),
    })
}

/// Prices a request against a fetched table rate
///
/// A fetched or adjusted rate that is not positive yields the not-found
/// sentinel. A sum assured or rate too large for the formulas is a
/// [`PolicyError::PremiumCalculation`].
pub fn tabulated_quote(
    request: &PremiumQuoteRequest,
    age: RateAge,
    fetched: Option<Decimal>,
) -> Result<PremiumQuoteResult, PolicyError> {
    let rate_code = RateCode::new(request.plan_code, request.term, age);
    let not_found = |rate_code: RateCode| PremiumQuoteResult {
        rate_code,
        age,
        rate: QuotedRate::NotFound,
        breakdown: None,
    };

    let Some(fetched) = fetched.filter(|rate| *rate > Decimal::ZERO) else {
        return Ok(not_found(rate_code));
    };

    let rule = request.plan_code.rule();
    let adjusted = rule.adjust_rate(fetched, request.mode)?;
    if adjusted <= Decimal::ZERO {
        warn!(%rate_code, %fetched, %adjusted, "Plan adjustment produced a non-positive rate");
        return Ok(not_found(rate_code));
    }

    let base = match rule {
        PlanRule::UnitPriced => {
            let months = Decimal::from(request.mode.months_per_installment());
            let units = checked_div(request.sum_assured, adjusted)?;
            checked_mul(checked_mul(units, months)?, dec!(500))?
        }
        _ => {
            let installments = Decimal::from(request.mode.installments_per_year());
            let per_thousand = checked_div(request.sum_assured, dec!(1000))?;
            checked_div(checked_mul(per_thousand, adjusted)?, installments)?
        }
    };

    Ok(PremiumQuoteResult {
        rate_code,
        age,
        rate: QuotedRate::Tabulated { fetched, adjusted },
        breakdown: Some(PremiumBreakdown::from_base_premium(
            base,
            commission_rate(request.plan_code, request.term),
        )?),
    })
}

/// Computes a premium quote
///
/// Ordinary projects are priced without I/O. Special projects await one rate
/// lookup; lookup errors are logged and reported as [`QuotedRate::NotFound`].
///
/// # Errors
///
/// Returns [`PolicyError::AgeOutOfRange`] when the derived age does not fit a
/// rate code, and [`PolicyError::PremiumCalculation`] when the sum assured is
/// too large to price.
pub async fn compute_premium<L>(
    request: &PremiumQuoteRequest,
    is_special_project: bool,
    rate_lookup: &L,
    today: NaiveDate,
) -> Result<PremiumQuoteResult, PolicyError>
where
    L: RateLookup + ?Sized,
{
    let age = request.age_on(today)?;

    if !is_special_project {
        return flat_quote(request, age);
    }

    let key = request.rate_key(age);
    let fetched = match rate_lookup.lookup_rate(&key).await {
        Ok(rate) => rate,
        Err(err) => {
            warn!(
                project_code = %key.project_code,
                rate_code = %key.rate_code(),
                error = %err,
                "Rate lookup failed"
            );
            None
        }
    };
    debug!(rate_code = %key.rate_code(), ?fetched, "Rate lookup complete");

    tabulated_quote(request, age, fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::StaticRateTable;

    fn request(project: &str, plan: &str, term: u32, mode: PaymentMode, sum: Decimal) -> PremiumQuoteRequest {
        PremiumQuoteRequest::new(
            ProjectCode::new(project).unwrap(),
            PlanCode::parse(plan).unwrap(),
            Term::new(term).unwrap(),
            mode,
            NaiveDate::from_ymd_opt(1994, 1, 10).unwrap(),
            sum,
        )
        .unwrap()
    }

    fn today() -> NaiveDate {
        // Before July 1, so age is 2024 - 1994 = 30
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_breakdown_arithmetic() {
        let b = PremiumBreakdown::from_base_premium(dec!(5000), dec!(0.48)).unwrap();
        assert_eq!(b.gross_commission.amount(), dec!(2400.00));
        assert_eq!(b.tax.amount(), dec!(120.00));
        assert_eq!(b.net_commission.amount(), dec!(2280.00));
        assert_eq!(b.net_amount.amount(), dec!(2720));
    }

    #[test]
    fn test_base_premium_rounds_half_up() {
        let b = PremiumBreakdown::from_base_premium(dec!(1190.5), dec!(0.38)).unwrap();
        assert_eq!(b.base_premium.amount(), dec!(1191));
    }

    #[test]
    fn test_reduced_commission_plans() {
        let term = Term::new(30).unwrap();
        assert_eq!(commission_rate(PlanCode::parse("10").unwrap(), term), dec!(0.06));
        assert_eq!(commission_rate(PlanCode::parse("15").unwrap(), Term::new(5).unwrap()), dec!(0.06));
    }

    #[tokio::test]
    async fn test_special_project_uses_table() {
        let req = request("ABA", "01", 20, PaymentMode::Yearly, dec!(100000));
        let table = StaticRateTable::new().with_rate(
            req.project_code.clone(),
            RateCode::new(req.plan_code, req.term, RateAge::new(30).unwrap()),
            dec!(50),
        );

        let result = compute_premium(&req, true, &table, today()).await.unwrap();
        assert_eq!(result.rate_code.as_str(), "012030");
        assert_eq!(result.breakdown.unwrap().base_premium.amount(), dec!(5000));
    }

    #[tokio::test]
    async fn test_missing_rate_is_sentinel() {
        let req = request("ABA", "01", 20, PaymentMode::Yearly, dec!(100000));
        let result = compute_premium(&req, true, &StaticRateTable::new(), today()).await.unwrap();
        assert!(result.rate.is_not_found());
        assert!(result.breakdown.is_none());
    }

    #[test]
    fn test_adjusted_rate_below_zero_is_sentinel() {
        // Plan 09 yearly subtracts 20
        let req = request("ABA", "09", 10, PaymentMode::Yearly, dec!(100000));
        let result = tabulated_quote(&req, RateAge::new(30).unwrap(), Some(dec!(15))).unwrap();
        assert!(result.rate.is_not_found());
    }

    #[tokio::test]
    async fn test_oversized_sum_assured_is_calculation_error() {
        // Plan 72 multiplies by 12 x 500 for yearly payment
        let req = request("ABA", "72", 8, PaymentMode::Yearly, Decimal::MAX / dec!(10));
        let table = StaticRateTable::new().with_rate(
            req.project_code.clone(),
            RateCode::new(req.plan_code, req.term, RateAge::new(30).unwrap()),
            dec!(1),
        );

        let result = compute_premium(&req, true, &table, today()).await;
        assert!(matches!(result, Err(PolicyError::PremiumCalculation(_))));
    }

    #[test]
    fn test_base_premium_rounds_before_four_places() {
        // Rounding to 4 places first would give 1190.5 and then 1191
        let b = PremiumBreakdown::from_base_premium(dec!(1190.49996), dec!(0.38)).unwrap();
        assert_eq!(b.base_premium.amount(), dec!(1190));
    }

    #[test]
    fn test_draft_with_blank_field_is_incomplete() {
        let draft = QuoteDraft {
            project_code: Some("ABA".into()),
            plan_code: Some("  ".into()),
            term: Some(10),
            mode: Some(PaymentMode::Monthly),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
            sum_assured: Some(dec!(100000)),
        };
        assert!(draft.complete().unwrap().is_none());
    }
}
