//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{PolicyNo, ProjectCode, TransactionNo};
use domain_billing::{PaymentMethod, QueuedPayment};
use domain_policy::{PaymentMode, PlanCode, PremiumQuoteRequest, RateAge, Term};

/// Strategy for generating payment modes
pub fn payment_mode_strategy() -> impl Strategy<Value = PaymentMode> {
    proptest::sample::select(PaymentMode::ALL.to_vec())
}

/// Strategy for generating plan codes 01..=99
pub fn plan_code_strategy() -> impl Strategy<Value = PlanCode> {
    (1u8..=99u8).prop_map(|n| PlanCode::parse(&n.to_string()).unwrap())
}

/// Strategy for generating terms in years
pub fn term_strategy() -> impl Strategy<Value = Term> {
    (1u32..=40u32).prop_map(|years| Term::new(years).unwrap())
}

/// Strategy for generating rate-table ages
pub fn rate_age_strategy() -> impl Strategy<Value = RateAge> {
    (0i32..=99i32).prop_map(|age| RateAge::new(age).unwrap())
}

/// Strategy for generating sums assured in whole thousands
pub fn sum_assured_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|thousands| Decimal::from(thousands * 1000))
}

/// Strategy for generating positive table rates with up to two decimals
pub fn table_rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating dates of birth giving ages roughly 18 to 65 in 2024
pub fn adult_dob_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..(47 * 365)).prop_map(|days| {
        NaiveDate::from_ymd_opt(1959, 1, 1).unwrap() + Duration::days(days)
    })
}

/// Strategy for generating valid quote requests
pub fn quote_request_strategy() -> impl Strategy<Value = PremiumQuoteRequest> {
    (
        prop_oneof![Just("ABA"), Just("XYZ"), Just("PRJ1")],
        plan_code_strategy(),
        term_strategy(),
        payment_mode_strategy(),
        adult_dob_strategy(),
        sum_assured_strategy(),
    )
        .prop_map(|(project, plan, term, mode, dob, sum_assured)| {
            PremiumQuoteRequest::new(ProjectCode::new(project).unwrap(), plan, term, mode, dob, sum_assured)
                .unwrap()
        })
}

/// Strategy for generating gateway transaction numbers
pub fn transaction_no_strategy() -> impl Strategy<Value = TransactionNo> {
    "[A-Z]{2}[0-9]{6,10}".prop_map(|s| TransactionNo::new(s).unwrap())
}

/// Strategy for generating payment methods
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Bkash),
        Just(PaymentMethod::Nagad),
        Just(PaymentMethod::SslCommerz),
        Just(PaymentMethod::Cash),
    ]
}

/// Strategy for generating valid queued payments
pub fn queued_payment_strategy() -> impl Strategy<Value = QueuedPayment> {
    (
        transaction_no_strategy(),
        "P-[0-9]{4}-[0-9]{4}",
        (1i64..5_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        payment_method_strategy(),
        0i64..(365 * 24 * 3600),
        proptest::option::of((1u32..12u32, 0i64..1_000_000i64)),
    )
        .prop_map(|(tx, policy, amount, method, offset, partial)| {
            let recorded = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset);
            let payment = QueuedPayment::new(
                tx,
                PolicyNo::new(policy).unwrap(),
                ProjectCode::new("ABA").unwrap(),
                amount,
                method,
                "SC01",
            )
            .recorded_at(recorded);
            match partial {
                Some((installments, due)) => payment.with_partial(installments, Decimal::new(due, 2)),
                None => payment,
            }
        })
}
