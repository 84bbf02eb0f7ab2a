//! Pre-built Test Fixtures
//!
//! Ready-to-use test data matching the worked premium examples and a few
//! typical queued payments.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{PolicyNo, ProjectCode, TransactionNo};
use domain_billing::{PaymentMethod, QueuedPayment};
use domain_policy::{PaymentMode, PlanCode, QuoteDraft, RateAge, RateCode, StaticRateTable, Term};

/// Fixed dates so underwriting ages are predictable
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 2024-02-01, before the July age bump
    pub fn quote_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    /// 2024-08-15, after the July age bump
    pub fn late_quote_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
    }

    /// Date of birth giving underwriting age 30 on [`Self::quote_date`]
    pub fn dob_age_30() -> NaiveDate {
        NaiveDate::from_ymd_opt(1994, 3, 10).unwrap()
    }

    pub fn payment_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
    }
}

/// Fixture for quote drafts
pub struct QuoteFixtures;

impl QuoteFixtures {
    /// Special project ABA, plan 01, term 20, SA 100000, yearly, age 30
    pub fn special_draft() -> QuoteDraft {
        QuoteDraft {
            project_code: Some("ABA".to_string()),
            plan_code: Some("01".to_string()),
            term: Some(20),
            mode: Some(PaymentMode::Yearly),
            date_of_birth: Some(TemporalFixtures::dob_age_30()),
            sum_assured: Some(dec!(100000)),
        }
    }

    /// Ordinary project, plan 28, term 10, SA 120000
    pub fn flat_draft() -> QuoteDraft {
        QuoteDraft {
            project_code: Some("XYZ".to_string()),
            plan_code: Some("28".to_string()),
            term: Some(10),
            mode: Some(PaymentMode::Yearly),
            date_of_birth: Some(TemporalFixtures::dob_age_30()),
            sum_assured: Some(dec!(120000)),
        }
    }

    pub fn special_project() -> ProjectCode {
        ProjectCode::new("ABA").unwrap()
    }
}

/// Fixture for rate tables
pub struct RateFixtures;

impl RateFixtures {
    /// Rate code of [`QuoteFixtures::special_draft`]
    pub fn special_rate_code() -> RateCode {
        RateCode::new(
            PlanCode::parse("01").unwrap(),
            Term::new(20).unwrap(),
            RateAge::new(30).unwrap(),
        )
    }

    /// Table holding rate 50 for the special draft
    pub fn special_table() -> StaticRateTable {
        StaticRateTable::new().with_rate(
            QuoteFixtures::special_project(),
            Self::special_rate_code(),
            dec!(50),
        )
    }
}

/// Fixture for queued payments
pub struct PaymentFixtures;

impl PaymentFixtures {
    /// A full bKash payment with the given transaction number
    pub fn bkash(transaction_no: &str) -> QueuedPayment {
        QueuedPayment::new(
            TransactionNo::new(transaction_no).unwrap(),
            PolicyNo::new("P-2024-0001").unwrap(),
            QuoteFixtures::special_project(),
            dec!(2720),
            PaymentMethod::Bkash,
            "SC01",
        )
        .recorded_at(TemporalFixtures::payment_time())
    }

    /// A partial Nagad payment covering two installments
    pub fn partial_nagad(transaction_no: &str) -> QueuedPayment {
        QueuedPayment::new(
            TransactionNo::new(transaction_no).unwrap(),
            PolicyNo::new("P-2024-0002").unwrap(),
            QuoteFixtures::special_project(),
            dec!(1360),
            PaymentMethod::Nagad,
            "SC01",
        )
        .with_branch("BR-07")
        .with_partial(2, dec!(1360))
        .recorded_at(TemporalFixtures::payment_time())
    }
}
