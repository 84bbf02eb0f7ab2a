//! Custom Test Assertions
//!
//! Assertion helpers for premium quotes and sync reports that print the
//! whole value on failure.

use rust_decimal::Decimal;

use core_kernel::TransactionNo;
use domain_billing::SyncReport;
use domain_policy::{PremiumBreakdown, PremiumQuoteResult};

/// Expected monetary amounts of a breakdown
#[derive(Debug, Clone, Copy)]
pub struct ExpectedBreakdown {
    pub base_premium: Decimal,
    pub gross_commission: Decimal,
    pub tax: Decimal,
    pub net_commission: Decimal,
    pub net_amount: Decimal,
}

/// Asserts every amount of `breakdown`
///
/// # Panics
///
/// Panics naming the first field that differs.
pub fn assert_breakdown(breakdown: &PremiumBreakdown, expected: ExpectedBreakdown) {
    let fields = [
        ("base_premium", breakdown.base_premium.amount(), expected.base_premium),
        ("gross_commission", breakdown.gross_commission.amount(), expected.gross_commission),
        ("tax", breakdown.tax.amount(), expected.tax),
        ("net_commission", breakdown.net_commission.amount(), expected.net_commission),
        ("net_amount", breakdown.net_amount.amount(), expected.net_amount),
    ];
    for (name, actual, expected) in fields {
        assert_eq!(actual, expected, "{name} mismatch in {breakdown:?}");
    }
}

/// Asserts that a quote carries the not-found rate and no breakdown
pub fn assert_rate_not_found(result: &PremiumQuoteResult) {
    assert!(
        result.rate.is_not_found() && result.breakdown.is_none(),
        "Expected rate-not-found quote, got {result:?}"
    );
}

/// Asserts the confirmed and deferred transaction numbers of a report
pub fn assert_report(report: &SyncReport, confirmed: &[&str], deferred: &[&str]) {
    let as_strs = |txs: &[TransactionNo]| txs.iter().map(|t| t.as_str().to_string()).collect::<Vec<_>>();
    assert_eq!(as_strs(&report.confirmed), confirmed, "confirmed mismatch in {report:?}");
    assert_eq!(as_strs(&report.deferred), deferred, "deferred mismatch in {report:?}");
}
