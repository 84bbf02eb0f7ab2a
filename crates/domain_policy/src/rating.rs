//! Rate codes and the rate lookup port
//!
//! Special projects price from a per-plan, per-term, per-age rate table held
//! by the policy backend. The table is addressed by a six digit rate code.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use core_kernel::{DomainPort, PortError, ProjectCode};

use crate::error::PolicyError;
use crate::plan::{PlanCode, Term};

/// Underwriting age that fits in a rate code (0..=99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateAge(u8);

impl RateAge {
    pub fn new(age: i32) -> Result<Self, PolicyError> {
        if !(0..=99).contains(&age) {
            return Err(PolicyError::AgeOutOfRange(age));
        }
        Ok(RateAge(age as u8))
    }

    pub fn years(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RateAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Six digit key: plan, term and age, each zero-padded to two digits
///
/// Plan 72, term 8, age 15 is `"720815"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateCode(String);

impl RateCode {
    pub const WIDTH: usize = 6;

    pub fn new(plan: PlanCode, term: Term, age: RateAge) -> Self {
        RateCode(format!("{}{}{}", plan, term, age))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a rate table needs to find a rate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateKey {
    pub project_code: ProjectCode,
    pub plan_code: PlanCode,
    pub term: Term,
    pub age: RateAge,
}

impl RateKey {
    pub fn rate_code(&self) -> RateCode {
        RateCode::new(self.plan_code, self.term, self.age)
    }
}

/// Port for fetching tabulated premium rates
///
/// `Ok(None)` means the table has no entry for the key. Callers treat both
/// `None` and errors as "rate not found".
#[async_trait]
pub trait RateLookup: DomainPort {
    async fn lookup_rate(&self, key: &RateKey) -> Result<Option<Decimal>, PortError>;
}

#[async_trait]
impl<T: RateLookup + ?Sized> RateLookup for Arc<T> {
    async fn lookup_rate(&self, key: &RateKey) -> Result<Option<Decimal>, PortError> {
        (**self).lookup_rate(key).await
    }
}

/// In-memory rate table keyed by project and rate code
///
/// Used for bundled offline tables and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRateTable {
    rates: HashMap<(ProjectCode, RateCode), Decimal>,
}

impl StaticRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate, replacing any earlier entry for the same key
    pub fn with_rate(mut self, project_code: ProjectCode, rate_code: RateCode, rate: Decimal) -> Self {
        self.insert(project_code, rate_code, rate);
        self
    }

    pub fn insert(&mut self, project_code: ProjectCode, rate_code: RateCode, rate: Decimal) {
        self.rates.insert((project_code, rate_code), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl DomainPort for StaticRateTable {}

#[async_trait]
impl RateLookup for StaticRateTable {
    async fn lookup_rate(&self, key: &RateKey) -> Result<Option<Decimal>, PortError> {
        Ok(self
            .rates
            .get(&(key.project_code.clone(), key.rate_code()))
            .copied())
    }
}
