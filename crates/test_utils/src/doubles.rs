//! Port Doubles
//!
//! `ScriptedConfirmation` lives next to its port in `domain_billing` and is
//! re-exported here; `ScriptedRateLookup` is the rate-side equivalent.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use core_kernel::{DomainPort, PortError};
use domain_policy::{RateKey, RateLookup};

pub use domain_billing::ports::mock::ScriptedConfirmation;

#[derive(Debug, Clone)]
enum Script {
    Rate(Decimal),
    Fail,
}

/// Rate lookup answering from a script, recording every key it is asked for
///
/// Unscripted rate codes answer `Ok(None)`.
#[derive(Debug, Default)]
pub struct ScriptedRateLookup {
    script: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<RateKey>>,
}

impl ScriptedRateLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `rate` for `rate_code`
    pub fn with_rate(self, rate_code: &str, rate: Decimal) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(rate_code.to_string(), Script::Rate(rate));
        self
    }

    /// Fails lookups of `rate_code` with a connection error
    pub fn failing_for(self, rate_code: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(rate_code.to_string(), Script::Fail);
        self
    }

    pub fn calls(&self) -> Vec<RateKey> {
        self.calls.lock().unwrap().clone()
    }
}

impl DomainPort for ScriptedRateLookup {}

#[async_trait]
impl RateLookup for ScriptedRateLookup {
    async fn lookup_rate(&self, key: &RateKey) -> Result<Option<Decimal>, PortError> {
        self.calls.lock().unwrap().push(key.clone());
        let script = self.script.lock().unwrap().get(key.rate_code().as_str()).cloned();
        match script {
            Some(Script::Rate(rate)) => Ok(Some(rate)),
            Some(Script::Fail) => Err(PortError::connection("simulated rate service outage")),
            None => Ok(None),
        }
    }
}
