//! Calendar helpers for underwriting
//!
//! Quotes are priced against the insurer's local date, not UTC, and the
//! insured's age follows the fiscal-year convention rather than calendar age.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Month on which the underwriting age is bumped by one year
pub const AGE_BUMP_MONTH: u32 = 7;

/// Day of [`AGE_BUMP_MONTH`] from which the bump applies
pub const AGE_BUMP_DAY: u32 = 1;

/// Timezone wrapper for the insurer's jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| format!("Invalid timezone: {}", s))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the local calendar date for a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }

    /// Returns today's local date
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Dhaka)
    }
}

/// Derives the underwriting age used in rate codes.
///
/// `today.year - birth.year`, plus one when `today` falls on or after July 1.
/// The result is negative for birth dates after the current year and is not
/// clamped; callers decide whether that is acceptable.
pub fn underwriting_age(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) >= (AGE_BUMP_MONTH, AGE_BUMP_DAY) {
        age += 1;
    }
    age
}
