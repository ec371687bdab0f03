//! Expiration checks and the source of "today".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing an expiration date against today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    /// The expiration date is today or later.
    Valid,
    /// The expiration date is strictly before today.
    Expired,
}

impl Validity {
    /// Classifies an expiration date relative to `today`.
    #[must_use]
    pub fn of(expiration_date: NaiveDate, today: NaiveDate) -> Self {
        if is_valid(expiration_date, today) {
            Self::Valid
        } else {
            Self::Expired
        }
    }
}

/// Returns true unless `expiration_date` is strictly before `today`.
///
/// Both sides are calendar dates, so time of day never enters the comparison.
#[must_use]
pub fn is_valid(expiration_date: NaiveDate, today: NaiveDate) -> bool {
    expiration_date >= today
}

/// Supplies the current calendar date.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns today's date in the zone used for every license decision.
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a single date, for deterministic tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
