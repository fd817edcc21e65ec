//! Calendar arithmetic on `NaiveDate`
//!
//! Month and year offsets clamp to the last day of the target month, so
//! 2020-01-31 plus one month is 2020-02-29.

use chrono::{Months, NaiveDate};

use crate::error::{CohortError, Result};

/// Add a number of calendar months to a date
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CohortError::DateOutOfRange(format!("{date} + {months} months")))
}

/// Add a number of calendar years to a date
pub fn add_years(date: NaiveDate, years: u32) -> Result<NaiveDate> {
    let months = years
        .checked_mul(12)
        .ok_or_else(|| CohortError::DateOutOfRange(format!("{date} + {years} years")))?;
    add_months(date, months)
}

/// Add months, saturating at the last representable date
///
/// Used for open window bounds where "beyond the calendar" behaves the same
/// as "far in the future".
#[must_use]
pub fn add_months_saturating(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Signed number of days from `from` to `to`
#[must_use]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
