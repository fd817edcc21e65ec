//! Medication entity model

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::{CohortError, Result};

/// A prescription identified by its ATC code
///
/// An absent end date means no stop was recorded and the prescription is
/// still active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Medication {
    /// Hierarchical ATC classification code
    pub code: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl Medication {
    /// Create a new medication record
    ///
    /// Fails when a recorded end date is earlier than the start date.
    pub fn new(
        code: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(CohortError::malformed("medication", start_date, end));
            }
        }

        Ok(Self {
            code: code.into(),
            start_date,
            end_date,
        })
    }

    /// First day of the prescription
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the prescription, if a stop was recorded
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Whether the prescription is active on a date
    #[must_use]
    pub fn is_active_at(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.is_none_or(|end| date <= end)
    }

    /// Whether the code falls under an ATC prefix
    #[must_use]
    pub fn in_group(&self, prefix: &str) -> bool {
        self.code.starts_with(prefix)
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_date {
            Some(end) => write!(f, "{} {}~{}", self.code, self.start_date, end),
            None => write!(f, "{} {}~", self.code, self.start_date),
        }
    }
}
