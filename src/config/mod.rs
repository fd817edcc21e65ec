//! Configuration for linking and merging clinical records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CohortError, Result};

/// Rule deciding whether a diagnosis continues the current episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityRule {
    /// Continuous when the diagnosis starts at most this many days after the
    /// current episode ends
    GapDays(u32),
    /// Continuous when the one-day gap rule holds, or when the diagnosis
    /// starts in the calendar year in which the current episode ends
    SameBillingYear,
}

impl ContinuityRule {
    /// Whether a diagnosis starting on `start` continues an episode ending on `current_end`
    #[must_use]
    pub fn is_continuous(self, current_end: NaiveDate, start: NaiveDate) -> bool {
        let within_gap = |gap: u32| {
            current_end
                .checked_add_days(chrono::Days::new(u64::from(gap)))
                .is_none_or(|limit| start <= limit)
        };

        match self {
            Self::GapDays(gap) => within_gap(gap),
            Self::SameBillingYear => within_gap(1) || start.year() == current_end.year(),
        }
    }
}

impl Default for ContinuityRule {
    fn default() -> Self {
        Self::GapDays(1)
    }
}

impl fmt::Display for ContinuityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GapDays(days) => write!(f, "gap of at most {days} day(s)"),
            Self::SameBillingYear => write!(f, "same billing year"),
        }
    }
}

/// Configuration for the diagnosis interval merger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Rule for extending an episode
    #[serde(default)]
    pub continuity: ContinuityRule,
    /// Whether a change of practitioner always starts a new episode
    #[serde(default = "default_split_on_practitioner")]
    pub split_on_practitioner: bool,
}

const fn default_split_on_practitioner() -> bool {
    true
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeConfig {
    /// Create the default configuration (one-day gap, split on practitioner)
    #[must_use]
    pub fn new() -> Self {
        Self {
            continuity: ContinuityRule::default(),
            split_on_practitioner: true,
        }
    }

    /// Set the continuity rule
    #[must_use]
    pub const fn with_continuity(mut self, continuity: ContinuityRule) -> Self {
        self.continuity = continuity;
        self
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(CohortError::from)
    }
}

impl fmt::Display for MergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Merge Configuration:")?;
        writeln!(f, "  Continuity: {}", self.continuity)?;
        writeln!(f, "  Split On Practitioner: {}", self.split_on_practitioner)
    }
}
