//! Error handling for the cohort model.
//!
//! Construction-time invariant violations and missing patient history are
//! reported through [`CohortError`]. Eligibility failures during simulation
//! are not errors; they are filtered out by the simulation engine.

use chrono::NaiveDate;

use crate::models::patient::PatientId;

/// Errors raised by the clinical record model and the simulation engine
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    /// An interval ends before it starts
    #[error("Malformed {kind} interval: ends on {end} before it starts on {start}")]
    MalformedInterval {
        /// What kind of record carried the interval (diagnosis, medication)
        kind: &'static str,
        /// Start date of the interval
        start: NaiveDate,
        /// End date of the interval
        end: NaiveDate,
    },

    /// A query needed events that the patient does not have
    #[error("Missing history for patient {patient}: {reason}")]
    MissingHistory {
        /// Number of the patient
        patient: PatientId,
        /// What was missing
        reason: &'static str,
    },

    /// Configuration values that cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Date arithmetic left the representable calendar range
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    /// Two label sequences that must be aligned differ in length
    #[error("Length mismatch: {observed} observed labels vs {predicted} predicted labels")]
    LengthMismatch {
        /// Number of observed labels
        observed: usize,
        /// Number of predicted labels
        predicted: usize,
    },
}

impl CohortError {
    /// Create a malformed interval error
    #[must_use]
    pub const fn malformed(kind: &'static str, start: NaiveDate, end: NaiveDate) -> Self {
        Self::MalformedInterval { kind, start, end }
    }

    /// Create a missing history error
    #[must_use]
    pub const fn missing_history(patient: PatientId, reason: &'static str) -> Self {
        Self::MissingHistory { patient, reason }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type for cohort operations
pub type Result<T> = std::result::Result<T, CohortError>;
