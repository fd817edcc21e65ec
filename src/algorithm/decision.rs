//! Anticoagulation decision policies
//!
//! A policy answers one question: should this patient be anticoagulated at
//! this date? Three policies are available:
//!
//! - [`ThresholdPolicy`]: the live CHA2DS2-VASc score reaches a threshold
//! - [`EventBasedPolicy`]: the precomputed change timeline reaches a threshold
//! - [`FutureStrokePolicy`]: the patient has a stroke within a window after
//!   the date (the observed outcome used as ground truth)
//!
//! [`DecisionPolicy`] wraps the three in a closed enum, and [`PolicyConfig`]
//! is its serializable description.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::algorithm::chads_vasc::RiskScoreEngine;
use crate::algorithm::chads_vasc::catalog::DiseaseCatalog;
use crate::models::{DiseaseGroup, Patient};
use crate::utils::add_months_saturating;

/// Score from which anticoagulation is advised
pub const DEFAULT_THRESHOLD: u32 = 3;

/// Months after the decision date in which a stroke counts as an outcome
pub const DEFAULT_STROKE_WINDOW_MONTHS: u32 = 12;

/// Decides whether a patient should be anticoagulated at a date
pub trait AnticoagulationPolicy {
    /// Make the decision
    fn decide(&self, patient: &Patient, at: NaiveDate) -> bool;

    /// Short name of the policy, used in logs and reports
    fn name(&self) -> &'static str;
}

/// Live score compared against a threshold
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    engine: RiskScoreEngine,
    threshold: u32,
}

impl ThresholdPolicy {
    /// Create a threshold policy
    #[must_use]
    pub const fn new(engine: RiskScoreEngine, threshold: u32) -> Self {
        Self { engine, threshold }
    }

    /// The threshold score
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl AnticoagulationPolicy for ThresholdPolicy {
    fn decide(&self, patient: &Patient, at: NaiveDate) -> bool {
        self.engine.calculate_score(patient, at) >= self.threshold
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

/// Precomputed change timeline compared against a threshold
///
/// Patients whose timeline was not built are never anticoagulated.
#[derive(Debug, Clone, Copy)]
pub struct EventBasedPolicy {
    threshold: u32,
}

impl EventBasedPolicy {
    /// Create an event-based policy
    #[must_use]
    pub const fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// The threshold score
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl AnticoagulationPolicy for EventBasedPolicy {
    fn decide(&self, patient: &Patient, at: NaiveDate) -> bool {
        patient
            .change_timeline()
            .score_at(at)
            .is_some_and(|score| score >= self.threshold)
    }

    fn name(&self) -> &'static str {
        "event_based"
    }
}

/// Observed outcome: a stroke starts in `(at, at + window]`
#[derive(Debug, Clone)]
pub struct FutureStrokePolicy {
    stroke_group: DiseaseGroup,
    window_months: u32,
}

impl FutureStrokePolicy {
    /// Create a future-stroke policy
    #[must_use]
    pub const fn new(stroke_group: DiseaseGroup, window_months: u32) -> Self {
        Self {
            stroke_group,
            window_months,
        }
    }

    /// Length of the outcome window in months
    #[must_use]
    pub const fn window_months(&self) -> u32 {
        self.window_months
    }
}

impl AnticoagulationPolicy for FutureStrokePolicy {
    fn decide(&self, patient: &Patient, at: NaiveDate) -> bool {
        let window_end = add_months_saturating(at, self.window_months);
        patient
            .diagnoses()
            .iter_group(&self.stroke_group)
            .any(|d| at < d.start_date() && d.start_date() <= window_end)
    }

    fn name(&self) -> &'static str {
        "future_stroke"
    }
}

/// Closed set of decision policies
#[derive(Debug, Clone)]
pub enum DecisionPolicy {
    /// Live score threshold
    Threshold(ThresholdPolicy),
    /// Precomputed timeline threshold
    EventBased(EventBasedPolicy),
    /// Observed future stroke
    FutureStroke(FutureStrokePolicy),
}

impl DecisionPolicy {
    /// Live score policy
    #[must_use]
    pub const fn threshold(engine: RiskScoreEngine, threshold: u32) -> Self {
        Self::Threshold(ThresholdPolicy::new(engine, threshold))
    }

    /// Timeline policy
    #[must_use]
    pub const fn event_based(threshold: u32) -> Self {
        Self::EventBased(EventBasedPolicy::new(threshold))
    }

    /// Future stroke policy
    #[must_use]
    pub const fn future_stroke(stroke_group: DiseaseGroup, window_months: u32) -> Self {
        Self::FutureStroke(FutureStrokePolicy::new(stroke_group, window_months))
    }
}

impl AnticoagulationPolicy for DecisionPolicy {
    fn decide(&self, patient: &Patient, at: NaiveDate) -> bool {
        match self {
            Self::Threshold(policy) => policy.decide(patient, at),
            Self::EventBased(policy) => policy.decide(patient, at),
            Self::FutureStroke(policy) => policy.decide(patient, at),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Threshold(policy) => policy.name(),
            Self::EventBased(policy) => policy.name(),
            Self::FutureStroke(policy) => policy.name(),
        }
    }
}

/// Serializable description of a [`DecisionPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    /// See [`ThresholdPolicy`]
    Threshold {
        /// Minimum score
        threshold: u32,
    },
    /// See [`EventBasedPolicy`]
    EventBased {
        /// Minimum score
        threshold: u32,
    },
    /// See [`FutureStrokePolicy`]
    FutureStroke {
        /// Window length in months
        window_months: u32,
    },
}

impl PolicyConfig {
    /// Build the policy against a catalog
    #[must_use]
    pub fn build(&self, catalog: &Arc<DiseaseCatalog>) -> DecisionPolicy {
        match *self {
            Self::Threshold { threshold } => {
                DecisionPolicy::threshold(RiskScoreEngine::new(Arc::clone(catalog)), threshold)
            }
            Self::EventBased { threshold } => DecisionPolicy::event_based(threshold),
            Self::FutureStroke { window_months } => {
                DecisionPolicy::future_stroke(catalog.stroke().clone(), window_months)
            }
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::FutureStroke {
            window_months: DEFAULT_STROKE_WINDOW_MONTHS,
        }
    }
}

impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold { threshold } => write!(f, "threshold (score >= {threshold})"),
            Self::EventBased { threshold } => write!(f, "event based (score >= {threshold})"),
            Self::FutureStroke { window_months } => {
                write!(f, "future stroke (within {window_months} months)")
            }
        }
    }
}
