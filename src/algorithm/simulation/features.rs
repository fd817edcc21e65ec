//! Feature encoding of patient-months

use chrono::NaiveDate;

use super::config::{DEFAULT_DAYS_SENTINEL, FeatureMode};
use crate::algorithm::chads_vasc::RiskScoreEngine;
use crate::algorithm::chads_vasc::catalog::ScoreCategory;
use crate::models::{Disease, Patient};

/// Turns a patient at a date into a numeric feature vector
///
/// The vector holds the disease features of the selected mode followed by the
/// sex flag (1 for female) and the integer age.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    mode: FeatureMode,
    tracked: Vec<Disease>,
    days_sentinel: i64,
    engine: RiskScoreEngine,
}

impl FeatureEncoder {
    /// Create an encoder over the tracked diseases
    ///
    /// The tracked diseases are ignored in score-component mode.
    #[must_use]
    pub const fn new(mode: FeatureMode, tracked: Vec<Disease>, engine: RiskScoreEngine) -> Self {
        Self {
            mode,
            tracked,
            days_sentinel: DEFAULT_DAYS_SENTINEL,
            engine,
        }
    }

    /// Set the value used for never-diagnosed diseases in days-since mode
    #[must_use]
    pub const fn with_days_sentinel(mut self, sentinel: i64) -> Self {
        self.days_sentinel = sentinel;
        self
    }

    /// The feature mode
    #[must_use]
    pub const fn mode(&self) -> FeatureMode {
        self.mode
    }

    /// The tracked diseases
    #[must_use]
    pub fn tracked(&self) -> &[Disease] {
        &self.tracked
    }

    /// Names of the features, aligned with [`FeatureEncoder::encode`]
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = match self.mode {
            FeatureMode::PresenceFlags => self.tracked.iter().map(ToString::to_string).collect(),
            FeatureMode::DaysSinceDiagnosis => self
                .tracked
                .iter()
                .map(|d| format!("days since {d}"))
                .collect(),
            FeatureMode::ScoreComponents => ScoreCategory::all_categories()
                .iter()
                .map(|c| c.letter().to_string())
                .collect(),
        };
        labels.push("Gender".to_string());
        labels.push("Age".to_string());
        labels
    }

    /// Number of features per sample
    #[must_use]
    pub fn feature_count(&self) -> usize {
        let diseases = match self.mode {
            FeatureMode::ScoreComponents => ScoreCategory::all_categories().len(),
            _ => self.tracked.len(),
        };
        diseases + 2
    }

    /// Encode a patient at a date
    #[must_use]
    pub fn encode(&self, patient: &Patient, at: NaiveDate) -> Vec<i64> {
        let mut features = Vec::with_capacity(self.feature_count());

        match self.mode {
            FeatureMode::PresenceFlags => features.extend(
                self.tracked
                    .iter()
                    .map(|d| i64::from(patient.has_disease(d, at, true))),
            ),
            FeatureMode::DaysSinceDiagnosis => {
                features.extend(self.tracked.iter().map(|d| {
                    if patient.has_disease(d, at, true) {
                        patient.days_since_diagnosis(d, at)
                    } else {
                        self.days_sentinel
                    }
                }));
            }
            FeatureMode::ScoreComponents => features.extend(
                self.engine
                    .score_components(patient, at)
                    .as_array()
                    .into_iter()
                    .map(i64::from),
            ),
        }

        features.push(i64::from(patient.is_female()));
        features.push(i64::from(patient.calculate_age(at)));
        features
    }
}
