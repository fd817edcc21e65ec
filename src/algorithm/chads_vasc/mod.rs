//! CHA2DS2-VASc stroke risk score
//!
//! This module implements the CHA2DS2-VASc score for patients with atrial
//! fibrillation. The diagnosis-backed categories (C, H, D, S, V) are read from
//! an injected [`DiseaseCatalog`]; age and sex points are fixed:
//!
//! - Age 65 to 74: +1
//! - Age 75 and over: +2
//! - Female: +1
//!
//! Diagnoses are evaluated with chronic semantics: once diagnosed, a disease
//! counts towards the score for the rest of the patient's life.

pub mod catalog;
pub mod timeline;

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::models::Patient;
use catalog::{DiseaseCatalog, ScoreCategory};

/// Age from which one age point is added
pub const AGE_BAND_LOW: i32 = 65;
/// Age from which two age points are added
pub const AGE_BAND_HIGH: i32 = 75;

/// Per-category presence flags at a date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreComponents {
    /// Congestive heart failure
    pub heart_failure: bool,
    /// Hypertension
    pub hypertension: bool,
    /// Diabetes mellitus
    pub diabetes: bool,
    /// Prior stroke or TIA
    pub stroke: bool,
    /// Vascular disease
    pub vascular: bool,
}

impl ScoreComponents {
    /// Flag of one category
    #[must_use]
    pub const fn get(&self, category: ScoreCategory) -> bool {
        match category {
            ScoreCategory::CongestiveHeartFailure => self.heart_failure,
            ScoreCategory::Hypertension => self.hypertension,
            ScoreCategory::Diabetes => self.diabetes,
            ScoreCategory::StrokeTia => self.stroke,
            ScoreCategory::VascularDisease => self.vascular,
        }
    }

    fn set(&mut self, category: ScoreCategory, present: bool) {
        let flag = match category {
            ScoreCategory::CongestiveHeartFailure => &mut self.heart_failure,
            ScoreCategory::Hypertension => &mut self.hypertension,
            ScoreCategory::Diabetes => &mut self.diabetes,
            ScoreCategory::StrokeTia => &mut self.stroke,
            ScoreCategory::VascularDisease => &mut self.vascular,
        };
        *flag = present;
    }

    /// Flags in score order (C, H, D, S, V)
    #[must_use]
    pub const fn as_array(&self) -> [bool; 5] {
        [
            self.heart_failure,
            self.hypertension,
            self.diabetes,
            self.stroke,
            self.vascular,
        ]
    }
}

/// Points for age at a date
#[must_use]
pub const fn age_points(age: i32) -> u32 {
    if age >= AGE_BAND_HIGH {
        2
    } else if age >= AGE_BAND_LOW {
        1
    } else {
        0
    }
}

/// Computes CHA2DS2-VASc scores against a disease catalog
#[derive(Debug, Clone)]
pub struct RiskScoreEngine {
    catalog: Arc<DiseaseCatalog>,
}

impl RiskScoreEngine {
    /// Create an engine for a catalog
    #[must_use]
    pub const fn new(catalog: Arc<DiseaseCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog the engine scores against
    #[must_use]
    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog
    #[must_use]
    pub fn catalog_arc(&self) -> Arc<DiseaseCatalog> {
        Arc::clone(&self.catalog)
    }

    /// CHA2DS2-VASc score of a patient at a date
    #[must_use]
    pub fn calculate_score(&self, patient: &Patient, at: NaiveDate) -> u32 {
        let disease_points: u32 = self
            .catalog
            .score_groups()
            .iter()
            .filter(|g| patient.has_disease_group(&g.group, at, true))
            .map(|g| g.weight)
            .sum();

        let sex_points = u32::from(patient.is_female());

        disease_points + age_points(patient.calculate_age(at)) + sex_points
    }

    /// Which diagnosis-backed categories are present at a date
    #[must_use]
    pub fn score_components(&self, patient: &Patient, at: NaiveDate) -> ScoreComponents {
        let mut components = ScoreComponents::default();
        for group in self.catalog.score_groups() {
            if patient.has_disease_group(&group.group, at, true) {
                components.set(group.category, true);
            }
        }
        components
    }
}
