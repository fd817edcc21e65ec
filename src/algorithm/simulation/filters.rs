//! Eligibility filtering criteria
//!
//! This module decides which patients take part in a simulation step.
//! Patients that fail a criterion are skipped; failing eligibility is never
//! an error.

use chrono::NaiveDate;

use super::config::EligibilityConfig;
use crate::algorithm::chads_vasc::catalog::DiseaseCatalog;
use crate::models::{DiseaseGroup, Patient};

/// Defines a criterion for filtering entities
pub trait FilterCriteria<T> {
    /// Determine if an entity meets the filter criteria
    fn meets_criteria(&self, entity: &T) -> bool;
}

/// A patient observed at a step date
#[derive(Debug, Clone, Copy)]
pub struct PatientAt<'a> {
    /// The patient
    pub patient: &'a Patient,
    /// The step date
    pub date: NaiveDate,
}

/// A filter that can be applied to a patient at a date
#[derive(Debug, Clone)]
pub enum EligibilityFilter {
    /// Patient is alive at the date
    Alive,
    /// Patient has a disease of the group at the date
    HasDiseaseGroup {
        /// Diseases to look for
        group: DiseaseGroup,
        /// Chronic or acute presence
        chronic: bool,
    },
    /// The most recent diagnosis is at most this many days old
    ///
    /// Patients without diagnoses fail. A most recent diagnosis after the date
    /// gives a negative age and passes.
    RecentDiagnosis {
        /// Maximum age of the most recent diagnosis in days
        max_days: i64,
    },
    /// No medication under the ATC prefix is active at the date
    NotOnMedicationGroup(String),
    /// The date lies inside the patient's care range
    InCareRange,
    /// Combined filter that requires all criteria to be met
    All(Vec<EligibilityFilter>),
    /// Combined filter that requires any criterion to be met
    Any(Vec<EligibilityFilter>),
}

impl EligibilityFilter {
    /// Build the standard eligibility filter
    ///
    /// Alive, atrial fibrillation diagnosed, recently in care, and optionally
    /// not on an antithrombotic agent and inside the care range.
    #[must_use]
    pub fn from_config(config: &EligibilityConfig, catalog: &DiseaseCatalog) -> Self {
        let mut filters = vec![
            Self::Alive,
            Self::HasDiseaseGroup {
                group: catalog.atrial_fibrillation().clone(),
                chronic: true,
            },
            Self::RecentDiagnosis {
                max_days: config.max_days_since_last_diagnosis,
            },
        ];

        if config.exclude_antithrombotic {
            filters.push(Self::NotOnMedicationGroup(
                config.antithrombotic_prefix.clone(),
            ));
        }
        if config.require_care_range {
            filters.push(Self::InCareRange);
        }

        Self::All(filters)
    }
}

impl<'a> FilterCriteria<PatientAt<'a>> for EligibilityFilter {
    fn meets_criteria(&self, entity: &PatientAt<'a>) -> bool {
        let PatientAt { patient, date } = *entity;
        match self {
            Self::Alive => patient.is_alive(date),
            Self::HasDiseaseGroup { group, chronic } => {
                patient.has_disease_group(group, date, *chronic)
            }
            Self::RecentDiagnosis { max_days } => patient
                .days_since_last_diagnosis(date)
                .is_ok_and(|days| days <= *max_days),
            Self::NotOnMedicationGroup(prefix) => !patient.has_medication_group(prefix, date),
            Self::InCareRange => patient.in_care_range(date),
            Self::All(filters) => filters.iter().all(|f| f.meets_criteria(entity)),
            Self::Any(filters) => filters.iter().any(|f| f.meets_criteria(entity)),
        }
    }
}
