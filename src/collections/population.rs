//! Population of patients
//!
//! The population owns every [`Patient`] of one study together with the
//! disease catalog the study scores against. Patients are created from
//! demographic records first; diagnosis and medication records are then
//! linked to them by patient number.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::algorithm::chads_vasc::RiskScoreEngine;
use crate::algorithm::chads_vasc::catalog::DiseaseCatalog;
use crate::algorithm::merging::DiagnosisMerger;
use crate::error::Result;
use crate::models::{Diagnosis, Disease, Medication, Patient, PatientId};

/// Outcome of linking records to patients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachReport {
    /// Records stored on a patient (after merging, for diagnoses)
    pub attached: usize,
    /// Records skipped because their patient is unknown
    pub skipped: usize,
    /// Unknown patient numbers encountered
    pub unknown_patients: BTreeSet<PatientId>,
}

impl AttachReport {
    fn skip(&mut self, patient: PatientId) {
        self.skipped += 1;
        self.unknown_patients.insert(patient);
    }

    fn log_unknown(&self, kind: &str) {
        if !self.unknown_patients.is_empty() {
            log::warn!(
                "Skipped {} {kind} record(s) for {} unknown patient(s): {:?}",
                self.skipped,
                self.unknown_patients.len(),
                self.unknown_patients
            );
        }
    }
}

/// All patients of a study
#[derive(Debug, Clone)]
pub struct Population {
    catalog: Arc<DiseaseCatalog>,
    patients: BTreeMap<PatientId, Patient>,
}

impl Population {
    /// Create an empty population scored against a catalog
    #[must_use]
    pub const fn new(catalog: Arc<DiseaseCatalog>) -> Self {
        Self {
            catalog,
            patients: BTreeMap::new(),
        }
    }

    /// Create a population from patients
    ///
    /// A later patient replaces an earlier one with the same number.
    pub fn from_patients(
        catalog: Arc<DiseaseCatalog>,
        patients: impl IntoIterator<Item = Patient>,
    ) -> Result<Self> {
        let mut population = Self::new(catalog);
        for patient in patients {
            population.add_patient(patient)?;
        }
        Ok(population)
    }

    /// The catalog of the study
    #[must_use]
    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog
    #[must_use]
    pub fn catalog_arc(&self) -> Arc<DiseaseCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Add a patient, returning the patient it replaced
    ///
    /// The change timeline is rebuilt against the population's catalog, so
    /// diagnoses recorded before the patient joined are scored.
    pub fn add_patient(&mut self, mut patient: Patient) -> Result<Option<Patient>> {
        RiskScoreEngine::new(Arc::clone(&self.catalog)).refresh_change_timeline(&mut patient)?;
        Ok(self.patients.insert(patient.number, patient))
    }

    /// Look up a patient
    #[must_use]
    pub fn get(&self, number: PatientId) -> Option<&Patient> {
        self.patients.get(&number)
    }

    /// Look up a patient for modification
    pub fn get_mut(&mut self, number: PatientId) -> Option<&mut Patient> {
        self.patients.get_mut(&number)
    }

    /// Iterate over patients in ascending patient number
    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    /// Patient numbers in ascending order
    pub fn numbers(&self) -> impl Iterator<Item = PatientId> + '_ {
        self.patients.keys().copied()
    }

    /// Number of patients
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Whether the population is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Link raw diagnosis records to patients
    ///
    /// Records are grouped per patient and merged into continuous episodes
    /// before they are added. All raw diagnoses of a patient should be
    /// attached in one call, since episodes are only merged within a batch.
    /// The change timeline of every touched patient is rebuilt.
    pub fn attach_diagnoses(
        &mut self,
        records: impl IntoIterator<Item = (PatientId, Diagnosis)>,
        merger: &DiagnosisMerger,
    ) -> Result<AttachReport> {
        let mut report = AttachReport::default();
        let mut per_patient: FxHashMap<PatientId, Vec<Diagnosis>> = FxHashMap::default();

        for (number, diagnosis) in records {
            if self.patients.contains_key(&number) {
                per_patient.entry(number).or_default().push(diagnosis);
            } else {
                report.skip(number);
            }
        }

        let engine = RiskScoreEngine::new(Arc::clone(&self.catalog));
        for (number, raw) in per_patient {
            let Some(patient) = self.patients.get_mut(&number) else {
                continue;
            };
            for diagnosis in merger.merge_patient(raw) {
                patient.add_diagnosis(diagnosis);
                report.attached += 1;
            }
            engine.refresh_change_timeline(patient)?;
        }

        report.log_unknown("diagnosis");
        log::debug!("Attached {} merged diagnoses", report.attached);
        Ok(report)
    }

    /// Link medication records to patients
    pub fn attach_medications(
        &mut self,
        records: impl IntoIterator<Item = (PatientId, Medication)>,
    ) -> AttachReport {
        let mut report = AttachReport::default();

        for (number, medication) in records {
            match self.patients.get_mut(&number) {
                Some(patient) => {
                    patient.add_medication(medication);
                    report.attached += 1;
                }
                None => report.skip(number),
            }
        }

        report.log_unknown("medication");
        report
    }

    /// Rebuild the change timeline of every patient
    pub fn rebuild_change_timelines(&mut self) -> Result<()> {
        let engine = RiskScoreEngine::new(Arc::clone(&self.catalog));
        for patient in self.patients.values_mut() {
            engine.refresh_change_timeline(patient)?;
        }
        Ok(())
    }

    /// Compute the care range of every patient with recorded events
    ///
    /// Returns the number of patients that received a care range.
    pub fn set_care_ranges(&mut self, extra_months: u32) -> usize {
        let mut count = 0;
        for patient in self.patients.values_mut() {
            match patient.set_care_range(extra_months) {
                Ok(_) => count += 1,
                Err(e) => log::debug!("{e}"),
            }
        }
        count
    }

    /// Number of merged episodes per disease across the population
    #[must_use]
    pub fn disease_frequency(&self) -> FxHashMap<Disease, usize> {
        let mut frequency: FxHashMap<Disease, usize> = FxHashMap::default();
        for diagnosis in self.patients.values().flat_map(|p| p.diagnoses().iter_all()) {
            *frequency.entry(diagnosis.disease.clone()).or_default() += 1;
        }
        frequency
    }

    /// Diseases with at least `min_frequency` episodes, in disease order
    ///
    /// Used to select the tracked diseases of the feature encoder.
    #[must_use]
    pub fn tracked_diseases(&self, min_frequency: usize) -> Vec<Disease> {
        let mut diseases: Vec<Disease> = self
            .disease_frequency()
            .into_iter()
            .filter(|(_, count)| *count >= min_frequency)
            .map(|(disease, _)| disease)
            .collect();
        diseases.sort();
        diseases
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Patient;
    type IntoIter = std::collections::btree_map::Values<'a, PatientId, Patient>;

    fn into_iter(self) -> Self::IntoIter {
        self.patients.values()
    }
}
