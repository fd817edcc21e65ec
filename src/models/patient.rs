//! Patient timeline model
//!
//! A [`Patient`] aggregates the merged diagnoses, medications and demographic
//! facts of one person and answers point-in-time questions about them.
//!
//! Disease presence can be asked in two ways. The *chronic* model treats a
//! disease as present from the start of its first episode onwards, regardless
//! of the episode's recorded end date. The *acute* model requires the date to
//! fall inside an episode.

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

use crate::error::{CohortError, Result};
use crate::models::diagnosis::{Diagnosis, DiagnosisHistory};
use crate::models::disease::{Disease, DiseaseGroup};
use crate::models::medication::Medication;
use crate::models::timeline::ChangeTimeline;
use crate::utils::{add_months, days_between};

/// Unique patient number
pub type PatientId = u64;

/// Sex codes that mark a patient as female (`v` for *vrouw*)
const FEMALE_CODES: [&str; 2] = ["v", "f"];

/// The span from a patient's first recorded event to the last one plus a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CareRange {
    /// First recorded event
    pub start: NaiveDate,
    /// Last recorded event end plus the buffer
    pub end: NaiveDate,
}

impl CareRange {
    /// Whether a date falls inside the range (inclusive)
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Longitudinal clinical record of one patient
#[derive(Debug, Clone)]
pub struct Patient {
    /// Patient number
    pub number: PatientId,
    /// Sex code as registered
    pub sex: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    death_date: Option<NaiveDate>,
    diagnoses: DiagnosisHistory,
    medications: FxHashMap<String, Vec<Medication>>,
    change_timeline: ChangeTimeline,
    care_range: Option<CareRange>,
}

impl Patient {
    /// Create a patient without recorded events
    pub fn new(
        number: PatientId,
        sex: impl Into<String>,
        birth_date: NaiveDate,
        death_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            number,
            sex: sex.into(),
            birth_date,
            death_date,
            diagnoses: DiagnosisHistory::new(),
            medications: FxHashMap::default(),
            change_timeline: ChangeTimeline::default(),
            care_range: None,
        }
    }

    /// Recorded death date; `None` for living patients
    #[must_use]
    pub const fn death_date(&self) -> Option<NaiveDate> {
        self.death_date
    }

    /// Add a (merged) diagnosis episode
    ///
    /// Side effects:
    /// - When the episode starts on or after the recorded death date, the
    ///   death date is moved to the day after the episode start. Mortality
    ///   records are sometimes inconsistent with care records, and care
    ///   records win.
    /// - The change timeline is cleared and must be rebuilt before the
    ///   event-based decision policy can use it again.
    pub fn add_diagnosis(&mut self, diagnosis: Diagnosis) {
        let start = diagnosis.start_date();
        if let Some(death) = self.death_date {
            if start >= death {
                let repaired = start.succ_opt().unwrap_or(start);
                log::debug!(
                    "Patient {}: diagnosis on {start} after death on {death}, moved to {repaired}",
                    self.number
                );
                self.death_date = Some(repaired);
            }
        }

        self.diagnoses.add(diagnosis);
        self.change_timeline = ChangeTimeline::default();
    }

    /// Add a medication record
    pub fn add_medication(&mut self, medication: Medication) {
        let list = self.medications.entry(medication.code.clone()).or_default();
        let position = list.partition_point(|m| m.start_date() <= medication.start_date());
        list.insert(position, medication);
    }

    /// The diagnosis history
    #[must_use]
    pub const fn diagnoses(&self) -> &DiagnosisHistory {
        &self.diagnoses
    }

    /// Medication records for an exact code
    #[must_use]
    pub fn medications(&self, code: &str) -> &[Medication] {
        self.medications.get(code).map_or(&[], Vec::as_slice)
    }

    /// Iterate over all medication records
    pub fn iter_medications(&self) -> impl Iterator<Item = &Medication> {
        self.medications.values().flatten()
    }

    /// Check whether the patient has a disease at a date
    #[must_use]
    pub fn has_disease(&self, disease: &Disease, at: NaiveDate, chronic: bool) -> bool {
        self.diagnoses
            .get(disease)
            .iter()
            .any(|d| if chronic { d.start_date() <= at } else { d.covers(at) })
    }

    /// Check whether the patient has any disease of a group at a date
    #[must_use]
    pub fn has_disease_group(&self, group: &DiseaseGroup, at: NaiveDate, chronic: bool) -> bool {
        group.iter().any(|disease| self.has_disease(disease, at, chronic))
    }

    /// Episodes covering a date
    #[must_use]
    pub fn current_diagnoses(&self, at: NaiveDate) -> Vec<&Diagnosis> {
        self.diagnoses.iter_all().filter(|d| d.covers(at)).collect()
    }

    /// Days since the latest episode start of a disease on or before `at`
    ///
    /// Returns `0` when no episode started on or before `at`. That zero means
    /// "no signal" and is indistinguishable from a diagnosis made on `at`
    /// itself; callers should check [`Patient::has_disease`] first.
    #[must_use]
    pub fn days_since_diagnosis(&self, disease: &Disease, at: NaiveDate) -> i64 {
        self.diagnoses
            .get(disease)
            .iter()
            .map(|d| days_between(d.start_date(), at))
            .filter(|days| *days >= 0)
            .min()
            .unwrap_or(0)
    }

    /// Days from the most recent diagnosis start to `at`
    ///
    /// Negative when the most recent diagnosis starts after `at`.
    pub fn days_since_last_diagnosis(&self, at: NaiveDate) -> Result<i64> {
        self.diagnoses
            .last()
            .map(|last| days_between(last.start_date(), at))
            .ok_or_else(|| CohortError::missing_history(self.number, "no diagnoses recorded"))
    }

    /// Age in whole years at a date
    #[must_use]
    pub fn calculate_age(&self, at: NaiveDate) -> i32 {
        let years = at.year() - self.birth_date.year();
        if (at.month(), at.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years - 1
        } else {
            years
        }
    }

    /// Whether the sex code marks the patient as female
    #[must_use]
    pub fn is_female(&self) -> bool {
        FEMALE_CODES
            .iter()
            .any(|code| self.sex.eq_ignore_ascii_case(code))
    }

    /// Whether the patient is alive at a date
    ///
    /// Alive covers `[birth_date, death_date)`: a patient is not alive on
    /// the death date itself.
    #[must_use]
    pub fn is_alive(&self, at: NaiveDate) -> bool {
        self.birth_date <= at && self.death_date.is_none_or(|death| at < death)
    }

    /// Whether a medication with an exact code is active at a date
    #[must_use]
    pub fn has_medication(&self, code: &str, at: NaiveDate) -> bool {
        self.medications(code).iter().any(|m| m.is_active_at(at))
    }

    /// Whether any medication under an ATC prefix is active at a date
    #[must_use]
    pub fn has_medication_group(&self, prefix: &str, at: NaiveDate) -> bool {
        self.active_medication_in_group(prefix, at).is_some()
    }

    /// Code of the most recently started active medication under an ATC prefix
    #[must_use]
    pub fn active_medication_in_group(&self, prefix: &str, at: NaiveDate) -> Option<&str> {
        self.iter_medications()
            .filter(|m| m.in_group(prefix) && m.is_active_at(at))
            .max_by_key(|m| m.start_date())
            .map(|m| m.code.as_str())
    }

    /// Start dates of episodes belonging to a group, sorted and deduplicated
    #[must_use]
    pub fn stroke_dates(&self, stroke_group: &DiseaseGroup) -> Vec<NaiveDate> {
        self.diagnoses
            .iter_group(stroke_group)
            .map(Diagnosis::start_date)
            .sorted()
            .dedup()
            .collect()
    }

    /// Compute and store the care range
    ///
    /// The range runs from the earliest diagnosis or medication start to the
    /// latest recorded event plus `extra_months`. An open-ended medication
    /// contributes its start date, never an open end.
    pub fn set_care_range(&mut self, extra_months: u32) -> Result<CareRange> {
        let starts = self
            .diagnoses
            .iter_all()
            .map(Diagnosis::start_date)
            .chain(self.iter_medications().map(Medication::start_date));

        let ends = self
            .diagnoses
            .iter_all()
            .map(Diagnosis::end_date)
            .chain(
                self.iter_medications()
                    .map(|m| m.end_date().unwrap_or_else(|| m.start_date())),
            );

        let (first, last_end) = match (starts.min(), ends.max()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(CohortError::missing_history(
                    self.number,
                    "no diagnoses or medications to derive a care range from",
                ));
            }
        };

        let range = CareRange {
            start: first,
            end: add_months(last_end, extra_months)?,
        };
        self.care_range = Some(range);
        Ok(range)
    }

    /// The care range, if it was computed
    #[must_use]
    pub const fn care_range(&self) -> Option<CareRange> {
        self.care_range
    }

    /// Whether a date falls inside the computed care range
    ///
    /// Always false when no care range was computed.
    #[must_use]
    pub fn in_care_range(&self, at: NaiveDate) -> bool {
        self.care_range.is_some_and(|range| range.contains(at))
    }

    /// The precomputed score change timeline
    #[must_use]
    pub const fn change_timeline(&self) -> &ChangeTimeline {
        &self.change_timeline
    }

    /// Store a freshly built score change timeline
    pub fn set_change_timeline(&mut self, timeline: ChangeTimeline) {
        self.change_timeline = timeline;
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Patient {} ({}, born {}", self.number, self.sex, self.birth_date)?;
        if let Some(death) = self.death_date {
            write!(f, ", died {death}")?;
        }
        write!(f, ", {} diagnoses)", self.diagnoses.len())
    }
}
