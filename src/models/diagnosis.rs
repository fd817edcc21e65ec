//! Diagnosis entity model
//!
//! This module contains the Diagnosis model, representing a diagnosis episode
//! (a billing-style diagnosis/treatment interval), and [`DiagnosisHistory`],
//! the per-patient aggregate of episodes keyed by disease.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

use crate::error::{CohortError, Result};
use crate::models::disease::{Disease, DiseaseGroup};

/// A diagnosis episode with an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    /// Diagnosed disease
    pub disease: Disease,
    /// First day of the episode
    start_date: NaiveDate,
    /// Last day of the episode (inclusive)
    end_date: NaiveDate,
    /// Practitioner responsible for the episode
    pub practitioner: Option<String>,
}

impl Diagnosis {
    /// Create a new diagnosis episode
    ///
    /// Fails when `end_date` is earlier than `start_date`.
    pub fn new(disease: Disease, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if end_date < start_date {
            return Err(CohortError::malformed("diagnosis", start_date, end_date));
        }

        Ok(Self {
            disease,
            start_date,
            end_date,
            practitioner: None,
        })
    }

    /// Attach the practitioner responsible for the episode
    #[must_use]
    pub fn with_practitioner(mut self, practitioner: impl Into<String>) -> Self {
        self.practitioner = Some(practitioner.into());
        self
    }

    /// First day of the episode
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the episode
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Whether the episode covers a date
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Extend the episode end, never shrinking it
    pub(crate) fn extend_to(&mut self, end_date: NaiveDate) {
        self.end_date = self.end_date.max(end_date);
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}~{}", self.disease, self.start_date, self.end_date)
    }
}

/// Diagnoses of one patient, grouped by disease and ordered by start date
#[derive(Debug, Clone, Default)]
pub struct DiagnosisHistory {
    by_disease: FxHashMap<Disease, Vec<Diagnosis>>,
    last: Option<Diagnosis>,
    count: usize,
}

impl DiagnosisHistory {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnosis, keeping the per-disease list ordered by start date
    ///
    /// Diagnoses with equal start dates keep their insertion order.
    pub fn add(&mut self, diagnosis: Diagnosis) {
        let more_recent = self
            .last
            .as_ref()
            .is_none_or(|last| diagnosis.start_date >= last.start_date);
        if more_recent {
            self.last = Some(diagnosis.clone());
        }

        let episodes = self.by_disease.entry(diagnosis.disease.clone()).or_default();
        let position = episodes.partition_point(|d| d.start_date <= diagnosis.start_date);
        episodes.insert(position, diagnosis);
        self.count += 1;
    }

    /// Episodes recorded for a disease
    #[must_use]
    pub fn get(&self, disease: &Disease) -> &[Diagnosis] {
        self.by_disease.get(disease).map_or(&[], Vec::as_slice)
    }

    /// Whether any episode of the disease was recorded
    #[must_use]
    pub fn contains(&self, disease: &Disease) -> bool {
        self.by_disease.contains_key(disease)
    }

    /// Iterate over every recorded episode
    pub fn iter_all(&self) -> impl Iterator<Item = &Diagnosis> {
        self.by_disease.values().flatten()
    }

    /// Iterate over the episodes of every disease in a group, in group order
    pub fn iter_group<'a>(
        &'a self,
        group: &'a DiseaseGroup,
    ) -> impl Iterator<Item = &'a Diagnosis> {
        group.iter().flat_map(move |disease| self.get(disease).iter())
    }

    /// Diseases with at least one episode
    pub fn diseases(&self) -> impl Iterator<Item = &Disease> {
        self.by_disease.keys()
    }

    /// The most recent diagnosis by start date
    #[must_use]
    pub const fn last(&self) -> Option<&Diagnosis> {
        self.last.as_ref()
    }

    /// Total number of episodes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether no episodes were recorded
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}
