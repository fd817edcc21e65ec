//! Diagnosis interval merging
//!
//! Raw diagnosis records frequently repeat or overlap: every follow-up visit
//! opens a new billing episode for the same disease. The merger collapses the
//! records of one patient into a minimal list of continuous episodes per
//! disease. A change of practitioner always starts a new episode, so the
//! practitioner stays a meaningful attribute of the merged episode.

use rustc_hash::FxHashMap;

use crate::config::MergeConfig;
use crate::models::{Diagnosis, Disease};

/// Merges raw diagnosis episodes into continuous episodes
#[derive(Debug, Clone, Default)]
pub struct DiagnosisMerger {
    config: MergeConfig,
}

impl DiagnosisMerger {
    /// Create a merger with the given configuration
    #[must_use]
    pub const fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge the episodes of a single disease
    ///
    /// Episodes are stably sorted by start date, so episodes sharing a start
    /// date are merged in input order.
    #[must_use]
    pub fn merge(&self, mut diagnoses: Vec<Diagnosis>) -> Vec<Diagnosis> {
        if diagnoses.len() < 2 {
            return diagnoses;
        }

        diagnoses.sort_by_key(Diagnosis::start_date);

        let mut merged: Vec<Diagnosis> = Vec::with_capacity(diagnoses.len());
        for diagnosis in diagnoses {
            match merged.last_mut() {
                Some(current) if self.continues(current, &diagnosis) => {
                    current.extend_to(diagnosis.end_date());
                }
                _ => merged.push(diagnosis),
            }
        }

        merged
    }

    /// Merge all episodes of one patient, disease by disease
    ///
    /// The result is ordered by start date; episodes of different diseases
    /// sharing a start date keep the order in which the diseases first
    /// appeared in the input.
    #[must_use]
    pub fn merge_patient(&self, diagnoses: Vec<Diagnosis>) -> Vec<Diagnosis> {
        let mut index: FxHashMap<Disease, usize> = FxHashMap::default();
        let mut groups: Vec<Vec<Diagnosis>> = Vec::new();

        for diagnosis in diagnoses {
            let slot = *index.entry(diagnosis.disease.clone()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(diagnosis);
        }

        let mut merged: Vec<Diagnosis> = groups
            .into_iter()
            .flat_map(|group| self.merge(group))
            .collect();
        merged.sort_by_key(Diagnosis::start_date);
        merged
    }

    fn continues(&self, current: &Diagnosis, next: &Diagnosis) -> bool {
        if self.config.split_on_practitioner && current.practitioner != next.practitioner {
            return false;
        }
        self.config
            .continuity
            .is_continuous(current.end_date(), next.start_date())
    }
}
