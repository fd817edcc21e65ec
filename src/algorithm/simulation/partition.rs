//! Learn/test partition of a population
//!
//! The partition is drawn once per simulation run at the patient level, so
//! all samples of one patient land in the same partition.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

use super::config::{PartitionConfig, PartitionStrategy};
use crate::collections::Population;
use crate::models::PatientId;

/// Partition a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionTag {
    /// Used for fitting a model
    Learn,
    /// Held out for evaluation
    Test,
}

impl PartitionTag {
    /// Whether this is the test partition
    #[must_use]
    pub const fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

impl fmt::Display for PartitionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Learn => write!(f, "learn"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// The set of patients held out for testing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    test: FxHashSet<PatientId>,
}

impl Partition {
    /// Create a partition from an explicit test set
    pub fn from_test_set(test: impl IntoIterator<Item = PatientId>) -> Self {
        Self {
            test: test.into_iter().collect(),
        }
    }

    /// Draw a partition for a population
    ///
    /// With a seed the partition is reproducible; without one it is drawn
    /// from OS entropy and differs between runs.
    #[must_use]
    pub fn draw(population: &Population, config: &PartitionConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let test = match config.strategy {
            PartitionStrategy::Random => {
                let numbers: Vec<PatientId> = population.numbers().collect();
                sample_fraction(numbers, config.test_fraction, &mut rng)
            }
            PartitionStrategy::Stratified => {
                let stroke_group = population.catalog().stroke();
                let (stroke, no_stroke): (Vec<&_>, Vec<&_>) = population
                    .iter()
                    .partition(|p| !p.stroke_dates(stroke_group).is_empty());

                let mut test = sample_fraction(
                    stroke.iter().map(|p| p.number).collect(),
                    config.test_fraction,
                    &mut rng,
                );
                test.extend(sample_fraction(
                    no_stroke.iter().map(|p| p.number).collect(),
                    config.test_fraction,
                    &mut rng,
                ));
                test
            }
        };

        log::debug!(
            "Drew {:?} partition: {} of {} patients in test set",
            config.strategy,
            test.len(),
            population.len()
        );

        Self::from_test_set(test)
    }

    /// Partition of a patient
    #[must_use]
    pub fn tag(&self, patient: PatientId) -> PartitionTag {
        if self.test.contains(&patient) {
            PartitionTag::Test
        } else {
            PartitionTag::Learn
        }
    }

    /// Number of patients in the test set
    #[must_use]
    pub fn test_len(&self) -> usize {
        self.test.len()
    }

    /// Test patients in ascending order
    #[must_use]
    pub fn test_patients(&self) -> Vec<PatientId> {
        let mut patients: Vec<PatientId> = self.test.iter().copied().collect();
        patients.sort_unstable();
        patients
    }
}

fn sample_fraction(mut numbers: Vec<PatientId>, fraction: f64, rng: &mut StdRng) -> Vec<PatientId> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let size = ((numbers.len() as f64) * fraction).round() as usize;
    numbers.shuffle(rng);
    numbers.truncate(size.min(numbers.len()));
    numbers
}
