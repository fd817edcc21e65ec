//! Month-stepped cohort generator
//!
//! The generator walks the population through the simulated date range. The
//! outer loop runs over step dates and the inner loop over patients in
//! ascending patient number; eligible patients are emitted as
//! [`PatientMonth`]s. Emission is lazy, and calling
//! [`CohortSimulation::patient_months`] again restarts the walk with the same
//! partition.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::btree_map;
use std::sync::Arc;

use super::config::SimulationConfig;
use super::features::FeatureEncoder;
use super::filters::{EligibilityFilter, FilterCriteria, PatientAt};
use super::partition::{Partition, PartitionTag};
use crate::algorithm::chads_vasc::RiskScoreEngine;
use crate::algorithm::decision::{AnticoagulationPolicy, DecisionPolicy};
use crate::collections::Population;
use crate::error::{CohortError, Result};
use crate::models::{Disease, Patient, PatientId};
use crate::utils::add_months;

/// Step dates `start + k * step` months before `end`
///
/// Each date is computed from `start`, so clamping to the end of a short
/// month does not carry over to later steps.
#[derive(Debug, Clone)]
pub struct StepDates {
    start: NaiveDate,
    end: NaiveDate,
    step_months: u32,
    index: u32,
}

impl StepDates {
    /// Create the step sequence for `[start, end)`
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate, step_months: u32) -> Self {
        Self {
            start,
            end,
            step_months,
            index: 0,
        }
    }
}

impl Iterator for StepDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.step_months == 0 {
            return None;
        }
        let offset = self.index.checked_mul(self.step_months)?;
        let date = add_months(self.start, offset).ok()?;
        if date >= self.end {
            return None;
        }
        self.index += 1;
        Some(date)
    }
}

/// An eligible patient at a step date
#[derive(Debug, Clone, Copy)]
pub struct PatientMonth<'a> {
    /// The patient
    pub patient: &'a Patient,
    /// The step date
    pub date: NaiveDate,
    /// Partition of the patient
    pub partition: PartitionTag,
}

/// Lazy sequence of eligible patient-months
#[derive(Debug, Clone)]
pub struct PatientMonths<'a> {
    population: &'a Population,
    filter: &'a EligibilityFilter,
    partition: &'a Partition,
    dates: StepDates,
    current: Option<(NaiveDate, btree_map::Values<'a, PatientId, Patient>)>,
}

impl<'a> Iterator for PatientMonths<'a> {
    type Item = PatientMonth<'a>;

    fn next(&mut self) -> Option<PatientMonth<'a>> {
        loop {
            if let Some((date, patients)) = &mut self.current {
                let date = *date;
                for patient in patients.by_ref() {
                    if self.filter.meets_criteria(&PatientAt { patient, date }) {
                        return Some(PatientMonth {
                            patient,
                            date,
                            partition: self.partition.tag(patient.number),
                        });
                    }
                }
            }

            let date = self.dates.next()?;
            self.current = Some((date, self.population.into_iter()));
        }
    }
}

/// One labelled patient-month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSample {
    /// Patient number
    pub patient: PatientId,
    /// Step date
    pub date: NaiveDate,
    /// Feature vector, aligned with [`FeatureEncoder::labels`]
    pub features: Vec<i64>,
    /// Label from the label policy
    pub label: bool,
    /// Partition of the patient
    pub partition: PartitionTag,
}

/// Learn and test matrices of a simulation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    /// Feature names
    pub feature_labels: Vec<String>,
    /// Learn features
    pub x_learn: Vec<Vec<i64>>,
    /// Learn labels
    pub y_learn: Vec<bool>,
    /// Patient number of every learn row
    pub learn_groups: Vec<PatientId>,
    /// Test features
    pub x_test: Vec<Vec<i64>>,
    /// Test labels
    pub y_test: Vec<bool>,
}

impl Dataset {
    fn push(&mut self, sample: SimulationSample) {
        match sample.partition {
            PartitionTag::Learn => {
                self.x_learn.push(sample.features);
                self.y_learn.push(sample.label);
                self.learn_groups.push(sample.patient);
            }
            PartitionTag::Test => {
                self.x_test.push(sample.features);
                self.y_test.push(sample.label);
            }
        }
    }

    /// Total number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.y_learn.len() + self.y_test.len()
    }

    /// Whether no samples were collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Paired labels of two policies over the same patient-months
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyComparison {
    /// Labels of the evaluated policy
    pub predicted: Vec<bool>,
    /// Labels of the reference policy
    pub observed: Vec<bool>,
}

/// A configured simulation over one population
#[derive(Debug, Clone)]
pub struct CohortSimulation<'a> {
    population: &'a Population,
    config: SimulationConfig,
    partition: Partition,
    filter: EligibilityFilter,
    encoder: FeatureEncoder,
    label_policy: DecisionPolicy,
}

impl<'a> CohortSimulation<'a> {
    /// Prepare a simulation run
    ///
    /// Validates the configuration and draws the partition once for the
    /// whole run. `tracked` lists the diseases of the feature vector. An
    /// event-based label policy needs the change timeline of every patient;
    /// a patient edited through [`Population::get_mut`] without a rebuild
    /// fails with [`CohortError::MissingHistory`].
    pub fn new(
        population: &'a Population,
        config: SimulationConfig,
        tracked: Vec<Disease>,
    ) -> Result<Self> {
        config.validate()?;

        let catalog = population.catalog_arc();
        let partition = Partition::draw(population, &config.partition);
        let filter = EligibilityFilter::from_config(&config.eligibility, &catalog);
        let encoder = FeatureEncoder::new(
            config.feature_mode,
            tracked,
            RiskScoreEngine::new(Arc::clone(&catalog)),
        )
        .with_days_sentinel(config.days_sentinel);
        let label_policy = config.label_policy.build(&catalog);

        if matches!(label_policy, DecisionPolicy::EventBased(_)) {
            if let Some(patient) = population.iter().find(|p| p.change_timeline().is_empty()) {
                return Err(CohortError::missing_history(
                    patient.number,
                    "change timeline not built",
                ));
            }
        }

        Ok(Self {
            population,
            config,
            partition,
            filter,
            encoder,
            label_policy,
        })
    }

    /// Replace the drawn partition
    #[must_use]
    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = partition;
        self
    }

    /// The configuration of the run
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The learn/test partition of the run
    #[must_use]
    pub const fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The feature encoder of the run
    #[must_use]
    pub const fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// The policy labelling the samples
    #[must_use]
    pub const fn label_policy(&self) -> &DecisionPolicy {
        &self.label_policy
    }

    /// Step dates of the run
    #[must_use]
    pub const fn step_dates(&self) -> StepDates {
        StepDates::new(
            self.config.start_date,
            self.config.end_date,
            self.config.step_months,
        )
    }

    /// Eligible patient-months, months outer and patients inner
    #[must_use]
    pub fn patient_months(&self) -> PatientMonths<'_> {
        PatientMonths {
            population: self.population,
            filter: &self.filter,
            partition: &self.partition,
            dates: self.step_dates(),
            current: None,
        }
    }

    /// Encode and label one patient-month
    #[must_use]
    pub fn sample(&self, month: &PatientMonth<'_>) -> SimulationSample {
        SimulationSample {
            patient: month.patient.number,
            date: month.date,
            features: self.encoder.encode(month.patient, month.date),
            label: self.label_policy.decide(month.patient, month.date),
            partition: month.partition,
        }
    }

    /// Labelled samples of every eligible patient-month
    pub fn samples(&self) -> impl Iterator<Item = SimulationSample> + '_ {
        self.patient_months().map(move |month| self.sample(&month))
    }

    /// Collect all samples into learn and test matrices
    #[must_use]
    pub fn collect_dataset(&self) -> Dataset {
        log::info!(
            "Simulating from {} to {} (step {} month(s), {} patients)",
            self.config.start_date,
            self.config.end_date,
            self.config.step_months,
            self.population.len()
        );

        let mut dataset = Dataset {
            feature_labels: self.encoder.labels(),
            ..Dataset::default()
        };
        for sample in self.samples() {
            dataset.push(sample);
        }

        log::info!(
            "Simulation finished: {} learn samples, {} test samples",
            dataset.y_learn.len(),
            dataset.y_test.len()
        );
        dataset
    }

    /// Label every eligible patient-month with two policies
    ///
    /// With `test_only`, learn patient-months are skipped so the pairs line
    /// up with the test rows of [`CohortSimulation::collect_dataset`].
    pub fn compare_policies(
        &self,
        predicted: &impl AnticoagulationPolicy,
        observed: &impl AnticoagulationPolicy,
        test_only: bool,
    ) -> PolicyComparison {
        log::info!(
            "Comparing {} against {} from {} to {}",
            predicted.name(),
            observed.name(),
            self.config.start_date,
            self.config.end_date
        );

        let mut comparison = PolicyComparison::default();
        for month in self.patient_months() {
            if test_only && !month.partition.is_test() {
                continue;
            }
            comparison.predicted.push(predicted.decide(month.patient, month.date));
            comparison.observed.push(observed.decide(month.patient, month.date));
        }

        log::info!("Compared {} patient-months", comparison.predicted.len());
        comparison
    }
}
