//! Cohort simulation
//!
//! This module walks a population through a date range in monthly steps and
//! turns every eligible patient-month into a labelled sample:
//!
//! - [`config`]: run configuration and its builder
//! - [`partition`]: the patient-level learn/test split
//! - [`filters`]: eligibility criteria
//! - [`features`]: feature encoding
//! - [`generator`]: the lazy patient-month walk and dataset collection
//! - [`statistics`]: confusion matrix, stroke rates and breakdowns

pub mod config;
pub mod features;
pub mod filters;
pub mod generator;
pub mod partition;
pub mod statistics;

pub use config::{
    EligibilityConfig, FeatureMode, PartitionConfig, PartitionStrategy, SimulationConfig,
    SimulationConfigBuilder,
};
pub use features::FeatureEncoder;
pub use filters::{EligibilityFilter, FilterCriteria, PatientAt};
pub use generator::{
    CohortSimulation, Dataset, PatientMonth, PatientMonths, PolicyComparison, SimulationSample,
    StepDates,
};
pub use partition::{Partition, PartitionTag};
pub use statistics::{
    ConfusionMatrix, ScoreBreakdown, ScoreStrokeRate, StrokeSummary, adjusted_stroke_rate,
    score_breakdown, stroke_summary,
};
