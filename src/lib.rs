//! A Rust library for modelling the clinical records of atrial fibrillation
//! patients, scoring their CHA2DS2-VASc stroke risk over time, and simulating
//! anticoagulation decisions across a cohort.

pub mod algorithm;
pub mod collections;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{ContinuityRule, MergeConfig};
pub use error::{CohortError, Result};
pub use models::{
    CareRange, ChadsVascChangeEvent, ChangeTimeline, Diagnosis, DiagnosisHistory, Disease,
    DiseaseGroup, Medication, Patient, PatientId,
};

// Scoring and decisions
pub use algorithm::chads_vasc::catalog::{DiseaseCatalog, ScoreCategory, WeightedGroup};
pub use algorithm::chads_vasc::{RiskScoreEngine, ScoreComponents};
pub use algorithm::decision::{
    AnticoagulationPolicy, DecisionPolicy, EventBasedPolicy, FutureStrokePolicy, PolicyConfig,
    ThresholdPolicy,
};
pub use algorithm::merging::DiagnosisMerger;

// Simulation
pub use algorithm::simulation::{
    CohortSimulation, ConfusionMatrix, Dataset, FeatureMode, Partition, PartitionTag,
    SimulationConfig, SimulationSample,
};
pub use collections::{AttachReport, Population};
