//! Cohort simulation configuration
//!
//! This module defines the configuration options for walking a population
//! through a date range and generating labelled patient-month samples.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::algorithm::decision::PolicyConfig;
use crate::error::{CohortError, Result};

/// Value used for "days since diagnosis" when a disease was never diagnosed
pub const DEFAULT_DAYS_SENTINEL: i64 = 10_000;

/// Maximum age in days of the most recent diagnosis for an eligible patient
pub const DEFAULT_MAX_DAYS_SINCE_LAST_DIAGNOSIS: i64 = 366;

/// ATC prefix of antithrombotic agents
pub const ANTITHROMBOTIC_PREFIX: &str = "B01";

/// How tracked diseases are turned into features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// 0/1 chronic presence per tracked disease
    #[default]
    PresenceFlags,
    /// Days since the latest diagnosis per tracked disease
    DaysSinceDiagnosis,
    /// 0/1 per score category (C, H, D, S, V)
    ScoreComponents,
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PresenceFlags => write!(f, "presence flags"),
            Self::DaysSinceDiagnosis => write!(f, "days since diagnosis"),
            Self::ScoreComponents => write!(f, "score components"),
        }
    }
}

/// How patients are split into the learn and test partitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Shuffle all patients and take the test fraction from the front
    #[default]
    Random,
    /// Split stroke and non-stroke patients separately with the same fraction
    Stratified,
}

/// Configuration of the learn/test partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Fraction of patients held out for testing
    pub test_fraction: f64,
    /// Seed for reproducible partitions; OS entropy when absent
    pub seed: Option<u64>,
    /// Split strategy
    pub strategy: PartitionStrategy,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: None,
            strategy: PartitionStrategy::Random,
        }
    }
}

/// Rules that decide whether a patient is simulated at a step date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Maximum days since the most recent diagnosis
    pub max_days_since_last_diagnosis: i64,
    /// Skip patients on an antithrombotic agent
    pub exclude_antithrombotic: bool,
    /// ATC prefix identifying antithrombotic agents
    pub antithrombotic_prefix: String,
    /// Require the step date to lie inside the patient's care range
    pub require_care_range: bool,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            max_days_since_last_diagnosis: DEFAULT_MAX_DAYS_SINCE_LAST_DIAGNOSIS,
            exclude_antithrombotic: true,
            antithrombotic_prefix: ANTITHROMBOTIC_PREFIX.to_string(),
            require_care_range: false,
        }
    }
}

/// Configuration for a cohort simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// First step date (inclusive)
    pub start_date: NaiveDate,
    /// End of the simulated range (exclusive)
    pub end_date: NaiveDate,
    /// Months between step dates
    #[serde(default = "default_step_months")]
    pub step_months: u32,
    /// Feature encoding
    #[serde(default)]
    pub feature_mode: FeatureMode,
    /// Value for never-diagnosed diseases in days-since mode
    #[serde(default = "default_days_sentinel")]
    pub days_sentinel: i64,
    /// Policy producing the label of each sample
    #[serde(default)]
    pub label_policy: PolicyConfig,
    /// Learn/test split
    #[serde(default)]
    pub partition: PartitionConfig,
    /// Eligibility rules
    #[serde(default)]
    pub eligibility: EligibilityConfig,
}

const fn default_step_months() -> u32 {
    1
}

const fn default_days_sentinel() -> i64 {
    DEFAULT_DAYS_SENTINEL
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2013, 4, 1).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2017, 6, 1).unwrap_or(NaiveDate::MIN),
            step_months: default_step_months(),
            feature_mode: FeatureMode::default(),
            days_sentinel: DEFAULT_DAYS_SENTINEL,
            label_policy: PolicyConfig::default(),
            partition: PartitionConfig::default(),
            eligibility: EligibilityConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a configuration for a date range with default settings
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            ..Self::default()
        }
    }

    /// Create a new builder for constructing a simulation configuration
    #[must_use]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
    }

    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be simulated
    pub fn validate(&self) -> Result<()> {
        if self.step_months == 0 {
            return Err(CohortError::invalid_config("step must be at least one month"));
        }
        if self.end_date < self.start_date {
            return Err(CohortError::invalid_config(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if !(0.0..=1.0).contains(&self.partition.test_fraction) {
            return Err(CohortError::invalid_config(format!(
                "test fraction {} is not between 0 and 1",
                self.partition.test_fraction
            )));
        }
        if self.eligibility.max_days_since_last_diagnosis < 0 {
            return Err(CohortError::invalid_config(
                "maximum days since last diagnosis is negative",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Configuration:")?;
        writeln!(f, "  Start Date: {}", self.start_date)?;
        writeln!(f, "  End Date: {}", self.end_date)?;
        writeln!(f, "  Step: {} month(s)", self.step_months)?;
        writeln!(f, "  Feature Mode: {}", self.feature_mode)?;
        if self.feature_mode == FeatureMode::DaysSinceDiagnosis {
            writeln!(f, "  Days Sentinel: {}", self.days_sentinel)?;
        }
        writeln!(f, "  Label Policy: {}", self.label_policy)?;
        writeln!(f, "  Test Fraction: {}", self.partition.test_fraction)?;
        if let Some(seed) = self.partition.seed {
            writeln!(f, "  Seed: {seed}")?;
        }
        writeln!(f, "  Partition Strategy: {:?}", self.partition.strategy)?;
        writeln!(
            f,
            "  Max Days Since Last Diagnosis: {}",
            self.eligibility.max_days_since_last_diagnosis
        )?;
        if self.eligibility.exclude_antithrombotic {
            writeln!(
                f,
                "  Excluding Medication Group: {}",
                self.eligibility.antithrombotic_prefix
            )?;
        }
        writeln!(f, "  Require Care Range: {}", self.eligibility.require_care_range)
    }
}

/// Builder for constructing a simulation configuration
#[derive(Debug, Clone)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl Default for SimulationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    /// Set the first step date
    #[must_use]
    pub const fn start_date(mut self, date: NaiveDate) -> Self {
        self.config.start_date = date;
        self
    }

    /// Set the exclusive end date
    #[must_use]
    pub const fn end_date(mut self, date: NaiveDate) -> Self {
        self.config.end_date = date;
        self
    }

    /// Set the step in months
    #[must_use]
    pub const fn step_months(mut self, months: u32) -> Self {
        self.config.step_months = months;
        self
    }

    /// Set the feature mode
    #[must_use]
    pub const fn feature_mode(mut self, mode: FeatureMode) -> Self {
        self.config.feature_mode = mode;
        self
    }

    /// Set the never-diagnosed sentinel for days-since mode
    #[must_use]
    pub const fn days_sentinel(mut self, sentinel: i64) -> Self {
        self.config.days_sentinel = sentinel;
        self
    }

    /// Set the label policy
    #[must_use]
    pub const fn label_policy(mut self, policy: PolicyConfig) -> Self {
        self.config.label_policy = policy;
        self
    }

    /// Set the test fraction
    #[must_use]
    pub const fn test_fraction(mut self, fraction: f64) -> Self {
        self.config.partition.test_fraction = fraction;
        self
    }

    /// Set the partition seed
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.partition.seed = Some(seed);
        self
    }

    /// Set the partition strategy
    #[must_use]
    pub const fn partition_strategy(mut self, strategy: PartitionStrategy) -> Self {
        self.config.partition.strategy = strategy;
        self
    }

    /// Set the maximum days since the most recent diagnosis
    #[must_use]
    pub const fn max_days_since_last_diagnosis(mut self, days: i64) -> Self {
        self.config.eligibility.max_days_since_last_diagnosis = days;
        self
    }

    /// Set whether patients on antithrombotic agents are skipped
    #[must_use]
    pub const fn exclude_antithrombotic(mut self, exclude: bool) -> Self {
        self.config.eligibility.exclude_antithrombotic = exclude;
        self
    }

    /// Set the ATC prefix of antithrombotic agents
    #[must_use]
    pub fn antithrombotic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.eligibility.antithrombotic_prefix = prefix.into();
        self
    }

    /// Set whether step dates must lie inside the care range
    #[must_use]
    pub const fn require_care_range(mut self, required: bool) -> Self {
        self.config.eligibility.require_care_range = required;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SimulationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
