//! Outcome statistics for simulated cohorts
//!
//! This module provides the summaries used to compare decision policies:
//! a confusion matrix over paired labels, the adjusted stroke rate per score,
//! and descriptive breakdowns of the population by score and by stroke.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::config::SimulationConfig;
use super::generator::{CohortSimulation, PolicyComparison};
use crate::algorithm::chads_vasc::RiskScoreEngine;
use crate::algorithm::decision::AnticoagulationPolicy;
use crate::collections::Population;
use crate::error::{CohortError, Result};
use crate::utils::add_months_saturating;

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator)
}

#[allow(clippy::cast_precision_loss)]
fn count_ratio(numerator: usize, denominator: usize) -> Option<f64> {
    ratio(numerator as f64, denominator as f64)
}

/// Counts of a binary classification against observed outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Predicted positive, observed positive
    pub true_positive: usize,
    /// Predicted negative, observed positive
    pub false_negative: usize,
    /// Predicted positive, observed negative
    pub false_positive: usize,
    /// Predicted negative, observed negative
    pub true_negative: usize,
}

impl ConfusionMatrix {
    /// Count paired labels
    pub fn from_labels(observed: &[bool], predicted: &[bool]) -> Result<Self> {
        if observed.len() != predicted.len() {
            return Err(CohortError::LengthMismatch {
                observed: observed.len(),
                predicted: predicted.len(),
            });
        }

        let mut matrix = Self::default();
        for (&truth, &prediction) in observed.iter().zip(predicted) {
            match (truth, prediction) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_negative += 1,
                (false, true) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
            }
        }
        Ok(matrix)
    }

    /// Count the pairs of a policy comparison
    pub fn from_comparison(comparison: &PolicyComparison) -> Result<Self> {
        Self::from_labels(&comparison.observed, &comparison.predicted)
    }

    /// Number of pairs
    #[must_use]
    pub const fn population(&self) -> usize {
        self.true_positive + self.false_negative + self.false_positive + self.true_negative
    }

    /// (TP + TN) / population
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        count_ratio(self.true_positive + self.true_negative, self.population())
    }

    /// Observed positives / population
    #[must_use]
    pub fn prevalence(&self) -> Option<f64> {
        count_ratio(self.true_positive + self.false_negative, self.population())
    }

    /// Positive predictive value (precision)
    #[must_use]
    pub fn ppv(&self) -> Option<f64> {
        count_ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// False discovery rate
    #[must_use]
    pub fn fdr(&self) -> Option<f64> {
        count_ratio(self.false_positive, self.true_positive + self.false_positive)
    }

    /// False omission rate
    #[must_use]
    pub fn false_omission_rate(&self) -> Option<f64> {
        count_ratio(self.false_negative, self.true_negative + self.false_negative)
    }

    /// Negative predictive value
    #[must_use]
    pub fn npv(&self) -> Option<f64> {
        count_ratio(self.true_negative, self.true_negative + self.false_negative)
    }

    /// True positive rate (sensitivity)
    #[must_use]
    pub fn tpr(&self) -> Option<f64> {
        count_ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// False negative rate
    #[must_use]
    pub fn fnr(&self) -> Option<f64> {
        count_ratio(self.false_negative, self.true_positive + self.false_negative)
    }

    /// False positive rate
    #[must_use]
    pub fn fpr(&self) -> Option<f64> {
        count_ratio(self.false_positive, self.false_positive + self.true_negative)
    }

    /// True negative rate (specificity)
    #[must_use]
    pub fn tnr(&self) -> Option<f64> {
        count_ratio(self.true_negative, self.false_positive + self.true_negative)
    }

    /// Positive likelihood ratio, TPR / FPR
    #[must_use]
    pub fn positive_likelihood_ratio(&self) -> Option<f64> {
        ratio(self.tpr()?, self.fpr()?)
    }

    /// Negative likelihood ratio, FNR / TNR
    #[must_use]
    pub fn negative_likelihood_ratio(&self) -> Option<f64> {
        ratio(self.fnr()?, self.tnr()?)
    }

    /// Diagnostic odds ratio, LR+ / LR-
    #[must_use]
    pub fn diagnostic_odds_ratio(&self) -> Option<f64> {
        ratio(
            self.positive_likelihood_ratio()?,
            self.negative_likelihood_ratio()?,
        )
    }
}

struct Rate(Option<f64>);

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.4}"),
            None => write!(f, "undefined"),
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Population Size:           {}", self.population())?;
        writeln!(f, "True Positive:             {}", self.true_positive)?;
        writeln!(f, "False Negative:            {}", self.false_negative)?;
        writeln!(f, "False Positive:            {}", self.false_positive)?;
        writeln!(f, "True Negative:             {}", self.true_negative)?;
        writeln!(f, "Accuracy:                  {}", Rate(self.accuracy()))?;
        writeln!(f, "Prevalence:                {}", Rate(self.prevalence()))?;
        writeln!(f, "Positive Predictive Value: {}", Rate(self.ppv()))?;
        writeln!(f, "Negative Predictive Value: {}", Rate(self.npv()))?;
        writeln!(f, "False Omission Rate:       {}", Rate(self.false_omission_rate()))?;
        writeln!(f, "False Discovery Rate:      {}", Rate(self.fdr()))?;
        writeln!(f, "True Positive Rate:        {}", Rate(self.tpr()))?;
        writeln!(f, "False Negative Rate:       {}", Rate(self.fnr()))?;
        writeln!(f, "False Positive Rate:       {}", Rate(self.fpr()))?;
        writeln!(f, "True Negative Rate:        {}", Rate(self.tnr()))?;
        writeln!(
            f,
            "Positive Likelihood Ratio: {}",
            Rate(self.positive_likelihood_ratio())
        )?;
        writeln!(
            f,
            "Negative Likelihood Ratio: {}",
            Rate(self.negative_likelihood_ratio())
        )?;
        writeln!(
            f,
            "Diagnostic Odds Ratio:     {}",
            Rate(self.diagnostic_odds_ratio())
        )
    }
}

/// Stroke outcomes of the patient-years with one score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreStrokeRate {
    /// Eligible patient-years with this score
    pub samples: usize,
    /// Of which followed by a stroke
    pub strokes: usize,
    /// strokes / samples
    pub rate: Option<f64>,
    /// Rate minus the rate at score 0
    pub adjusted_rate: Option<f64>,
}

/// Stroke rate per score, adjusted by the score-0 baseline
///
/// The population is walked in yearly steps over the configured range with
/// the configured eligibility rules. Each eligible patient-year is scored,
/// and counts as a stroke when the configured label policy is positive.
/// Scores 0 to 9 are always reported.
pub fn adjusted_stroke_rate(
    population: &Population,
    config: &SimulationConfig,
) -> Result<BTreeMap<u32, ScoreStrokeRate>> {
    let yearly = SimulationConfig {
        step_months: 12,
        ..config.clone()
    };
    let simulation = CohortSimulation::new(population, yearly, Vec::new())?;
    let engine = RiskScoreEngine::new(population.catalog_arc());

    let mut table: BTreeMap<u32, ScoreStrokeRate> =
        (0..10).map(|score| (score, ScoreStrokeRate::default())).collect();

    for month in simulation.patient_months() {
        let score = engine.calculate_score(month.patient, month.date);
        let entry = table.entry(score).or_default();
        entry.samples += 1;
        if simulation.label_policy().decide(month.patient, month.date) {
            entry.strokes += 1;
        }
    }

    for entry in table.values_mut() {
        entry.rate = count_ratio(entry.strokes, entry.samples);
    }

    let baseline = table.get(&0).and_then(|entry| entry.rate);
    for entry in table.values_mut() {
        entry.adjusted_rate = entry.rate.zip(baseline).map(|(rate, base)| rate - base);
    }

    log::info!("Adjusted stroke rate baseline: {baseline:?}");
    Ok(table)
}

/// Living patients with one score at a date
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Number of living patients
    pub patients: usize,
    /// Mean age
    pub mean_age: Option<f64>,
    /// Population standard deviation of the age
    pub std_age: Option<f64>,
    /// Percentage of female patients
    pub percent_female: Option<f64>,
}

/// Describe the living population by score at a date
///
/// Scores 0 to 9 are always reported.
#[must_use]
pub fn score_breakdown(population: &Population, at: NaiveDate) -> BTreeMap<u32, ScoreBreakdown> {
    let engine = RiskScoreEngine::new(population.catalog_arc());
    let mut ages: BTreeMap<u32, (Vec<i32>, usize)> =
        (0..10).map(|score| (score, (Vec::new(), 0))).collect();

    for patient in population.iter().filter(|p| p.is_alive(at)) {
        let (group_ages, females) = ages
            .entry(engine.calculate_score(patient, at))
            .or_default();
        group_ages.push(patient.calculate_age(at));
        *females += usize::from(patient.is_female());
    }

    ages.into_iter()
        .map(|(score, (group_ages, females))| {
            let patients = group_ages.len();
            let total: f64 = group_ages.iter().map(|&a| f64::from(a)).sum();
            #[allow(clippy::cast_precision_loss)]
            let mean = ratio(total, patients as f64);
            let std = mean.map(|mean| {
                let squares: f64 = group_ages
                    .iter()
                    .map(|&a| (f64::from(a) - mean).powi(2))
                    .sum();
                #[allow(clippy::cast_precision_loss)]
                let variance = squares / patients as f64;
                variance.sqrt()
            });

            let breakdown = ScoreBreakdown {
                patients,
                mean_age: mean,
                std_age: std,
                percent_female: count_ratio(females, patients).map(|share| share * 100.0),
            };
            (score, breakdown)
        })
        .collect()
}

/// Stroke history of a population
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrokeSummary {
    /// Patients with at least one stroke
    pub patients_with_stroke: usize,
    /// Strokes followed by death within a year
    pub deaths_within_year: usize,
    /// Number of patients per number of distinct stroke dates
    pub strokes_per_patient: BTreeMap<usize, usize>,
    /// Number of strokes per score on the day before the stroke
    pub score_before_stroke: BTreeMap<u32, usize>,
}

/// Summarise the strokes recorded in a population
#[must_use]
pub fn stroke_summary(population: &Population) -> StrokeSummary {
    let engine = RiskScoreEngine::new(population.catalog_arc());
    let stroke_group = population.catalog().stroke();
    let mut summary = StrokeSummary::default();

    for patient in population {
        let strokes = patient.stroke_dates(stroke_group);
        if strokes.is_empty() {
            continue;
        }

        summary.patients_with_stroke += 1;
        *summary.strokes_per_patient.entry(strokes.len()).or_default() += 1;

        for stroke in strokes {
            let before = stroke.pred_opt().unwrap_or(stroke);
            *summary
                .score_before_stroke
                .entry(engine.calculate_score(patient, before))
                .or_default() += 1;
            if !patient.is_alive(add_months_saturating(stroke, 12)) {
                summary.deaths_within_year += 1;
            }
        }
    }

    summary
}
