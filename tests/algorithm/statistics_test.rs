//! Tests for outcome statistics over a simulated cohort

use chadsvasc_cohort::algorithm::simulation::{
    CohortSimulation, ConfusionMatrix, Partition, SimulationConfig, adjusted_stroke_rate,
    score_breakdown, stroke_summary,
};
use chadsvasc_cohort::{DecisionPolicy, PolicyConfig, RiskScoreEngine};

use crate::utils::{catalog, cohort, date};

#[test]
fn test_adjusted_stroke_rate() {
    let population = cohort();
    let config = SimulationConfig::new(date(2010, 1, 1), date(2010, 4, 1));
    let table = adjusted_stroke_rate(&population, &config).unwrap();

    // Only the 2010-01-01 step is taken
    let zero = table[&0];
    assert_eq!((zero.samples, zero.strokes), (1, 0));
    assert_eq!(zero.adjusted_rate, Some(0.0));

    let one = table[&1];
    assert_eq!((one.samples, one.strokes), (2, 1));
    assert_eq!(one.rate, Some(0.5));
    assert_eq!(one.adjusted_rate, Some(0.5));

    assert_eq!(table[&2].samples, 1);
    assert_eq!(table[&9].rate, None);
    assert_eq!(table.len(), 10);
}

#[test]
fn test_score_breakdown() {
    let population = cohort();
    let breakdown = score_breakdown(&population, date(2010, 1, 1));

    let zero = breakdown[&0];
    assert_eq!(zero.patients, 2);
    assert_eq!(zero.mean_age, Some(57.0));
    assert_eq!(zero.std_age, Some(7.0));
    assert_eq!(zero.percent_female, Some(0.0));

    let one = breakdown[&1];
    assert_eq!(one.patients, 3);
    let female = one.percent_female.unwrap();
    assert!((female - 100.0 / 3.0).abs() < 1e-9);

    assert_eq!(breakdown[&2].patients, 1);
    assert_eq!(breakdown[&3].mean_age, None);

    // Patient 5 died on 2010-02-15
    let later = score_breakdown(&population, date(2010, 3, 1));
    assert_eq!(later[&2].patients, 0);
}

#[test]
fn test_stroke_summary() {
    let population = cohort();
    let summary = stroke_summary(&population);

    assert_eq!(summary.patients_with_stroke, 1);
    assert_eq!(summary.deaths_within_year, 0);
    assert_eq!(summary.strokes_per_patient.get(&1), Some(&1));
    assert_eq!(summary.score_before_stroke.get(&1), Some(&1));
}

#[test]
fn test_confusion_matrix_from_simulation() {
    let population = cohort();
    let simulation = CohortSimulation::new(
        &population,
        SimulationConfig::new(date(2010, 1, 1), date(2010, 4, 1)),
        Vec::new(),
    )
    .unwrap()
    .with_partition(Partition::from_test_set(population.numbers()));

    let threshold = DecisionPolicy::threshold(RiskScoreEngine::new(catalog()), 2);
    let outcome = PolicyConfig::default().build(&catalog());
    let comparison = simulation.compare_policies(&threshold, &outcome, true);
    let matrix = ConfusionMatrix::from_comparison(&comparison).unwrap();

    // Patient 1 (score 1) strokes in March; patient 5 (score 2) never does
    assert_eq!(matrix.population(), 9);
    assert_eq!(matrix.true_positive, 0);
    assert_eq!(matrix.false_negative, 3);
    assert_eq!(matrix.false_positive, 1);
    assert_eq!(matrix.true_negative, 5);
    assert_eq!(matrix.ppv(), Some(0.0));
    assert_eq!(matrix.tpr(), Some(0.0));
    assert_eq!(matrix.negative_likelihood_ratio(), Some(1.0 / (5.0 / 6.0)));
}
