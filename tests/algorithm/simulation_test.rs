//! Tests for the month-stepped cohort simulation

use chadsvasc_cohort::algorithm::simulation::{
    CohortSimulation, FeatureMode, Partition, PartitionStrategy, PartitionTag, SimulationConfig,
};
use chadsvasc_cohort::{
    CohortError, DecisionPolicy, Diagnosis, Patient, PatientId, PolicyConfig, Population,
    RiskScoreEngine,
};
use chrono::NaiveDate;

use crate::utils::{atrial_fibrillation, catalog, cohort, date, stroke};

fn quarter() -> SimulationConfig {
    SimulationConfig::builder()
        .start_date(date(2010, 1, 1))
        .end_date(date(2010, 4, 1))
        .seed(42)
        .build()
        .unwrap()
}

#[test]
fn test_months_outer_patients_inner() {
    let population = cohort();
    let simulation =
        CohortSimulation::new(&population, quarter(), vec![atrial_fibrillation()]).unwrap();

    let visited: Vec<(NaiveDate, PatientId)> = simulation
        .patient_months()
        .map(|month| (month.date, month.patient.number))
        .collect();

    assert_eq!(
        visited,
        vec![
            (date(2010, 1, 1), 1),
            (date(2010, 1, 1), 2),
            (date(2010, 1, 1), 5),
            (date(2010, 1, 1), 6),
            (date(2010, 2, 1), 1),
            (date(2010, 2, 1), 6),
            (date(2010, 3, 1), 1),
            (date(2010, 3, 1), 2),
            (date(2010, 3, 1), 6),
        ]
    );
}

#[test]
fn test_generator_is_restartable() {
    let population = cohort();
    let simulation =
        CohortSimulation::new(&population, quarter(), vec![atrial_fibrillation()]).unwrap();

    let first: Vec<_> = simulation.samples().collect();
    let second: Vec<_> = simulation.samples().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 9);
}

#[test]
fn test_partition_is_per_patient() {
    let population = cohort();
    let simulation =
        CohortSimulation::new(&population, quarter(), vec![atrial_fibrillation()]).unwrap();

    for month in simulation.patient_months() {
        assert_eq!(month.partition, simulation.partition().tag(month.patient.number));
    }

    let again = CohortSimulation::new(&population, quarter(), Vec::new()).unwrap();
    assert_eq!(simulation.partition(), again.partition());
}

#[test]
fn test_collect_dataset() {
    let population = cohort();
    let simulation = CohortSimulation::new(&population, quarter(), vec![atrial_fibrillation()])
        .unwrap()
        .with_partition(Partition::from_test_set([2]));

    let dataset = simulation.collect_dataset();

    assert_eq!(dataset.feature_labels, vec!["(CAR, 401)", "Gender", "Age"]);
    assert_eq!(dataset.learn_groups, vec![1, 5, 6, 1, 6, 1, 6]);
    assert_eq!(dataset.y_learn, vec![true, false, false, true, false, true, false]);
    assert_eq!(dataset.x_learn[0], vec![1, 0, 70]);
    assert_eq!(dataset.x_learn[1], vec![1, 0, 80]);
    assert_eq!(dataset.x_test, vec![vec![1, 1, 60], vec![1, 1, 60]]);
    assert_eq!(dataset.y_test, vec![false, false]);
    assert_eq!(dataset.len(), 9);
}

#[test]
fn test_days_since_feature_mode() {
    let population = cohort();
    let config = SimulationConfig {
        feature_mode: FeatureMode::DaysSinceDiagnosis,
        ..quarter()
    };
    let simulation = CohortSimulation::new(
        &population,
        config,
        vec![atrial_fibrillation(), chadsvasc_cohort::Disease::new("NEU", "1112")],
    )
    .unwrap();

    let first = simulation.samples().next().unwrap();
    assert_eq!(first.patient, 1);
    // AF on 2009-06-01, stroke not yet diagnosed
    assert_eq!(first.features, vec![214, 10_000, 0, 70]);
}

#[test]
fn test_score_component_feature_mode() {
    let population = cohort();
    let config = SimulationConfig {
        feature_mode: FeatureMode::ScoreComponents,
        ..quarter()
    };
    let simulation = CohortSimulation::new(&population, config, Vec::new()).unwrap();
    let dataset = simulation.collect_dataset();

    assert_eq!(dataset.feature_labels, vec!["C", "H", "D", "S", "V", "Gender", "Age"]);
    for row in dataset.x_learn.iter().chain(&dataset.x_test) {
        assert_eq!(row.len(), 7);
    }
}

#[test]
fn test_eligibility_switches() {
    let population = cohort();

    let with_medicated = SimulationConfig {
        eligibility: chadsvasc_cohort::algorithm::simulation::EligibilityConfig {
            exclude_antithrombotic: false,
            ..Default::default()
        },
        ..quarter()
    };
    let simulation = CohortSimulation::new(&population, with_medicated, Vec::new()).unwrap();
    assert_eq!(simulation.patient_months().count(), 10);

    let strict = SimulationConfig::builder()
        .start_date(date(2010, 1, 1))
        .end_date(date(2010, 4, 1))
        .max_days_since_last_diagnosis(150)
        .build()
        .unwrap();
    let simulation = CohortSimulation::new(&population, strict, Vec::new()).unwrap();
    let visited: Vec<PatientId> = simulation.patient_months().map(|m| m.patient.number).collect();
    assert_eq!(visited, vec![1, 2, 6, 1, 1, 2]);
}

#[test]
fn test_yearly_steps() {
    let population = cohort();
    let config = SimulationConfig::builder()
        .start_date(date(2010, 1, 1))
        .end_date(date(2012, 1, 1))
        .step_months(12)
        .build()
        .unwrap();
    let simulation = CohortSimulation::new(&population, config, Vec::new()).unwrap();
    let dates: Vec<NaiveDate> = simulation.step_dates().collect();
    assert_eq!(dates, vec![date(2010, 1, 1), date(2011, 1, 1)]);
}

#[test]
fn test_compare_policies() {
    let population = cohort();
    let simulation = CohortSimulation::new(&population, quarter(), Vec::new())
        .unwrap()
        .with_partition(Partition::from_test_set([1, 2]));

    let threshold = DecisionPolicy::threshold(RiskScoreEngine::new(catalog()), 1);
    let outcome = PolicyConfig::default().build(&catalog());

    let test_only = simulation.compare_policies(&threshold, &outcome, true);
    assert_eq!(test_only.predicted, vec![true, true, true, true, true]);
    assert_eq!(test_only.observed, vec![true, false, true, true, false]);

    let all = simulation.compare_policies(&threshold, &outcome, false);
    assert_eq!(all.predicted.len(), 9);
    assert_eq!(all.observed.len(), 9);
}

#[test]
fn test_event_based_labels_match_threshold_labels() {
    let population = cohort();
    let event_config = SimulationConfig {
        label_policy: PolicyConfig::EventBased { threshold: 1 },
        ..quarter()
    };
    let threshold_config = SimulationConfig {
        label_policy: PolicyConfig::Threshold { threshold: 1 },
        ..quarter()
    };

    let event: Vec<bool> = CohortSimulation::new(&population, event_config, Vec::new())
        .unwrap()
        .samples()
        .map(|s| s.label)
        .collect();
    let threshold: Vec<bool> = CohortSimulation::new(&population, threshold_config, Vec::new())
        .unwrap()
        .samples()
        .map(|s| s.label)
        .collect();

    assert_eq!(event, threshold);
}

#[test]
fn test_event_based_labels_for_prediagnosed_patients() {
    let mut patient = Patient::new(1, "V", date(1930, 1, 1), None);
    patient.add_diagnosis(
        Diagnosis::new(atrial_fibrillation(), date(2010, 1, 5), date(2010, 1, 20)).unwrap(),
    );
    patient.add_diagnosis(Diagnosis::new(stroke(), date(2009, 6, 1), date(2009, 6, 10)).unwrap());
    let population = Population::from_patients(catalog(), [patient]).unwrap();

    let labels = |label_policy: PolicyConfig| -> Vec<bool> {
        let config = SimulationConfig::builder()
            .start_date(date(2010, 2, 1))
            .end_date(date(2010, 4, 1))
            .label_policy(label_policy)
            .build()
            .unwrap();
        CohortSimulation::new(&population, config, Vec::new())
            .unwrap()
            .samples()
            .map(|s| s.label)
            .collect()
    };

    assert_eq!(labels(PolicyConfig::Threshold { threshold: 3 }), vec![true, true]);
    assert_eq!(labels(PolicyConfig::EventBased { threshold: 3 }), vec![true, true]);
}

#[test]
fn test_event_based_run_rejects_stale_timelines() {
    let mut population = cohort();
    population
        .get_mut(6)
        .unwrap()
        .add_diagnosis(Diagnosis::new(stroke(), date(2009, 10, 1), date(2009, 10, 5)).unwrap());

    let event_config = SimulationConfig {
        label_policy: PolicyConfig::EventBased { threshold: 1 },
        ..quarter()
    };
    let result = CohortSimulation::new(&population, event_config.clone(), Vec::new());
    assert!(matches!(result, Err(CohortError::MissingHistory { patient: 6, .. })));
    assert!(CohortSimulation::new(&population, quarter(), Vec::new()).is_ok());

    population.rebuild_change_timelines().unwrap();
    assert!(CohortSimulation::new(&population, event_config, Vec::new()).is_ok());
}

#[test]
fn test_stratified_run_keeps_patient_partitions() {
    let population = cohort();
    let config = SimulationConfig::builder()
        .start_date(date(2010, 1, 1))
        .end_date(date(2010, 4, 1))
        .test_fraction(0.5)
        .seed(3)
        .partition_strategy(PartitionStrategy::Stratified)
        .build()
        .unwrap();
    let simulation = CohortSimulation::new(&population, config, Vec::new()).unwrap();

    // Half of one stroke patient rounds to one, half of five others rounds to three
    assert_eq!(simulation.partition().test_len(), 4);
    assert_eq!(simulation.partition().tag(1), PartitionTag::Test);
}
