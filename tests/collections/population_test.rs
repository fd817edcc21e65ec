//! Tests for linking records into a population

use chadsvasc_cohort::{
    ContinuityRule, Diagnosis, DiagnosisMerger, Disease, MergeConfig, Patient, Population,
};

use crate::utils::{catalog, cohort, date, init_logging};

#[test]
fn test_cohort_fixture() {
    let population = cohort();
    assert_eq!(population.len(), 6);
    assert_eq!(population.numbers().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    assert!(population.iter().all(|p| !p.change_timeline().is_empty()));
}

#[test]
fn test_unknown_patients_are_reported() {
    init_logging();
    let mut population = Population::new(catalog());
    population.add_patient(Patient::new(1, "M", date(1950, 1, 1), None)).unwrap();

    let af = Disease::new("CAR", "401");
    let report = population
        .attach_diagnoses(
            vec![
                (1, Diagnosis::new(af.clone(), date(2010, 1, 1), date(2010, 1, 31)).unwrap()),
                (7, Diagnosis::new(af.clone(), date(2010, 1, 1), date(2010, 1, 31)).unwrap()),
                (8, Diagnosis::new(af, date(2010, 1, 1), date(2010, 1, 31)).unwrap()),
            ],
            &DiagnosisMerger::default(),
        )
        .unwrap();

    assert_eq!(report.attached, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.unknown_patients.into_iter().collect::<Vec<_>>(), vec![7, 8]);
}

#[test]
fn test_merge_rule_applies_on_attach() {
    let af = Disease::new("CAR", "401");
    let records = || {
        vec![
            (1, Diagnosis::new(af.clone(), date(2010, 1, 1), date(2010, 1, 31)).unwrap()),
            (1, Diagnosis::new(af.clone(), date(2010, 6, 1), date(2010, 6, 30)).unwrap()),
        ]
    };

    let mut strict = Population::new(catalog());
    strict.add_patient(Patient::new(1, "M", date(1950, 1, 1), None)).unwrap();
    strict.attach_diagnoses(records(), &DiagnosisMerger::default()).unwrap();
    assert_eq!(strict.get(1).unwrap().diagnoses().len(), 2);

    let mut billing = Population::new(catalog());
    billing.add_patient(Patient::new(1, "M", date(1950, 1, 1), None)).unwrap();
    billing
        .attach_diagnoses(
            records(),
            &DiagnosisMerger::new(
                MergeConfig::new().with_continuity(ContinuityRule::SameBillingYear),
            ),
        )
        .unwrap();
    let patient = billing.get(1).unwrap();
    assert_eq!(patient.diagnoses().len(), 1);
    assert!(patient.has_disease(&Disease::new("CAR", "401"), date(2010, 3, 1), false));
}

#[test]
fn test_care_ranges() {
    let mut population = cohort();
    assert_eq!(population.set_care_ranges(12), 6);

    let patient = population.get(2).unwrap();
    let range = patient.care_range().unwrap();
    assert_eq!(range.start, date(2009, 12, 1));
    assert_eq!(range.end, date(2011, 2, 28));
}
