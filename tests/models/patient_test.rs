//! Tests for the patient timeline and its risk score

use chadsvasc_cohort::{Diagnosis, Disease, Medication, Patient, RiskScoreEngine};

use crate::utils::{catalog, date, stroke, stroke_history_patient, year_diagnosis};

#[test]
fn test_age_on_birthday() {
    let patient = Patient::new(1, "M", date(1970, 6, 6), None);
    assert_eq!(patient.calculate_age(date(1980, 6, 5)), 9);
    assert_eq!(patient.calculate_age(date(1980, 6, 6)), 10);
}

#[test]
fn test_alive_until_death_date() {
    let patient = Patient::new(1, "M", date(1940, 1, 1), Some(date(2008, 10, 5)));
    assert!(patient.is_alive(date(2008, 10, 4)));
    assert!(!patient.is_alive(date(2008, 10, 5)));
    assert!(!patient.is_alive(date(1939, 12, 31)));

    let living = Patient::new(2, "V", date(1940, 1, 1), None);
    assert!(living.is_alive(date(2100, 1, 1)));
}

#[test]
fn test_diagnosis_after_death_moves_death_date() {
    let mut patient = Patient::new(1, "M", date(1940, 1, 1), Some(date(2008, 10, 5)));
    patient.add_diagnosis(
        Diagnosis::new(Disease::new("CAR", "401"), date(2009, 3, 1), date(2009, 3, 31)).unwrap(),
    );
    assert_eq!(patient.death_date(), Some(date(2009, 3, 2)));
    assert!(patient.is_alive(date(2009, 3, 1)));
}

#[test]
fn test_malformed_intervals_are_rejected() {
    assert!(
        Diagnosis::new(Disease::new("CAR", "401"), date(2010, 2, 1), date(2010, 1, 1)).is_err()
    );
    assert!(Medication::new("B01AA04", date(2010, 2, 1), Some(date(2010, 1, 1))).is_err());
}

#[test]
fn test_score_end_to_end() {
    let engine = RiskScoreEngine::new(catalog());
    let patient = stroke_history_patient();

    // C, then H, then S (2 points), then age 65 on 2002-05-14
    assert_eq!(engine.calculate_score(&patient, date(1979, 12, 31)), 0);
    assert_eq!(engine.calculate_score(&patient, date(1980, 1, 1)), 1);
    assert_eq!(engine.calculate_score(&patient, date(1985, 1, 1)), 2);
    assert_eq!(engine.calculate_score(&patient, date(1990, 1, 1)), 4);
    assert_eq!(engine.calculate_score(&patient, date(2000, 1, 1)), 5);
    assert_eq!(engine.calculate_score(&patient, date(2002, 5, 14)), 6);
    assert_eq!(engine.calculate_score(&patient, date(2012, 5, 14)), 7);
}

#[test]
fn test_score_is_monotone_under_chronic_semantics() {
    let engine = RiskScoreEngine::new(catalog());
    let patient = stroke_history_patient();

    let mut previous = 0;
    for year in 1937..2030 {
        for month in [1, 5, 6, 12] {
            let score = engine.calculate_score(&patient, date(year, month, 14));
            assert!(score >= previous, "score dropped at {year}-{month}");
            previous = score;
        }
    }
}

#[test]
fn test_stroke_dates() {
    let mut patient = stroke_history_patient();
    patient.add_diagnosis(year_diagnosis(&stroke(), 1990));

    let dates = patient.stroke_dates(catalog().stroke());
    assert_eq!(dates, vec![date(1990, 1, 1), date(2005, 1, 1)]);
}

#[test]
fn test_timeline_lookup() {
    let engine = RiskScoreEngine::new(catalog());
    let mut patient = stroke_history_patient();
    engine.refresh_change_timeline(&mut patient).unwrap();

    let timeline = patient.change_timeline();
    assert_eq!(timeline.events()[0].date, date(1937, 5, 14));
    assert_eq!(timeline.score_at(date(1900, 1, 1)), Some(0));
    assert_eq!(timeline.score_at(date(1989, 12, 31)), Some(2));
    assert_eq!(timeline.score_at(date(1990, 1, 1)), Some(4));
    assert_eq!(timeline.score_at(date(2030, 1, 1)), Some(7));
}
