//! Shared fixtures for the integration tests

use std::sync::Arc;

use chadsvasc_cohort::{
    Diagnosis, DiagnosisMerger, Disease, DiseaseCatalog, Medication, Patient, Population,
};
use chrono::NaiveDate;

/// Initialise logging once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a date from literal parts
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Diagnosis episode from January 1 to December 31 of a year
#[must_use]
pub fn year_diagnosis(disease: &Disease, year: i32) -> Diagnosis {
    Diagnosis::new(disease.clone(), date(year, 1, 1), date(year, 12, 31)).unwrap()
}

/// Atrial fibrillation as registered by cardiology
#[must_use]
pub fn atrial_fibrillation() -> Disease {
    Disease::new("CAR", "401")
}

/// A stroke diagnosis code
#[must_use]
pub fn stroke() -> Disease {
    Disease::new("NEU", "1112")
}

/// Shared standard catalog
#[must_use]
pub fn catalog() -> Arc<DiseaseCatalog> {
    Arc::new(DiseaseCatalog::standard())
}

/// Male patient born 1937-05-14 with a stroke in 1990 and in 2005
#[must_use]
pub fn stroke_history_patient() -> Patient {
    let c = Disease::new("CAR", "21");
    let h = Disease::new("CAR", "72");
    let s = Disease::new("GER", "263");
    let v = Disease::new("ANE", "110");

    let mut patient = Patient::new(100, "M", date(1937, 5, 14), None);
    patient.add_diagnosis(year_diagnosis(&c, 1980));
    patient.add_diagnosis(year_diagnosis(&h, 1985));
    patient.add_diagnosis(year_diagnosis(&s, 1990));
    patient.add_diagnosis(year_diagnosis(&c, 1995));
    patient.add_diagnosis(year_diagnosis(&v, 2000));
    patient.add_diagnosis(year_diagnosis(&s, 2005));
    patient
}

/// Small AF cohort simulated over the first quarter of 2010
///
/// | # | Sex | Born | Notes |
/// |---|-----|------|-------|
/// | 1 | M | 1940-01-01 | AF 2009-06, stroke 2010-03-15 |
/// | 2 | V | 1950-01-01 | AF 2009-12, antithrombotic in February 2010 |
/// | 3 | M | 1945-06-01 | AF 2008-01, out of care since |
/// | 4 | M | 1955-01-01 | heart failure, no AF |
/// | 5 | M | 1930-01-01 | AF 2009-01, died 2010-02-15 |
/// | 6 | M | 1960-01-01 | AF 2009-09 |
#[must_use]
pub fn cohort() -> Population {
    init_logging();

    let mut population = Population::from_patients(
        catalog(),
        [
            Patient::new(1, "M", date(1940, 1, 1), None),
            Patient::new(2, "V", date(1950, 1, 1), None),
            Patient::new(3, "M", date(1945, 6, 1), None),
            Patient::new(4, "M", date(1955, 1, 1), None),
            Patient::new(5, "M", date(1930, 1, 1), Some(date(2010, 2, 15))),
            Patient::new(6, "M", date(1960, 1, 1), None),
        ],
    )
    .unwrap();

    let af = atrial_fibrillation();
    let episode = |start: NaiveDate, end: NaiveDate, disease: &Disease| {
        Diagnosis::new(disease.clone(), start, end)
            .unwrap()
            .with_practitioner("P1")
    };

    population
        .attach_diagnoses(
            vec![
                (1, episode(date(2009, 6, 1), date(2009, 6, 30), &af)),
                (1, episode(date(2010, 3, 15), date(2010, 3, 20), &stroke())),
                (2, episode(date(2009, 12, 1), date(2009, 12, 31), &af)),
                (3, episode(date(2008, 1, 1), date(2008, 1, 31), &af)),
                (4, episode(date(2009, 1, 1), date(2009, 1, 31), &Disease::new("CAR", "21"))),
                (5, episode(date(2009, 1, 1), date(2009, 1, 31), &af)),
                (6, episode(date(2009, 9, 1), date(2009, 9, 30), &af)),
            ],
            &DiagnosisMerger::default(),
        )
        .unwrap();

    population.attach_medications(vec![(
        2,
        Medication::new("B01AA04", date(2010, 2, 1), Some(date(2010, 2, 28))).unwrap(),
    )]);

    population
}
