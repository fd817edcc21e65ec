//! Precomputed score change timelines

use chrono::NaiveDate;

use crate::error::{CohortError, Result};
use crate::models::{ChadsVascChangeEvent, ChangeTimeline, Patient};
use crate::utils::add_years;

use super::{AGE_BAND_HIGH, AGE_BAND_LOW, RiskScoreEngine};

impl RiskScoreEngine {
    /// Build the score change timeline of a patient
    ///
    /// The score can only change at birth, at the start of a diagnosis in a
    /// scored group, and at the two age band birthdays. The score is evaluated
    /// at each of those dates; the result is stably sorted by date.
    pub fn build_change_timeline(&self, patient: &Patient) -> Result<ChangeTimeline> {
        let catalog = self.catalog();
        let mut dates = vec![patient.birth_date];

        dates.extend(
            patient
                .diagnoses()
                .iter_all()
                .filter(|d| catalog.is_scored(&d.disease))
                .map(|d| d.start_date()),
        );

        for band in [AGE_BAND_LOW, AGE_BAND_HIGH] {
            dates.push(band_birthday(patient, band)?);
        }

        let timeline = ChangeTimeline::from_events(
            dates
                .into_iter()
                .map(|date| ChadsVascChangeEvent::new(date, self.calculate_score(patient, date))),
        );

        log::debug!(
            "Patient {}: built change timeline with {} events",
            patient.number,
            timeline.len()
        );

        Ok(timeline)
    }

    /// Build and store the change timeline of a patient
    pub fn refresh_change_timeline(&self, patient: &mut Patient) -> Result<()> {
        let timeline = self.build_change_timeline(patient)?;
        patient.set_change_timeline(timeline);
        Ok(())
    }
}

/// First date on which the patient's age reaches `band`
///
/// A 29 February birthday falls back to 28 February in common years, where
/// the patient is still a year younger; the band is reached on 1 March.
fn band_birthday(patient: &Patient, band: i32) -> Result<NaiveDate> {
    let anniversary = add_years(patient.birth_date, band.unsigned_abs())?;
    if patient.calculate_age(anniversary) >= band {
        return Ok(anniversary);
    }
    anniversary
        .succ_opt()
        .ok_or_else(|| CohortError::DateOutOfRange(format!("{anniversary} + 1 day")))
}
