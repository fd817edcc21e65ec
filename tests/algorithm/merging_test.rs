//! Property tests for diagnosis interval merging

use chadsvasc_cohort::{ContinuityRule, Diagnosis, DiagnosisMerger, Disease, MergeConfig};
use chrono::{Days, NaiveDate};

use crate::utils::date;

fn episodes() -> Vec<Diagnosis> {
    let af = Disease::new("CAR", "401");
    let raw = [
        ((2010, 1, 1), (2010, 1, 31), "A"),
        ((2010, 1, 15), (2010, 2, 10), "A"),
        ((2010, 2, 11), (2010, 3, 1), "A"),
        ((2010, 2, 20), (2010, 2, 25), "B"),
        ((2010, 5, 1), (2010, 5, 31), "B"),
        ((2010, 6, 1), (2010, 6, 30), "B"),
        ((2011, 1, 1), (2011, 12, 31), "B"),
    ];

    raw.iter()
        .map(|&((sy, sm, sd), (ey, em, ed), practitioner)| {
            Diagnosis::new(af.clone(), date(sy, sm, sd), date(ey, em, ed))
                .unwrap()
                .with_practitioner(practitioner)
        })
        .collect()
}

fn covered_days(diagnoses: &[Diagnosis]) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = diagnoses
        .iter()
        .flat_map(|d| {
            let mut day = d.start_date();
            let mut covered = Vec::new();
            while day <= d.end_date() {
                covered.push(day);
                day = day + Days::new(1);
            }
            covered
        })
        .collect();
    days.sort();
    days.dedup();
    days
}

#[test]
fn test_merge_is_idempotent() {
    for rule in [ContinuityRule::GapDays(1), ContinuityRule::SameBillingYear] {
        let merger = DiagnosisMerger::new(MergeConfig::new().with_continuity(rule));
        let once = merger.merge(episodes());
        let twice = merger.merge(once.clone());
        assert_eq!(once, twice);
    }
}

#[test]
fn test_merge_preserves_coverage() {
    let merger = DiagnosisMerger::default();
    let merged = merger.merge(episodes());
    assert_eq!(covered_days(&merged), covered_days(&episodes()));
}

#[test]
fn test_merge_splits_on_practitioner() {
    let merger = DiagnosisMerger::default();
    let merged = merger.merge(episodes());

    let spans: Vec<(NaiveDate, NaiveDate, Option<&str>)> = merged
        .iter()
        .map(|d| (d.start_date(), d.end_date(), d.practitioner.as_deref()))
        .collect();
    assert_eq!(
        spans,
        vec![
            (date(2010, 1, 1), date(2010, 3, 1), Some("A")),
            (date(2010, 2, 20), date(2010, 2, 25), Some("B")),
            (date(2010, 5, 1), date(2010, 6, 30), Some("B")),
            (date(2011, 1, 1), date(2011, 12, 31), Some("B")),
        ]
    );
}

#[test]
fn test_same_billing_year_joins_within_year() {
    let merger =
        DiagnosisMerger::new(MergeConfig::new().with_continuity(ContinuityRule::SameBillingYear));
    let merged = merger.merge(episodes());
    // The two B episodes of 2010 merge, the 2011 episode stays separate
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[1].start_date(), date(2010, 2, 20));
    assert_eq!(merged[1].end_date(), date(2010, 6, 30));
}

#[test]
fn test_practitioner_split_can_be_disabled() {
    let config = MergeConfig {
        split_on_practitioner: false,
        ..MergeConfig::new()
    };
    let merged = DiagnosisMerger::new(config).merge(episodes());
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].end_date(), date(2010, 3, 1));
}

#[test]
fn test_equal_start_dates_merge_in_input_order() {
    let merger = DiagnosisMerger::default();
    let af = Disease::new("CAR", "401");
    let visit = |start: NaiveDate, end: NaiveDate, practitioner: &str| {
        Diagnosis::new(af.clone(), start, end)
            .unwrap()
            .with_practitioner(practitioner)
    };
    let a = visit(date(2010, 1, 1), date(2010, 1, 4), "A");
    let b = visit(date(2010, 1, 1), date(2010, 1, 4), "B");
    let follow_up = visit(date(2010, 1, 5), date(2010, 1, 9), "B");

    // B's follow-up continues B only when B is the last episode of the day
    let merged = merger.merge(vec![a.clone(), b.clone(), follow_up.clone()]);
    let practitioners: Vec<_> = merged.iter().map(|d| d.practitioner.as_deref()).collect();
    assert_eq!(practitioners, vec![Some("A"), Some("B")]);
    assert_eq!(merged[1].end_date(), date(2010, 1, 9));

    let merged = merger.merge(vec![b, a, follow_up]);
    let practitioners: Vec<_> = merged.iter().map(|d| d.practitioner.as_deref()).collect();
    assert_eq!(practitioners, vec![Some("B"), Some("A"), Some("B")]);
    assert_eq!(merged[0].end_date(), date(2010, 1, 4));
}
