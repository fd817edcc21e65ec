//! Risk score change events
//!
//! The CHA2DS2-VASc score of a patient only changes at a finite number of
//! dates. A [`ChangeTimeline`] stores the score at each of those dates so that
//! the score at any later date can be looked up without re-evaluating the
//! patient's diagnoses.

use chrono::NaiveDate;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// A date at which the risk score was (re)evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChadsVascChangeEvent {
    /// Evaluation date
    pub date: NaiveDate,
    /// Score in effect from `date` onwards
    pub score: u32,
}

impl ChadsVascChangeEvent {
    /// Create a new change event
    #[must_use]
    pub const fn new(date: NaiveDate, score: u32) -> Self {
        Self { date, score }
    }
}

impl fmt::Display for ChadsVascChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.score)
    }
}

/// Date-ordered sequence of score change events for one patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeTimeline {
    events: SmallVec<[ChadsVascChangeEvent; 8]>,
}

impl ChangeTimeline {
    /// Build a timeline from events in any order
    ///
    /// Events are stably sorted by date; events sharing a date keep the order
    /// in which they were supplied.
    pub fn from_events(events: impl IntoIterator<Item = ChadsVascChangeEvent>) -> Self {
        let mut events: SmallVec<[ChadsVascChangeEvent; 8]> = events.into_iter().collect();
        events.sort_by_key(|e| e.date);
        Self { events }
    }

    /// Score in effect at a date
    ///
    /// Uses the latest event dated on or before `date`. A date before the
    /// first event falls back to the first event. Returns `None` for an empty
    /// timeline.
    #[must_use]
    pub fn score_at(&self, date: NaiveDate) -> Option<u32> {
        let preceding = self.events.partition_point(|e| e.date <= date);
        let index = preceding.saturating_sub(1);
        self.events.get(index).map(|e| e.score)
    }

    /// The events in date order
    #[must_use]
    pub fn events(&self) -> &[ChadsVascChangeEvent] {
        &self.events
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline has not been built or has no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
