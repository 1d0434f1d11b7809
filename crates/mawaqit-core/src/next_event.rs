// ── Next-event derivation ──
//
// Pure selection of the upcoming adhan from a day calendar.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::DEFAULT_PREPARATION_LEAD;
use crate::model::{NextEventFacts, PrayerCalendar, PrayerField};

/// Picks the next adhan and its preparation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextEventDeriver {
    lead: TimeDelta,
}

impl Default for NextEventDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_PREPARATION_LEAD)
    }
}

impl NextEventDeriver {
    pub fn new(lead: Duration) -> Self {
        Self {
            lead: TimeDelta::from_std(lead).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn lead(&self) -> TimeDelta {
        self.lead
    }

    /// The earliest adhan strictly after `now`, or `None` when the day is over.
    ///
    /// Equal times resolve by [`PrayerField::ADHAN`] order. Shurouq and
    /// iqama fields never qualify. The preparation time is not clamped to
    /// `now`.
    pub fn derive(&self, calendar: &PrayerCalendar, now: DateTime<Utc>) -> Option<NextEventFacts> {
        PrayerField::ADHAN
            .iter()
            .enumerate()
            .filter_map(|(rank, &field)| {
                calendar
                    .get(field)
                    .filter(|at| *at > now)
                    .map(|at| (at, rank, field))
            })
            .min()
            .map(|(time, _, prayer)| NextEventFacts {
                prayer,
                time,
                preparation: time.checked_sub_signed(self.lead).unwrap_or(DateTime::<Utc>::MIN_UTC),
            })
    }
}
