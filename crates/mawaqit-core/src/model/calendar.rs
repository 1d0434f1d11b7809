use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use strum::IntoEnumIterator;

use super::mosque::MosqueIdentity;
use super::prayer::PrayerField;

/// Prayer times of one mosque for one calendar day.
///
/// Times are absolute instants; `timezone` is only kept for display. A
/// field is absent when the service gave no usable value for it that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerCalendar {
    date: NaiveDate,
    timezone: Tz,
    times: BTreeMap<PrayerField, DateTime<Utc>>,
}

impl PrayerCalendar {
    pub fn new(date: NaiveDate, timezone: Tz) -> Self {
        Self {
            date,
            timezone,
            times: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_time(mut self, field: PrayerField, at: DateTime<Utc>) -> Self {
        self.set(field, at);
        self
    }

    pub fn set(&mut self, field: PrayerField, at: DateTime<Utc>) {
        self.times.insert(field, at);
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn get(&self, field: PrayerField) -> Option<DateTime<Utc>> {
        self.times.get(&field).copied()
    }

    /// The field's instant on the mosque's wall clock.
    pub fn local(&self, field: PrayerField) -> Option<DateTime<Tz>> {
        self.get(field).map(|at| at.with_timezone(&self.timezone))
    }

    /// Present fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerField, DateTime<Utc>)> + '_ {
        self.times.iter().map(|(field, at)| (*field, *at))
    }

    /// Every known field, present or not, in display order.
    pub fn fields(&self) -> impl Iterator<Item = (PrayerField, Option<DateTime<Utc>>)> + '_ {
        PrayerField::iter().map(|field| (field, self.get(field)))
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// What the cache holds: one successful fetch, replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarSnapshot {
    pub mosque: MosqueIdentity,
    pub calendar: PrayerCalendar,
    pub fetched_at: DateTime<Utc>,
}

/// The upcoming prayer and when to start preparing for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextEventFacts {
    pub prayer: PrayerField,
    pub time: DateTime<Utc>,
    /// `time` minus the preparation lead. May already be in the past.
    pub preparation: DateTime<Utc>,
}
