// ── Calendar cache ──
//
// Single-writer, many-reader holder of the latest snapshot. Replacement is
// one pointer swap, so readers see the old or the new snapshot whole.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, TimeDelta, Utc};

use crate::model::CalendarSnapshot;

#[derive(Debug, Default)]
pub struct CalendarCache {
    current: ArcSwapOption<CalendarSnapshot>,
}

impl CalendarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest snapshot, `None` before the first successful sync.
    pub fn get(&self) -> Option<Arc<CalendarSnapshot>> {
        self.current.load_full()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_none()
    }

    /// Time since the current snapshot was fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.current.load_full().map(|snap| now - snap.fetched_at)
    }

    /// Swap in a new snapshot, returning the previous one.
    pub(crate) fn replace(&self, snapshot: Arc<CalendarSnapshot>) -> Option<Arc<CalendarSnapshot>> {
        self.current.swap(Some(snapshot))
    }
}
