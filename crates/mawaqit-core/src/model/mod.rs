// ── Domain model ──
//
// Canonical types shared by the sync controller and its consumers.
// Wire types from `mawaqit-api` are converted into these in `convert`.

pub mod calendar;
pub mod mosque;
pub mod prayer;

pub use calendar::{CalendarSnapshot, NextEventFacts, PrayerCalendar};
pub use mosque::MosqueIdentity;
pub use prayer::PrayerField;
