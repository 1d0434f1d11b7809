//! Prayer-time synchronization between `mawaqit-api` and hosts (CLI, daemons).
//!
//! - **[`SyncController`]** drives refresh cycles: a daily trigger at a
//!   configured local time plus one at startup, per-call timeouts,
//!   capped exponential backoff on transient failures, and one
//!   notification to every subscriber per attempt. Triggers arriving while
//!   a cycle is in flight are coalesced.
//!
//! - **[`CalendarCache`]** holds the latest [`CalendarSnapshot`] and swaps
//!   it atomically; readers keep being served stale data while a retry is
//!   pending.
//!
//! - **[`NextEventDeriver`]** picks the upcoming adhan from a
//!   [`PrayerCalendar`] and its preparation time. Pure.
//!
//! - **[`PrayerSource`]** is the seam to the remote service;
//!   [`MawaqitSource`] implements it over [`mawaqit_api::MawaqitClient`].

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod next_event;
pub mod source;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SyncConfig;
pub use error::{CoreError, FailureKind};
pub use model::{CalendarSnapshot, MosqueIdentity, NextEventFacts, PrayerCalendar, PrayerField};
pub use next_event::NextEventDeriver;
pub use source::{MawaqitSource, PrayerSource};
pub use store::CalendarCache;
pub use sync::{
    Backoff, SubscriberRegistry, Subscription, SyncController, SyncFailure, SyncPhase, SyncState,
    TickOutcome,
};

/// The controller wired to the Mawaqit API.
pub type MawaqitSync = SyncController<MawaqitSource>;
