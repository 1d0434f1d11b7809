// ── Sync orchestration ──
//
// The controller and the pieces it is built from: retry backoff, daily
// schedule arithmetic, observable state and subscriber fan-out.

mod backoff;
mod controller;
mod schedule;
mod state;
mod subscribers;

pub use backoff::Backoff;
pub use controller::{SyncController, TickOutcome};
pub use schedule::{next_refresh_after, until_next_refresh};
pub use state::{SyncFailure, SyncPhase, SyncState};
pub use subscribers::{SubscriberRegistry, Subscription};
