use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FailureKind;

/// Where the sync controller is in its cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Applying,
    /// Waiting `delay` before retry number `attempt`.
    Backoff { attempt: u32, delay: Duration },
}

/// The most recent failed attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub kind: FailureKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Observable sync state, published through a `watch` channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncState {
    pub phase: SyncPhase,
    pub last_success: Option<DateTime<Utc>>,
    /// Cleared by the next success.
    pub last_error: Option<SyncFailure>,
    pub consecutive_failures: u32,
    pub next_retry_at: Option<DateTime<Utc>>,
}

impl SyncState {
    /// `true` while the cached calendar predates a failure.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SyncPhase::Idle
    }

    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_success = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
        self.next_retry_at = None;
    }

    /// Returns the new consecutive failure count.
    pub(crate) fn record_failure(&mut self, failure: SyncFailure) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(failure);
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_clears_failures() {
        let mut state = SyncState::default();
        let failure = SyncFailure {
            kind: FailureKind::Network,
            message: "down".into(),
            at: Utc::now(),
        };
        assert_eq!(state.record_failure(failure.clone()), 1);
        assert_eq!(state.record_failure(failure), 2);
        assert!(state.is_stale());

        state.record_success(Utc::now());
        assert_eq!(state.consecutive_failures, 0);
        assert!(!state.is_stale());
        assert!(state.last_success.is_some());
    }

    #[test]
    fn phase_serializes_tagged() {
        let phase = SyncPhase::Backoff {
            attempt: 2,
            delay: Duration::from_secs(120),
        };
        let json = serde_json::to_value(phase).unwrap();
        assert_eq!(json["phase"], "backoff");
        assert_eq!(json["attempt"], 2);
    }
}
