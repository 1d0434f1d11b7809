// ── Sync configuration ──
//
// Plain-data settings consumed by the sync controller. Loading them from
// files, environment and keyring is `mawaqit-config`'s job.

use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;

pub const DEFAULT_PREPARATION_LEAD: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_RETRY_BASE: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_MAX: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [`SyncController`](crate::SyncController).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Mosque uuid or slug. `None` selects the nearest mosque on every refresh.
    pub mosque: Option<String>,
    /// Calendar fallback zone. The daily refresh reads `refresh_at` here
    /// until a calendar is cached, then on the calendar's own zone.
    pub timezone: Tz,
    /// Local wall-clock time of the daily refresh.
    pub refresh_at: NaiveTime,
    /// Fire one cycle as soon as the scheduler starts.
    pub refresh_on_startup: bool,
    pub preparation_lead: Duration,
    pub retry_base: Duration,
    pub retry_max: Duration,
    /// Bound on each remote call of a cycle.
    pub call_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            mosque: None,
            timezone: Tz::UTC,
            refresh_at: default_refresh_at(),
            refresh_on_startup: true,
            preparation_lead: DEFAULT_PREPARATION_LEAD,
            retry_base: DEFAULT_RETRY_BASE,
            retry_max: DEFAULT_RETRY_MAX,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// 01:00 local time.
pub fn default_refresh_at() -> NaiveTime {
    NaiveTime::from_hms_opt(1, 0, 0).unwrap_or_default()
}
