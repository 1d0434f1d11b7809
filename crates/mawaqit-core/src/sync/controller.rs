// ── Sync controller ──
//
// Owns the calendar cache and drives refresh cycles: trigger coalescing,
// mosque resolution, bounded remote calls, backoff, atomic cache
// replacement and subscriber fan-out. Failures stop here; consumers see
// them only through `SyncState`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::backoff::Backoff;
use super::schedule;
use super::state::{SyncFailure, SyncPhase, SyncState};
use super::subscribers::{SubscriberRegistry, Subscription};
use crate::config::SyncConfig;
use crate::error::{CoreError, FailureKind};
use crate::model::{CalendarSnapshot, MosqueIdentity, NextEventFacts};
use crate::next_event::NextEventDeriver;
use crate::source::PrayerSource;
use crate::store::CalendarCache;

/// What [`SyncController::on_tick`] did with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new cycle task was spawned.
    Started,
    /// A cycle was already in flight; the trigger was dropped.
    Coalesced,
    /// The controller has been shut down.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Applied,
    GaveUp(FailureKind),
    Cancelled,
}

// ── SyncController ───────────────────────────────────────────────

/// The entry point for hosts.
///
/// Cheaply cloneable via `Arc<Inner>`. Reads (`snapshot`, `next_event`,
/// `sync_state`) never wait on a cycle in flight.
pub struct SyncController<S: PrayerSource> {
    inner: Arc<Inner<S>>,
}

impl<S: PrayerSource> Clone for SyncController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S> {
    config: SyncConfig,
    source: S,
    cache: CalendarCache,
    deriver: NextEventDeriver,
    backoff: Backoff,
    state: watch::Sender<SyncState>,
    subscribers: Arc<SubscriberRegistry>,
    in_flight: Arc<AtomicBool>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: PrayerSource> SyncController<S> {
    /// Create a controller. Nothing runs until [`start`](Self::start),
    /// [`on_tick`](Self::on_tick) or [`sync_once`](Self::sync_once).
    pub fn new(config: SyncConfig, source: S) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(Inner {
                deriver: NextEventDeriver::new(config.preparation_lead),
                backoff: Backoff::new(config.retry_base, config.retry_max),
                config,
                source,
                cache: CalendarCache::new(),
                state,
                subscribers: SubscriberRegistry::new(),
                in_flight: Arc::new(AtomicBool::new(false)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn cache(&self) -> &CalendarCache {
        &self.inner.cache
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the scheduler: one trigger now (if configured), then one per
    /// day at the configured local time.
    pub fn start(&self) {
        let handle = tokio::spawn(scheduler_task(self.clone(), self.inner.cancel.clone()));
        self.track(handle);
        info!(
            refresh_at = %self.inner.config.refresh_at,
            timezone = %self.inner.config.timezone,
            "prayer time sync started"
        );
    }

    /// Cancel the scheduler and any cycle waiting in backoff, then wait
    /// for them to exit. Later triggers are ignored.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handles: Vec<_> = self
            .inner
            .task_handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
        self.set_phase(SyncPhase::Idle);
        debug!("prayer time sync stopped");
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut handles = self
            .inner
            .task_handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    // ── Triggers ─────────────────────────────────────────────────

    /// Start a cycle in its own task, unless one is already in flight.
    pub fn on_tick(&self) -> TickOutcome {
        if self.inner.cancel.is_cancelled() {
            return TickOutcome::Stopped;
        }
        let Some(guard) = CycleGuard::acquire(&self.inner.in_flight) else {
            debug!("sync cycle already in flight, trigger coalesced");
            return TickOutcome::Coalesced;
        };

        let controller = self.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let outcome = controller.run_cycle().await;
            debug!(?outcome, "sync cycle finished");
        });
        self.track(handle);
        TickOutcome::Started
    }

    /// One attempt with no backoff, for hosts that run once and exit.
    ///
    /// Updates the cache, the state and subscribers exactly like a
    /// scheduled attempt. Fails with [`CoreError::SyncInProgress`] if a
    /// cycle is in flight.
    pub async fn sync_once(&self) -> Result<Arc<CalendarSnapshot>, CoreError> {
        let Some(_guard) = CycleGuard::acquire(&self.inner.in_flight) else {
            return Err(CoreError::SyncInProgress);
        };

        self.set_phase(SyncPhase::Fetching);
        match self.attempt().await {
            Ok(snapshot) => Ok(self.apply(snapshot)),
            Err(err) => {
                log_failure(&err, false);
                self.record_failure(&err, false);
                self.notify();
                Err(err)
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Option<Arc<CalendarSnapshot>> {
        self.inner.cache.get()
    }

    pub fn next_event(&self) -> Option<NextEventFacts> {
        self.next_event_at(Utc::now())
    }

    /// Next event from the cached calendar as of `now`; `None` before the
    /// first sync or after the day's last adhan.
    pub fn next_event_at(&self, now: DateTime<Utc>) -> Option<NextEventFacts> {
        let snapshot = self.inner.cache.get()?;
        self.inner.deriver.derive(&snapshot.calendar, now)
    }

    /// Zone whose wall clock the daily refresh follows: the cached
    /// calendar's, or the configured one before the first success.
    pub fn refresh_timezone(&self) -> Tz {
        self.inner
            .cache
            .get()
            .map_or(self.inner.config.timezone, |snapshot| snapshot.calendar.timezone())
    }

    /// The first daily refresh after `now`.
    pub fn next_refresh_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        schedule::next_refresh_after(now, self.inner.config.refresh_at, self.refresh_timezone())
    }

    pub fn sync_state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    pub fn watch_sync_state(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Call `handler` once after every attempt, successful or not.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    // ── Cycle ────────────────────────────────────────────────────

    async fn run_cycle(&self) -> CycleOutcome {
        loop {
            self.set_phase(SyncPhase::Fetching);
            let err = match self.attempt().await {
                Ok(snapshot) => {
                    self.apply(snapshot);
                    return CycleOutcome::Applied;
                }
                Err(err) => err,
            };

            let kind = err.kind();
            log_failure(&err, kind.is_retryable());
            let delay = self.record_failure(&err, kind.is_retryable());
            self.notify();

            if !kind.is_retryable() {
                return CycleOutcome::GaveUp(kind);
            }

            tokio::select! {
                biased;
                () = self.inner.cancel.cancelled() => {
                    self.set_phase(SyncPhase::Idle);
                    return CycleOutcome::Cancelled;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn attempt(&self) -> Result<CalendarSnapshot, CoreError> {
        let mosque = self.resolve_mosque().await?;
        let calendar = self
            .bounded(self.inner.source.fetch_calendar(&mosque, Utc::now()))
            .await?;
        debug!(mosque = %mosque.uuid, date = %calendar.date(), fields = calendar.len(), "calendar fetched");
        Ok(CalendarSnapshot {
            mosque,
            calendar,
            fetched_at: Utc::now(),
        })
    }

    /// A configured mosque is looked up once and then taken from the
    /// cache. Without one, the nearest mosque is looked up every time.
    async fn resolve_mosque(&self) -> Result<MosqueIdentity, CoreError> {
        let config = &self.inner.config;
        if config.mosque.is_some() {
            if let Some(snapshot) = self.inner.cache.get() {
                return Ok(snapshot.mosque.clone());
            }
        }

        let wanted = config.mosque.as_deref();
        let candidates = self
            .bounded(
                self.inner
                    .source
                    .lookup_mosques(config.latitude, config.longitude, wanted),
            )
            .await?;
        let mosque = select_mosque(candidates, wanted, config.latitude, config.longitude)?;
        info!(mosque = %mosque.name, uuid = %mosque.uuid, "mosque resolved");
        Ok(mosque)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        let limit = self.inner.config.call_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                timeout_secs: limit.as_secs(),
            }),
        }
    }

    fn apply(&self, snapshot: CalendarSnapshot) -> Arc<CalendarSnapshot> {
        self.set_phase(SyncPhase::Applying);
        let fetched_at = snapshot.fetched_at;
        let snapshot = Arc::new(snapshot);
        self.inner.cache.replace(Arc::clone(&snapshot));

        match self.inner.deriver.derive(&snapshot.calendar, fetched_at) {
            Some(next) => info!(
                mosque = %snapshot.mosque.name,
                next = %next.prayer,
                at = %next.time.with_timezone(&snapshot.calendar.timezone()),
                preparation = %next.preparation.with_timezone(&snapshot.calendar.timezone()),
                "prayer calendar applied"
            ),
            None => info!(
                mosque = %snapshot.mosque.name,
                "prayer calendar applied, no upcoming prayer today"
            ),
        }

        self.inner.state.send_modify(|state| {
            state.record_success(fetched_at);
            state.phase = SyncPhase::Idle;
        });
        self.notify();
        snapshot
    }

    /// Record `err` in the state. With `retry`, moves to `Backoff` and
    /// returns the delay to wait; otherwise back to `Idle`.
    fn record_failure(&self, err: &CoreError, retry: bool) -> Duration {
        let now = Utc::now();
        let failure = SyncFailure {
            kind: err.kind(),
            message: err.to_string(),
            at: now,
        };
        let mut delay = Duration::ZERO;
        self.inner.state.send_modify(|state| {
            let failures = state.record_failure(failure);
            if retry {
                delay = self.inner.backoff.delay_for(failures);
                state.phase = SyncPhase::Backoff {
                    attempt: failures,
                    delay,
                };
                state.next_retry_at = TimeDelta::from_std(delay).ok().map(|d| now + d);
            } else {
                state.phase = SyncPhase::Idle;
                state.next_retry_at = None;
            }
        });
        if retry {
            debug!(delay_secs = delay.as_secs(), "retry scheduled");
        }
        delay
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.inner.state.send_if_modified(|state| {
            let changed = state.phase != phase;
            state.phase = phase;
            changed
        });
    }

    fn notify(&self) {
        let notified = self.inner.subscribers.notify_all();
        debug!(subscribers = notified, "sync subscribers notified");
    }
}

fn select_mosque(
    candidates: Vec<MosqueIdentity>,
    wanted: Option<&str>,
    latitude: f64,
    longitude: f64,
) -> Result<MosqueIdentity, CoreError> {
    match wanted {
        Some(identifier) => candidates
            .into_iter()
            .find(|m| m.matches(identifier))
            .ok_or_else(|| CoreError::MosqueNotFound {
                identifier: identifier.to_owned(),
            }),
        None => candidates
            .into_iter()
            .next()
            .ok_or(CoreError::NoMosqueNearby {
                latitude,
                longitude,
            }),
    }
}

fn log_failure(err: &CoreError, will_retry: bool) {
    match err.kind() {
        FailureKind::BadCredentials => {
            error!(error = %err, "Mawaqit refused the credentials, waiting for the next scheduled refresh");
        }
        FailureKind::MalformedResponse => {
            warn!(error = %err, will_retry, "malformed response from Mawaqit");
        }
        FailureKind::Network => {
            warn!(error = %err, will_retry, "prayer calendar fetch failed");
        }
        FailureKind::Unexpected => {
            error!(error = %err, "unexpected sync failure, waiting for the next scheduled refresh");
        }
    }
}

// ── In-flight guard ──────────────────────────────────────────────

/// Holds the single in-flight slot; released on drop.
struct CycleGuard {
    flag: Arc<AtomicBool>,
}

impl CycleGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn scheduler_task<S: PrayerSource>(controller: SyncController<S>, cancel: CancellationToken) {
    // The cached calendar can move the refresh to another zone's clock,
    // so every state change recomputes the wait.
    let mut state = controller.watch_sync_state();
    if controller.inner.config.refresh_on_startup {
        controller.on_tick();
    }

    loop {
        let timezone = controller.refresh_timezone();
        let wait = schedule::until_next_refresh(
            Utc::now(),
            controller.inner.config.refresh_at,
            timezone,
        );
        debug!(wait_secs = wait.as_secs(), %timezone, "next scheduled refresh");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {
                if controller.on_tick() == TickOutcome::Coalesced {
                    info!("scheduled refresh skipped, previous cycle still running");
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
