//! `mawaqit watch`: run the sync controller until Ctrl-C, one report per attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mawaqit_core::{MawaqitSync, SyncFailure};

use crate::cli::OutputFormat;
use crate::commands::{Ctx, next};
use crate::error::CliError;
use crate::output;

/// One line of `watch` output.
#[derive(Debug, Serialize)]
struct WatchReport {
    at: DateTime<Utc>,
    ok: bool,
    mosque: Option<String>,
    next: Option<next::NextView>,
    error: Option<SyncFailure>,
    retry_in_secs: Option<u64>,
}

/// Seconds until the pending retry; zero once it is due.
fn retry_in_secs(next_retry_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<u64> {
    next_retry_at.map(|at| (at - now).to_std().unwrap_or_default().as_secs())
}

fn report(sync: &MawaqitSync) -> WatchReport {
    let now = Utc::now();
    let state = sync.sync_state();
    let snapshot = sync.snapshot();
    let next = snapshot.as_ref().and_then(|snapshot| {
        sync.next_event_at(now)
            .map(|facts| next::view(snapshot, facts, now))
    });
    let retry_in_secs = retry_in_secs(state.next_retry_at, now);
    WatchReport {
        at: now,
        ok: state.last_error.is_none(),
        mosque: snapshot.map(|s| s.mosque.name.clone()),
        next,
        error: state.last_error,
        retry_in_secs,
    }
}

fn line(report: &WatchReport, color: bool) -> String {
    let stamp = output::dim(&report.at.format("%Y-%m-%d %H:%M:%S").to_string(), color);
    if let Some(ref failure) = report.error {
        let retry = report
            .retry_in_secs
            .map(|secs| format!(", retrying in {secs}s"))
            .unwrap_or_default();
        return format!("{stamp} sync failed ({}): {}{retry}", failure.kind, failure.message);
    }
    let mosque = report.mosque.as_deref().unwrap_or("?");
    match report.next {
        Some(ref next) => format!(
            "{stamp} synced {mosque}: next {} at {}",
            output::highlight(&next.prayer.to_string(), color),
            next.local_time
        ),
        None => format!("{stamp} synced {mosque}: no upcoming prayer today"),
    }
}

fn render(report: &WatchReport, format: OutputFormat, color: bool) -> Result<String, CliError> {
    // Structured formats stream one compact document per attempt.
    let format = match format {
        OutputFormat::Json => OutputFormat::JsonCompact,
        other => other,
    };
    output::render_single(format, report, |r| line(r, color), |r| line(r, false))
}

pub async fn handle(ctx: &Ctx<'_>) -> Result<(), CliError> {
    let sync = ctx.cfg.build_sync()?;

    let format = ctx.format;
    let color = ctx.color;
    let quiet = ctx.global.quiet;
    let reporter = sync.clone();
    let subscription = sync.subscribe(move || {
        let report = report(&reporter);
        match render(&report, format, color) {
            Ok(rendered) => output::print_output(&rendered, quiet),
            Err(err) => tracing::warn!(error = %err, "failed to render sync report"),
        }
    });

    sync.start();
    if !quiet {
        eprintln!("Watching prayer times, Ctrl-C to stop");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");

    subscription.unsubscribe();
    sync.shutdown().await;
    Ok(())
}
