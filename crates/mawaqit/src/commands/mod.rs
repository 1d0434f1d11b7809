//! Command handlers, one module per subcommand.

pub mod config_cmd;
pub mod mosques;
pub mod next;
pub mod times;
pub mod token;
pub mod watch;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use mawaqit_config::Config;

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;

/// What every handler needs besides its own args.
pub struct Ctx<'a> {
    pub global: &'a GlobalOpts,
    pub cfg: Config,
    pub format: OutputFormat,
    pub color: bool,
}

impl<'a> Ctx<'a> {
    pub fn load(global: &'a GlobalOpts) -> Result<Self, CliError> {
        let cfg = config::load(global)?;
        let format = config::output_format(global, &cfg);
        let color = crate::output::should_color(config::color_mode(global, &cfg))
            && format == OutputFormat::Table;
        Ok(Self {
            global,
            cfg,
            format,
            color,
        })
    }

    pub fn print(&self, rendered: &str) {
        crate::output::print_output(rendered, self.global.quiet);
    }
}

/// Route a network-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Ctx::load(global)?;
    match cmd {
        Command::Token(args) => token::handle(args, &ctx).await,
        Command::Mosques(args) => mosques::handle(args, &ctx).await,
        Command::Times => times::handle(&ctx).await,
        Command::Next => next::handle(&ctx).await,
        Command::Watch => watch::handle(&ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

// ── Shared formatting ───────────────────────────────────────────────

pub(crate) fn hhmm(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%H:%M").to_string()
}

/// Whole minutes from `now` until `at`, rounded up; negative once past.
pub(crate) fn minutes_until(now: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    let seconds = (at - now).num_seconds();
    if seconds > 0 {
        (seconds + 59) / 60
    } else {
        seconds / 60
    }
}

/// `1h 05m`, `12m`, or `now`.
pub(crate) fn human_minutes(minutes: i64) -> String {
    match minutes {
        m if m <= 0 => "now".to_owned(),
        m if m < 60 => format!("{m}m"),
        m => format!("{}h {:02}m", m / 60, m % 60),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn minutes_round_up_before_the_event() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 14, 10, 1).unwrap();
        assert_eq!(minutes_until(now, at), 11);
        assert_eq!(minutes_until(at, now), -10);
    }

    #[test]
    fn human_minutes_formats() {
        assert_eq!(human_minutes(0), "now");
        assert_eq!(human_minutes(12), "12m");
        assert_eq!(human_minutes(65), "1h 05m");
    }

    #[test]
    fn hhmm_uses_local_zone() {
        let at = Utc.with_ymd_and_hms(2026, 7, 1, 12, 30, 0).unwrap();
        assert_eq!(hhmm(at, chrono_tz::Europe::Paris), "14:30");
    }
}
