//! `mawaqit next`: the upcoming adhan and when to start preparing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mawaqit_core::{CalendarSnapshot, NextEventFacts, PrayerField};

use crate::commands::{Ctx, hhmm, human_minutes, minutes_until};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
pub(crate) struct NextView {
    pub(crate) mosque: String,
    pub(crate) prayer: PrayerField,
    pub(crate) time: DateTime<Utc>,
    pub(crate) preparation: DateTime<Utc>,
    pub(crate) local_time: String,
    pub(crate) local_preparation: String,
    pub(crate) minutes_until: i64,
}

pub(crate) fn view(
    snapshot: &CalendarSnapshot,
    facts: NextEventFacts,
    now: DateTime<Utc>,
) -> NextView {
    let tz = snapshot.calendar.timezone();
    NextView {
        mosque: snapshot.mosque.name.clone(),
        prayer: facts.prayer,
        time: facts.time,
        preparation: facts.preparation,
        local_time: hhmm(facts.time, tz),
        local_preparation: hhmm(facts.preparation, tz),
        minutes_until: minutes_until(now, facts.time),
    }
}

fn detail(view: Option<&NextView>, color: bool) -> String {
    let Some(view) = view else {
        return "No upcoming prayer today".to_owned();
    };
    format!(
        "{} at {} (in {})\n{}",
        output::highlight(&view.prayer.to_string(), color),
        view.local_time,
        human_minutes(view.minutes_until),
        output::dim(
            &format!("Prepare from {} at {}", view.local_preparation, view.mosque),
            color
        ),
    )
}

fn plain(view: Option<&NextView>) -> String {
    view.map(|v| format!("{} {}", v.prayer, v.local_time))
        .unwrap_or_default()
}

pub async fn handle(ctx: &Ctx<'_>) -> Result<(), CliError> {
    let sync = ctx.cfg.build_sync()?;
    let snapshot = sync.sync_once().await?;

    let now = Utc::now();
    let next = sync.next_event_at(now).map(|facts| view(&snapshot, facts, now));
    let rendered = output::render_single(
        ctx.format,
        &next,
        |v| detail(v.as_ref(), ctx.color),
        |v| plain(v.as_ref()),
    )?;
    ctx.print(&rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Tz;

    use mawaqit_core::{MosqueIdentity, NextEventDeriver, PrayerCalendar};

    use super::*;

    fn snapshot() -> CalendarSnapshot {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let at = |h, m| Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap();
        CalendarSnapshot {
            mosque: MosqueIdentity {
                uuid: "u-1".into(),
                name: "Grande Mosquee".into(),
                slug: None,
                localisation: None,
                image: None,
                url: None,
                proximity: None,
            },
            calendar: PrayerCalendar::new(date, Tz::UTC)
                .with_time(PrayerField::Dhuhr, at(13, 0))
                .with_time(PrayerField::Asr, at(16, 30)),
            fetched_at: at(1, 0),
        }
    }

    #[test]
    fn view_reports_local_times_and_countdown() {
        let snapshot = snapshot();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let facts = NextEventDeriver::default()
            .derive(&snapshot.calendar, now)
            .unwrap();

        let view = view(&snapshot, facts, now);
        assert_eq!(view.prayer, PrayerField::Asr);
        assert_eq!(view.local_time, "16:30");
        assert_eq!(view.local_preparation, "16:20");
        assert_eq!(view.minutes_until, 150);
        assert_eq!(plain(Some(&view)), "Asr 16:30");
        assert!(detail(Some(&view), false).starts_with("Asr at 16:30 (in 2h 30m)"));
    }

    #[test]
    fn nothing_left_today() {
        assert_eq!(detail(None, false), "No upcoming prayer today");
        assert_eq!(plain(None), "");
    }
}
