//! `mawaqit times`: today's calendar for the selected mosque.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tabled::Tabled;

use mawaqit_core::{CalendarSnapshot, PrayerCalendar, PrayerField};

use crate::commands::{Ctx, hhmm};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct TimesView {
    mosque: String,
    uuid: String,
    date: NaiveDate,
    timezone: String,
    fetched_at: DateTime<Utc>,
    prayers: Vec<PrayerRow>,
}

#[derive(Debug, Serialize, Tabled)]
struct PrayerRow {
    #[tabled(rename = "Prayer")]
    prayer: PrayerField,
    #[tabled(rename = "Adhan")]
    adhan: String,
    #[tabled(rename = "Iqama")]
    iqama: String,
    #[tabled(skip)]
    adhan_utc: DateTime<Utc>,
    #[tabled(skip)]
    iqama_utc: Option<DateTime<Utc>>,
}

/// Adhan rows in service order, Jumua entries last, with their iqama.
fn prayer_rows(calendar: &PrayerCalendar) -> Vec<PrayerRow> {
    let tz = calendar.timezone();
    PrayerField::DAILY
        .into_iter()
        .chain([PrayerField::Jumua, PrayerField::Jumua2])
        .filter_map(|prayer| {
            let adhan = calendar.get(prayer)?;
            let iqama = prayer.iqama().and_then(|field| calendar.get(field));
            Some(PrayerRow {
                prayer,
                adhan: hhmm(adhan, tz),
                iqama: iqama.map(|at| hhmm(at, tz)).unwrap_or_default(),
                adhan_utc: adhan,
                iqama_utc: iqama,
            })
        })
        .collect()
}

fn view(snapshot: &CalendarSnapshot) -> TimesView {
    let calendar = &snapshot.calendar;
    TimesView {
        mosque: snapshot.mosque.name.clone(),
        uuid: snapshot.mosque.uuid.clone(),
        date: calendar.date(),
        timezone: calendar.timezone().name().to_owned(),
        fetched_at: snapshot.fetched_at,
        prayers: prayer_rows(calendar),
    }
}

fn detail(view: &TimesView, color: bool) -> String {
    let heading = format!("{}, {} ({})", view.mosque, view.date, view.timezone);
    format!(
        "{}\n{}",
        output::highlight(&heading, color),
        output::render_table(&view.prayers)
    )
}

fn plain(view: &TimesView) -> String {
    view.prayers
        .iter()
        .map(|row| format!("{} {}", row.prayer, row.adhan))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(ctx: &Ctx<'_>) -> Result<(), CliError> {
    let sync = ctx.cfg.build_sync()?;
    let snapshot = sync.sync_once().await?;

    let view = view(&snapshot);
    let rendered = output::render_single(ctx.format, &view, |v| detail(v, ctx.color), plain)?;
    ctx.print(&rendered);
    Ok(())
}
