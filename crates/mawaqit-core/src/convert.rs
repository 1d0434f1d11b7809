// ── API → domain type conversions ──
//
// Turns the service's year calendar into one `PrayerCalendar` day with
// absolute instants, and search records into `MosqueIdentity`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{debug, warn};

use mawaqit_api::{MosqueRecord, PrayerTimes};

use crate::error::CoreError;
use crate::model::{MosqueIdentity, PrayerCalendar, PrayerField};

/// Iqama entries are listed in this order, one per non-Shurouq adhan.
const IQAMA_ORDER: [PrayerField; 5] = [
    PrayerField::Fajr,
    PrayerField::Dhuhr,
    PrayerField::Asr,
    PrayerField::Maghrib,
    PrayerField::Isha,
];

impl From<MosqueRecord> for MosqueIdentity {
    fn from(record: MosqueRecord) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            slug: record.slug,
            localisation: record.localisation,
            image: record.image,
            url: record.url,
            proximity: record.proximity,
        }
    }
}

/// Zone the calendar's wall-clock times are in.
///
/// The mosque's own zone when the service reports a valid one, else `fallback`.
pub fn calendar_timezone(raw: &PrayerTimes, fallback: Tz) -> Tz {
    match raw.timezone.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.parse().unwrap_or_else(|_| {
            warn!(timezone = name, %fallback, "unknown mosque timezone, using configured one");
            fallback
        }),
        _ => fallback,
    }
}

/// Build today's calendar, "today" being the date at `now` in the mosque's zone.
pub fn calendar_for_day(
    raw: &PrayerTimes,
    now: DateTime<Utc>,
    fallback_tz: Tz,
) -> Result<PrayerCalendar, CoreError> {
    let tz = calendar_timezone(raw, fallback_tz);
    let date = now.with_timezone(&tz).date_naive();
    calendar_for_date(raw, date, tz)
}

/// Build the calendar of `date`, reading wall-clock times in `tz`.
///
/// A missing day or an unreadable adhan time is a malformed response.
/// Unreadable iqama and Jumua entries only drop that field.
pub fn calendar_for_date(
    raw: &PrayerTimes,
    date: NaiveDate,
    tz: Tz,
) -> Result<PrayerCalendar, CoreError> {
    let day = raw
        .day_times(date.month0(), date.day())
        .ok_or_else(|| malformed(format!("calendar has no entry for {date}")))?;
    if day.len() < PrayerField::DAILY.len() {
        return Err(malformed(format!(
            "calendar entry for {date} has {} times, expected {}",
            day.len(),
            PrayerField::DAILY.len()
        )));
    }

    let mut calendar = PrayerCalendar::new(date, tz);

    for (field, text) in PrayerField::DAILY.into_iter().zip(day) {
        let time = parse_clock(text)
            .ok_or_else(|| malformed(format!("invalid {field} time {text:?} on {date}")))?;
        if let Some(at) = local_instant(tz, date, time, field) {
            calendar.set(field, at);
        }
    }

    if date.weekday() == Weekday::Fri {
        let jumua = [
            (PrayerField::Jumua, raw.jumua.as_deref()),
            (PrayerField::Jumua2, raw.jumua2.as_deref()),
        ];
        for (field, text) in jumua {
            let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            match parse_clock(text) {
                Some(time) => {
                    if let Some(at) = local_instant(tz, date, time, field) {
                        calendar.set(field, at);
                    }
                }
                None => warn!(%field, value = text, "ignoring unreadable jumua time"),
            }
        }
    }

    if let Some(entries) = raw.day_iqama(date.month0(), date.day()) {
        for (adhan, entry) in IQAMA_ORDER.into_iter().zip(entries) {
            let Some(field) = adhan.iqama() else { continue };
            match iqama_instant(&calendar, adhan, entry, tz, date) {
                Some(at) => calendar.set(field, at),
                None if entry.trim().is_empty() => {}
                None => warn!(%field, value = %entry, "ignoring unreadable iqama entry"),
            }
        }
    } else {
        debug!(%date, "no iqama calendar for this day");
    }

    Ok(calendar)
}

/// `"+N"` is N minutes after the adhan; `"HH:MM"` is an absolute local time.
fn iqama_instant(
    calendar: &PrayerCalendar,
    adhan: PrayerField,
    entry: &str,
    tz: Tz,
    date: NaiveDate,
) -> Option<DateTime<Utc>> {
    let entry = entry.trim();
    if let Some(offset) = entry.strip_prefix('+') {
        let minutes: i64 = offset.trim().parse().ok()?;
        let adhan_at = calendar.get(adhan)?;
        return adhan_at.checked_add_signed(TimeDelta::try_minutes(minutes)?);
    }
    let field = adhan.iqama()?;
    local_instant(tz, date, parse_clock(entry)?, field)
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

/// Resolve a wall-clock time to an instant.
///
/// An ambiguous time (clocks going back) takes the earlier instant. A time
/// inside a DST gap does not exist and yields `None`.
fn local_instant(
    tz: Tz,
    date: NaiveDate,
    time: NaiveTime,
    field: PrayerField,
) -> Option<DateTime<Utc>> {
    let local = date.and_time(time);
    let resolved = tz.from_local_datetime(&local).earliest();
    if resolved.is_none() {
        warn!(%field, %local, timezone = %tz, "local time skipped by a DST change, field left empty");
    }
    resolved.map(|at| at.with_timezone(&Utc))
}

fn malformed(message: String) -> CoreError {
    CoreError::MalformedResponse { message }
}
