use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// The first instant after `now` at which the wall clock in `tz` reads `at`.
///
/// Days where `at` falls in a DST gap are skipped. An ambiguous `at` fires
/// at its earlier occurrence.
pub fn next_refresh_after(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    (0..=2)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter_map(|date| tz.from_local_datetime(&date.and_time(at)).earliest())
        .map(|local| local.with_timezone(&Utc))
        .find(|candidate| *candidate > now)
        .unwrap_or_else(|| now + TimeDelta::days(1))
}

/// How long to sleep from `now` until [`next_refresh_after`].
pub fn until_next_refresh(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> Duration {
    (next_refresh_after(now, at, tz) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn one_am() -> NaiveTime {
        NaiveTime::from_hms_opt(1, 0, 0).unwrap()
    }

    #[test]
    fn later_today_or_tomorrow() {
        assert_eq!(
            next_refresh_after(utc("2024-06-10T00:30:00Z"), one_am(), Tz::UTC),
            utc("2024-06-10T01:00:00Z")
        );
        assert_eq!(
            next_refresh_after(utc("2024-06-10T01:00:00Z"), one_am(), Tz::UTC),
            utc("2024-06-11T01:00:00Z")
        );
    }

    #[test]
    fn reads_the_local_clock() {
        // 01:00 in Paris (UTC+2 in June) is 23:00 UTC the day before.
        let paris = chrono_tz::Europe::Paris;
        assert_eq!(
            next_refresh_after(utc("2024-06-10T12:00:00Z"), one_am(), paris),
            utc("2024-06-10T23:00:00Z")
        );
    }

    #[test]
    fn skips_a_dst_gap() {
        let paris = chrono_tz::Europe::Paris;
        let two_thirty = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        // 02:30 does not exist in Paris on 2024-03-31.
        assert_eq!(
            next_refresh_after(utc("2024-03-30T12:00:00Z"), two_thirty, paris),
            utc("2024-04-01T00:30:00Z")
        );
    }

    #[test]
    fn sleep_duration() {
        let wait = until_next_refresh(utc("2024-06-10T00:59:00Z"), one_am(), Tz::UTC);
        assert_eq!(wait, Duration::from_secs(60));
    }
}
