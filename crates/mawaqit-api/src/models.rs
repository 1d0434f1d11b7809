// Wire types for the Mawaqit API.
//
// Field names follow the service's JSON. Optional fields default to `None`
// so an added or dropped key upstream does not break deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Response of `GET /me`.
#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    #[serde(rename = "apiAccessToken")]
    pub api_access_token: String,
}

/// One entry of `GET /mosque/search`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MosqueRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub localisation: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Distance from the search point, in metres.
    #[serde(default)]
    pub proximity: Option<f64>,
}

/// Day number (`"1"`..`"31"`) to the list of `HH:MM` strings for that day.
pub type MonthTable = BTreeMap<String, Vec<String>>;

/// Response of `GET /mosque/{uuid}/prayer-times`.
///
/// `calendar` holds twelve month tables whose day entries list six times:
/// Fajr, Shurouq, Dhuhr, Asr, Maghrib, Isha. `iqama_calendar` mirrors it
/// with five entries per day (no Shurouq), each either `"+N"` minutes after
/// the adhan or an absolute `HH:MM`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrayerTimes {
    /// IANA timezone of the mosque, when the service reports one.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub jumua: Option<String>,
    #[serde(default)]
    pub jumua2: Option<String>,
    pub calendar: Vec<MonthTable>,
    #[serde(rename = "iqamaCalendar", default)]
    pub iqama_calendar: Vec<MonthTable>,
}

impl PrayerTimes {
    /// Adhan times for a day. `month0` is zero-based, `day` one-based.
    pub fn day_times(&self, month0: u32, day: u32) -> Option<&[String]> {
        self.calendar
            .get(usize::try_from(month0).ok()?)?
            .get(&day.to_string())
            .map(Vec::as_slice)
    }

    /// Iqama entries for a day, same indexing as [`day_times`](Self::day_times).
    pub fn day_iqama(&self, month0: u32, day: u32) -> Option<&[String]> {
        self.iqama_calendar
            .get(usize::try_from(month0).ok()?)?
            .get(&day.to_string())
            .map(Vec::as_slice)
    }
}
