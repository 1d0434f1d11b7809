// ── Prayer data sources ──
//
// The sync controller talks to the remote service through `PrayerSource`,
// so tests can drive it with a scripted source.

use std::future::Future;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use mawaqit_api::MawaqitClient;

use crate::convert;
use crate::error::CoreError;
use crate::model::{MosqueIdentity, PrayerCalendar};

/// Where the sync controller gets mosques and calendars from.
pub trait PrayerSource: Send + Sync + 'static {
    /// Mosques around a point, nearest first.
    fn lookup_mosques(
        &self,
        latitude: f64,
        longitude: f64,
        hint: Option<&str>,
    ) -> impl Future<Output = Result<Vec<MosqueIdentity>, CoreError>> + Send;

    /// The mosque's calendar for the day containing `now`.
    fn fetch_calendar(
        &self,
        mosque: &MosqueIdentity,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<PrayerCalendar, CoreError>> + Send;
}

/// [`PrayerSource`] backed by the Mawaqit API.
pub struct MawaqitSource {
    client: MawaqitClient,
    fallback_tz: Tz,
}

impl MawaqitSource {
    /// `fallback_tz` applies when the service reports no usable mosque timezone.
    pub fn new(client: MawaqitClient, fallback_tz: Tz) -> Self {
        Self {
            client,
            fallback_tz,
        }
    }

    pub fn client(&self) -> &MawaqitClient {
        &self.client
    }
}

impl PrayerSource for MawaqitSource {
    async fn lookup_mosques(
        &self,
        latitude: f64,
        longitude: f64,
        hint: Option<&str>,
    ) -> Result<Vec<MosqueIdentity>, CoreError> {
        let records = self
            .client
            .lookup_mosques_nearby(latitude, longitude, hint, None)
            .await?;
        Ok(records.into_iter().map(MosqueIdentity::from).collect())
    }

    async fn fetch_calendar(
        &self,
        mosque: &MosqueIdentity,
        now: DateTime<Utc>,
    ) -> Result<PrayerCalendar, CoreError> {
        let raw = self.client.fetch_calendar(&mosque.uuid, None).await?;
        convert::calendar_for_day(&raw, now, self.fallback_tz)
    }
}
