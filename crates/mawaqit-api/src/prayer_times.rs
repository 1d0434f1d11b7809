// Prayer calendar endpoint

use tracing::debug;

use crate::auth::Token;
use crate::client::MawaqitClient;
use crate::error::Error;
use crate::models::PrayerTimes;

impl MawaqitClient {
    /// Full-year prayer and iqama calendar of a mosque.
    ///
    /// `GET /mosque/{uuid}/prayer-times`
    pub async fn fetch_calendar(
        &self,
        mosque_uuid: &str,
        token: Option<&Token>,
    ) -> Result<PrayerTimes, Error> {
        let url = self.endpoint(&["mosque", mosque_uuid, "prayer-times"])?;
        debug!(mosque = mosque_uuid, "fetching prayer calendar");
        self.authorized_get(url, &[], token).await
    }
}
