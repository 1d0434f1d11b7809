// Mosque search endpoint
//
// Results come back ranked by the service (nearest first) and are
// returned untouched.

use tracing::debug;

use crate::auth::Token;
use crate::client::MawaqitClient;
use crate::error::Error;
use crate::models::MosqueRecord;

impl MawaqitClient {
    /// Mosques around a point, in the order the service returns them.
    ///
    /// `GET /mosque/search?lat=..&lon=..` plus `word=..` when a non-empty
    /// `hint` (name, slug or uuid) is given.
    pub async fn lookup_mosques_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        hint: Option<&str>,
        token: Option<&Token>,
    ) -> Result<Vec<MosqueRecord>, Error> {
        let url = self.endpoint(&["mosque", "search"])?;

        let mut query = vec![("lat", latitude.to_string()), ("lon", longitude.to_string())];
        if let Some(word) = hint.map(str::trim).filter(|w| !w.is_empty()) {
            query.push(("word", word.to_owned()));
        }

        debug!(latitude, longitude, ?hint, "searching mosques");
        self.authorized_get(url, &query, token).await
    }
}
