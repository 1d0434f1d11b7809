// Mawaqit API HTTP client
//
// Wraps `reqwest` with URL construction, token resolution and status
// mapping. Endpoint methods are implemented as inherent methods in
// `mosques.rs` and `prayer_times.rs` to keep this module focused on
// transport mechanics.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{Credentials, Token};
use crate::error::Error;
use crate::models::MeResponse;
use crate::transport::TransportConfig;

const TOKEN_HEADER: &str = "Api-Access-Token";
const PREVIEW_CHARS: usize = 200;

/// Client for the Mawaqit API.
///
/// Holds the credentials and the transport settings, not a connection:
/// each request builds its own `reqwest::Client` and drops it on return,
/// whatever the outcome.
pub struct MawaqitClient {
    base_url: Url,
    credentials: Option<Credentials>,
    transport: TransportConfig,
    /// Token issued from a login. Discarded when the service rejects it.
    issued_token: RwLock<Option<Token>>,
}

impl MawaqitClient {
    /// `base_url` is the API root, e.g. `https://mawaqit.net/api/2.0`.
    pub fn new(base_url: Url, credentials: Option<Credentials>, transport: TransportConfig) -> Self {
        Self {
            base_url,
            credentials,
            transport,
            issued_token: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout
    }

    // ── Token resolution ─────────────────────────────────────────────

    /// Exchange a username/password for an API token.
    ///
    /// `GET /me` with HTTP basic auth. A 401/403 answer is
    /// [`Error::BadCredentials`]; no retry happens here.
    pub async fn issue_token(&self, username: &str, password: &SecretString) -> Result<Token, Error> {
        let url = self.endpoint(&["me"])?;
        debug!("requesting API token at {}", url);

        let http = self.transport.build_client()?;
        let resp = http
            .get(url)
            .basic_auth(username, Some(password.expose_secret()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let me: MeResponse = self.parse_json(resp).await?;
        if me.api_access_token.trim().is_empty() {
            return Err(Error::MalformedResponse {
                message: "empty apiAccessToken".into(),
                body: String::new(),
            });
        }

        debug!("API token issued");
        Ok(Token::new(me.api_access_token))
    }

    /// Return a usable token.
    ///
    /// A configured token is returned as-is. With a login, the previously
    /// issued token is reused, or a new one is issued.
    pub async fn resolve_token(&self) -> Result<Token, Error> {
        match &self.credentials {
            Some(Credentials::Token(token)) if !token.is_placeholder() => Ok(token.clone()),
            Some(Credentials::Token(_)) => Err(Error::BadCredentials {
                message: "configured token is unset".into(),
            }),
            Some(Credentials::Login { username, password }) => {
                if let Some(token) = self.cached_token() {
                    return Ok(token);
                }
                let token = self.issue_token(username, password).await?;
                *self
                    .issued_token
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
                Ok(token)
            }
            None => Err(Error::BadCredentials {
                message: "no token or username/password configured".into(),
            }),
        }
    }

    /// Drop the issued token so the next request logs in again.
    pub fn forget_issued_token(&self) {
        trace!("discarding issued token");
        *self
            .issued_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn cached_token(&self) -> Option<Token> {
        self.issued_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the API root. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET with a token header.
    ///
    /// An explicit `token` is used as-is. Otherwise one is resolved; if a
    /// previously issued token is rejected it is re-issued and the request
    /// repeated once.
    pub(crate) async fn authorized_get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        token: Option<&Token>,
    ) -> Result<T, Error> {
        if let Some(token) = token {
            return self.get_with_token(url, query, token).await;
        }

        let was_cached = self.cached_token().is_some();
        let token = self.resolve_token().await?;
        match self.get_with_token(url.clone(), query, &token).await {
            Err(Error::BadCredentials { .. }) if was_cached => {
                debug!("issued token rejected, requesting a fresh one");
                self.forget_issued_token();
                let token = self.resolve_token().await?;
                self.get_with_token(url, query, &token).await
            }
            other => other,
        }
    }

    async fn get_with_token<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        token: &Token,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let http = self.transport.build_client()?;
        let resp = http
            .get(url)
            .query(query)
            .header(TOKEN_HEADER, token.expose())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.parse_json(resp).await
    }

    /// Map the status code, then decode the JSON body.
    async fn parse_json<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::BadCredentials {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Server {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.transport.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}
