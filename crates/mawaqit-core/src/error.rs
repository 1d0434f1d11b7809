// ── Core error types ──
//
// Domain errors from mawaqit-core. Consumers never see HTTP status codes
// or JSON parse failures directly: `From<mawaqit_api::Error>` translates
// them, and `CoreError::kind` folds every variant into the closed
// `FailureKind` set the sync controller decides retries on.

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Remote errors ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    BadCredentials { message: String },

    #[error("Cannot reach the Mawaqit service: {message}")]
    Network { message: String },

    #[error("Mawaqit request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Malformed response from Mawaqit: {message}")]
    MalformedResponse { message: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Mosque not found near the configured location: {identifier}")]
    MosqueNotFound { identifier: String },

    #[error("No mosque found near {latitude}, {longitude}")]
    NoMosqueNearby { latitude: f64, longitude: f64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("A sync cycle is already in flight")]
    SyncInProgress,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

/// How a failed sync attempt is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Refused credentials. Not retried until the next scheduled refresh.
    #[strum(serialize = "bad credentials")]
    BadCredentials,
    /// Unreachable service, timeout or server-side failure. Retried with backoff.
    #[strum(serialize = "network")]
    Network,
    /// Body of an unexpected shape. Retried like `Network`.
    #[strum(serialize = "malformed response")]
    MalformedResponse,
    /// Anything outside the set above. Not retried early.
    #[strum(serialize = "unexpected")]
    Unexpected,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::MalformedResponse)
    }
}

impl CoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::BadCredentials { .. } => FailureKind::BadCredentials,
            Self::Network { .. } | Self::Timeout { .. } => FailureKind::Network,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::MosqueNotFound { .. }
            | Self::NoMosqueNearby { .. }
            | Self::SyncInProgress
            | Self::Config { .. }
            | Self::Unexpected { .. } => FailureKind::Unexpected,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mawaqit_api::Error> for CoreError {
    fn from(err: mawaqit_api::Error) -> Self {
        match err {
            mawaqit_api::Error::BadCredentials { message } => Self::BadCredentials { message },
            mawaqit_api::Error::Transport(e) => Self::Network {
                message: e.to_string(),
            },
            mawaqit_api::Error::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            mawaqit_api::Error::Server { status, message } => Self::Network {
                message: format!("HTTP {status}: {message}"),
            },
            mawaqit_api::Error::MalformedResponse { message, .. } => {
                Self::MalformedResponse { message }
            }
            mawaqit_api::Error::Rejected { status, message } => Self::Unexpected {
                message: format!("request rejected with HTTP {status}: {message}"),
            },
            mawaqit_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid API URL: {e}"),
            },
            mawaqit_api::Error::Tls(message) => Self::Unexpected { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_kinds() {
        let cases = [
            (
                mawaqit_api::Error::BadCredentials {
                    message: "401".into(),
                },
                FailureKind::BadCredentials,
            ),
            (
                mawaqit_api::Error::Timeout { timeout_secs: 30 },
                FailureKind::Network,
            ),
            (
                mawaqit_api::Error::Server {
                    status: 503,
                    message: String::new(),
                },
                FailureKind::Network,
            ),
            (
                mawaqit_api::Error::MalformedResponse {
                    message: "missing field".into(),
                    body: "{}".into(),
                },
                FailureKind::MalformedResponse,
            ),
            (
                mawaqit_api::Error::Rejected {
                    status: 404,
                    message: String::new(),
                },
                FailureKind::Unexpected,
            ),
            (mawaqit_api::Error::Tls("boom".into()), FailureKind::Unexpected),
        ];

        for (api_err, kind) in cases {
            let label = api_err.to_string();
            assert_eq!(CoreError::from(api_err).kind(), kind, "{label}");
        }
    }

    #[test]
    fn only_network_and_malformed_retry() {
        assert!(FailureKind::Network.is_retryable());
        assert!(FailureKind::MalformedResponse.is_retryable());
        assert!(!FailureKind::BadCredentials.is_retryable());
        assert!(!FailureKind::Unexpected.is_retryable());
    }
}
