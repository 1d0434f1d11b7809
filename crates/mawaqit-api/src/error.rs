use thiserror::Error;

/// Top-level error type for the `mawaqit-api` crate.
///
/// This is a closed set: every failure the client can produce lands in
/// exactly one variant. `mawaqit-core` maps these into retry decisions.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, token rejected, or no usable credentials.
    #[error("Bad credentials: {message}")]
    BadCredentials { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Server-side failure (HTTP 5xx) or rate limiting (HTTP 429).
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Request ─────────────────────────────────────────────────────
    /// Any other 4xx answer, e.g. an unknown mosque uuid.
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The body did not match the expected shape. Carries the raw body for debugging.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credentials (or token) were refused.
    pub fn is_bad_credentials(&self) -> bool {
        matches!(self, Self::BadCredentials { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Timeout { .. }
                | Self::Server { .. }
                | Self::MalformedResponse { .. }
        )
    }

    /// Returns `true` if the remote answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}
