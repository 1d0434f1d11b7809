//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use mawaqit_config::ConfigError;
use mawaqit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Mawaqit service")]
    #[diagnostic(
        code(mawaqit::connection_failed),
        help(
            "{reason}\n\
             Check your network connection, or --api-url if you changed it."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(mawaqit::timeout),
        help("Increase the timeout with --timeout, e.g. --timeout 60s.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mawaqit::auth_failed),
        help(
            "Check your username and password, or issue a new token with:\n\
             mawaqit token --save"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured")]
    #[diagnostic(
        code(mawaqit::no_credentials),
        help(
            "Set MAWAQIT_TOKEN, store a token with `mawaqit token --save`,\n\
             or set username and password in the config file."
        )
    )]
    NoCredentials,

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mawaqit::not_found),
        help("Run: mawaqit {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No mosque found near {latitude}, {longitude}")]
    #[diagnostic(
        code(mawaqit::no_mosque),
        help("Check latitude and longitude, or name a mosque with --mosque.")
    )]
    NoMosqueNearby { latitude: f64, longitude: f64 },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Unexpected response from Mawaqit: {message}")]
    #[diagnostic(
        code(mawaqit::malformed_response),
        help("The service may be changing its API; retry later.")
    )]
    MalformedResponse { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(mawaqit::api_error))]
    ApiError { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(mawaqit::validation),
        help("Fix it in the config file, or pass it as a flag. Run: mawaqit config show")
    )]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(mawaqit::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(mawaqit::keyring),
        help("Use MAWAQIT_TOKEN / MAWAQIT_PASSWORD or the config file instead.")
    )]
    Keyring { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML output failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoMosqueNearby { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BadCredentials { message } => Self::AuthFailed { message },
            CoreError::Network { message } => Self::ConnectionFailed { reason: message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::MalformedResponse { message } => Self::MalformedResponse { message },
            CoreError::MosqueNotFound { identifier } => Self::NotFound {
                resource_type: "mosque".into(),
                identifier,
                list_command: "mosques --search <name>".into(),
            },
            CoreError::NoMosqueNearby {
                latitude,
                longitude,
            } => Self::NoMosqueNearby {
                latitude,
                longitude,
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            err @ (CoreError::SyncInProgress | CoreError::Unexpected { .. }) => Self::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<mawaqit_api::Error> for CliError {
    fn from(err: mawaqit_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials => Self::NoCredentials,
            ConfigError::Keyring(message) => Self::Keyring { message },
            ConfigError::Serialization(e) => Self::Toml(e),
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
