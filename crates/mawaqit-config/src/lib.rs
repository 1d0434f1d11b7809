//! Shared configuration for the Mawaqit sync tools.
//!
//! A flat TOML file layered under `MAWAQIT_*` environment variables,
//! credential resolution (env + keyring + plaintext), and translation to
//! `mawaqit_core::SyncConfig` plus a ready-to-run controller. The CLI
//! applies its flag overrides on top of [`Config`] before building.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use mawaqit_api::{Credentials, DEFAULT_BASE_URL, MawaqitClient, Token, TransportConfig};
use mawaqit_core::{MawaqitSource, MawaqitSync, SyncConfig, SyncController};

/// Prefix of the environment variables layered over the file.
pub const ENV_PREFIX: &str = "MAWAQIT_";
pub const TOKEN_ENV: &str = "MAWAQIT_TOKEN";
pub const PASSWORD_ENV: &str = "MAWAQIT_PASSWORD";
/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "mawaqit";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured: set a token, or a username and password")]
    NoCredentials,

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
///
/// Durations are humantime strings (`"10m"`, `"1h 30m"`); `refresh_at`
/// is a local `HH:MM`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Mosque uuid or slug. Unset means the nearest mosque.
    pub mosque: Option<String>,

    /// IANA zone for calendars without one, and for the daily refresh
    /// until a calendar is cached (the mosque clock wins after that).
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_refresh_at")]
    pub refresh_at: String,

    #[serde(default = "default_preparation_lead")]
    pub preparation_lead: String,

    #[serde(default = "default_retry_base")]
    pub retry_base: String,

    #[serde(default = "default_retry_max")]
    pub retry_max: String,

    /// Per-call timeout.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `MAWAQIT_PASSWORD`.
    pub password: Option<String>,

    /// Plaintext API token. Prefer the keyring or `MAWAQIT_TOKEN`.
    pub token: Option<String>,

    /// Display defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            mosque: None,
            timezone: default_timezone(),
            refresh_at: default_refresh_at(),
            preparation_lead: default_preparation_lead(),
            retry_base: default_retry_base(),
            retry_max: default_retry_max(),
            timeout: default_timeout(),
            api_url: default_api_url(),
            username: None,
            password: None,
            token: None,
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".into()
}
fn default_refresh_at() -> String {
    "01:00".into()
}
fn default_preparation_lead() -> String {
    "10m".into()
}
fn default_retry_base() -> String {
    "1m".into()
}
fn default_retry_max() -> String {
    "1h".into()
}
fn default_timeout() -> String {
    "30s".into()
}
fn default_api_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Validated accessors ─────────────────────────────────────────────

impl Config {
    /// `(latitude, longitude)`, both required and in range.
    pub fn location(&self) -> Result<(f64, f64), ConfigError> {
        let latitude = self
            .latitude
            .ok_or_else(|| invalid("latitude", "not set"))?;
        let longitude = self
            .longitude
            .ok_or_else(|| invalid("longitude", "not set"))?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude", format!("{latitude} is outside -90..=90")));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid(
                "longitude",
                format!("{longitude} is outside -180..=180"),
            ));
        }
        Ok((latitude, longitude))
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .trim()
            .parse()
            .map_err(|_| invalid("timezone", format!("unknown IANA zone '{}'", self.timezone)))
    }

    pub fn refresh_at(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.refresh_at.trim(), "%H:%M")
            .map_err(|_| invalid("refresh_at", format!("expected HH:MM, got '{}'", self.refresh_at)))
    }

    pub fn call_timeout(&self) -> Result<Duration, ConfigError> {
        let timeout = parse_duration("timeout", &self.timeout)?;
        if timeout.is_zero() {
            return Err(invalid("timeout", "must be greater than zero"));
        }
        Ok(timeout)
    }

    pub fn api_url(&self) -> Result<Url, ConfigError> {
        self.api_url
            .parse()
            .map_err(|e| invalid("api_url", format!("{e}: {}", self.api_url)))
    }

    /// Translate into the controller's settings, validating every field.
    pub fn to_sync_config(&self) -> Result<SyncConfig, ConfigError> {
        let (latitude, longitude) = self.location()?;
        let retry_base = parse_duration("retry_base", &self.retry_base)?;
        let retry_max = parse_duration("retry_max", &self.retry_max)?;
        if retry_base.is_zero() {
            return Err(invalid("retry_base", "must be greater than zero"));
        }
        if retry_base > retry_max {
            return Err(invalid(
                "retry_base",
                format!("{} exceeds retry_max {}", self.retry_base, self.retry_max),
            ));
        }

        Ok(SyncConfig {
            latitude,
            longitude,
            mosque: self
                .mosque
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned),
            timezone: self.timezone()?,
            refresh_at: self.refresh_at()?,
            refresh_on_startup: true,
            preparation_lead: parse_duration("preparation_lead", &self.preparation_lead)?,
            retry_base,
            retry_max,
            call_timeout: self.call_timeout()?,
        })
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED.to_owned());
        Self {
            password: mask(&self.password),
            token: mask(&self.token),
            ..self.clone()
        }
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim())
        .map_err(|e| invalid(field, format!("'{value}' is not a duration ({e})")))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "mawaqit", "mawaqit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mawaqit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Secrets kept in the system keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Token,
    Password,
}

impl SecretKind {
    pub fn account(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Password => "password",
        }
    }
}

fn keyring_secret(kind: SecretKind) -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, kind.account()).ok()?;
    match entry.get_password() {
        Ok(secret) => Some(secret),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            debug!(error = %e, account = kind.account(), "keyring lookup failed");
            None
        }
    }
}

/// Save a secret to the system keyring.
pub fn store_secret(kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, kind.account())
        .and_then(|entry| entry.set_password(value))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

fn usable_token(raw: String) -> Option<Token> {
    Some(Token::new(raw)).filter(|t| !t.is_placeholder())
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// API token: `MAWAQIT_TOKEN` → keyring → plaintext. Placeholders are skipped.
    pub fn resolve_token(&self) -> Option<Token> {
        if let Some(token) = env_secret(TOKEN_ENV).and_then(usable_token) {
            debug!("using API token from {TOKEN_ENV}");
            return Some(token);
        }
        if let Some(token) = keyring_secret(SecretKind::Token).and_then(usable_token) {
            debug!("using API token from keyring");
            return Some(token);
        }
        self.token.clone().and_then(usable_token)
    }

    /// Password: `MAWAQIT_PASSWORD` → keyring → plaintext.
    pub fn resolve_password(&self) -> Option<SecretString> {
        env_secret(PASSWORD_ENV)
            .or_else(|| keyring_secret(SecretKind::Password))
            .or_else(|| self.password.clone().filter(|p| !p.is_empty()))
            .map(SecretString::from)
    }

    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// A usable token wins over a login.
    pub fn resolve_credentials(&self) -> Result<Credentials, ConfigError> {
        let token = self.resolve_token();
        let username = self.username().map(str::to_owned);
        // Only consult the password chain when it can matter.
        let password = if token.is_none() && username.is_some() {
            self.resolve_password()
        } else {
            None
        };
        Credentials::from_parts(username, password, token).ok_or(ConfigError::NoCredentials)
    }

    // ── Builders ────────────────────────────────────────────────────

    pub fn transport(&self) -> Result<TransportConfig, ConfigError> {
        Ok(TransportConfig::default().with_timeout(self.call_timeout()?))
    }

    /// A client with the given credentials (or none, for `issue_token`).
    pub fn build_client(
        &self,
        credentials: Option<Credentials>,
    ) -> Result<MawaqitClient, ConfigError> {
        Ok(MawaqitClient::new(
            self.api_url()?,
            credentials,
            self.transport()?,
        ))
    }

    /// The sync controller wired to the Mawaqit API with resolved credentials.
    pub fn build_sync(&self) -> Result<MawaqitSync, ConfigError> {
        let sync_config = self.to_sync_config()?;
        let client = self.build_client(Some(self.resolve_credentials()?))?;
        let source = MawaqitSource::new(client, sync_config.timezone);
        Ok(SyncController::new(sync_config, source))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn paris() -> Config {
        Config {
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            timezone: "Europe/Paris".into(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_translate() {
        let sync = paris().to_sync_config().unwrap();
        assert_eq!(sync.timezone, chrono_tz::Europe::Paris);
        assert_eq!(sync.refresh_at, NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(sync.preparation_lead, Duration::from_secs(600));
        assert_eq!(sync.retry_base, Duration::from_secs(60));
        assert_eq!(sync.retry_max, Duration::from_secs(3600));
        assert_eq!(sync.call_timeout, Duration::from_secs(30));
        assert_eq!(sync.mosque, None);
    }

    #[test]
    fn blank_mosque_means_nearest() {
        let cfg = Config {
            mosque: Some("  ".into()),
            ..paris()
        };
        assert_eq!(cfg.to_sync_config().unwrap().mosque, None);
    }

    #[test]
    fn rejects_invalid_fields() {
        let cases = [
            ("latitude", Config { latitude: Some(91.0), ..paris() }),
            ("longitude", Config { longitude: Some(-180.5), ..paris() }),
            ("latitude", Config { latitude: None, ..paris() }),
            ("timezone", Config { timezone: "Europe/Atlantis".into(), ..paris() }),
            ("refresh_at", Config { refresh_at: "25:00".into(), ..paris() }),
            ("preparation_lead", Config { preparation_lead: "soon".into(), ..paris() }),
            ("retry_base", Config { retry_base: "2h".into(), ..paris() }),
            ("timeout", Config { timeout: "0s".into(), ..paris() }),
        ];

        for (field, cfg) in cases {
            match cfg.to_sync_config() {
                Err(ConfigError::Validation { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected {field} validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn redacts_secrets() {
        let cfg = Config {
            password: Some("hunter2".into()),
            token: Some("tok-123".into()),
            ..paris()
        };
        let shown = toml::to_string(&cfg.redacted()).unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("tok-123"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn placeholder_tokens_are_not_usable() {
        assert!(usable_token("unset".into()).is_none());
        assert!(usable_token("   ".into()).is_none());
        assert_eq!(usable_token("abc".into()).unwrap().expose(), "abc");
    }

    #[test]
    fn loads_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
latitude = 21.4225
longitude = 39.8262
mosque = "masjid-al-haram"
timezone = "Asia/Riyadh"
refresh_at = "02:30"
retry_max = "30m"

[defaults]
output = "json"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.mosque.as_deref(), Some("masjid-al-haram"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.api_url, DEFAULT_BASE_URL);

        let sync = cfg.to_sync_config().unwrap();
        assert_eq!(sync.refresh_at, NaiveTime::from_hms_opt(2, 30, 0).unwrap());
        assert_eq!(sync.retry_max, Duration::from_secs(1800));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.refresh_at, "01:00");
        assert!(matches!(
            cfg.to_sync_config(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            username: Some("user@example.com".into()),
            ..paris()
        };
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.latitude, cfg.latitude);
        assert_eq!(loaded.username(), Some("user@example.com"));
        assert_eq!(loaded.timezone, "Europe/Paris");
    }

    #[test]
    fn plaintext_token_builds_token_credentials() {
        let cfg = Config {
            token: Some("abc".into()),
            username: Some("user".into()),
            password: Some("pw".into()),
            ..paris()
        };
        // Environment or keyring may hold a different token, but a token wins either way.
        assert!(matches!(
            cfg.resolve_credentials(),
            Ok(Credentials::Token(_))
        ));
    }

    #[test]
    fn api_url_must_parse() {
        let cfg = Config {
            api_url: "not a url".into(),
            ..paris()
        };
        assert!(matches!(
            cfg.build_client(None),
            Err(ConfigError::Validation { .. })
        ));
    }
}
