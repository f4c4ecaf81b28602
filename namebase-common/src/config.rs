//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together in [`ConfigOverrides`]
//! (clap already applies CLI-over-env precedence). The resolved
//! [`ServiceConfig`] is passed explicitly to every component that needs it.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_PREDICTOR_URL: &str = "https://api.nationalize.io/";
pub const DEFAULT_METADATA_URL: &str = "https://restcountries.com/v3.1/alpha";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FRESHNESS_WINDOW_HOURS: u32 = 24;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Bootstrap configuration loaded from TOML file
///
/// All keys are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Socket address the HTTP server binds to
    #[serde(default)]
    pub bind: Option<String>,

    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Hours a cached name stays fresh
    #[serde(default)]
    pub freshness_window_hours: Option<u32>,

    /// Requests each client may make per minute (0 disables throttling)
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,

    /// Third-party API endpoints
    #[serde(default)]
    pub upstream: UpstreamToml,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[upstream]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamToml {
    #[serde(default)]
    pub predictor_url: Option<String>,
    #[serde(default)]
    pub metadata_url: Option<String>,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Separate file receiving ERROR events only
    #[serde(default)]
    pub error_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            error_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load TOML config from `path`
    ///
    /// Returns `Ok(None)` when the file does not exist; the caller decides how
    /// to report that once logging is up. A file that exists but does not
    /// parse is a configuration error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub database_path: Option<PathBuf>,
    pub predictor_url: Option<String>,
    pub metadata_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub freshness_window_hours: Option<u32>,
    pub rate_limit_per_minute: Option<u32>,
}

/// Endpoints and limits for the third-party APIs
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Base URL of the name predictor; `?name=` is appended per request
    pub predictor_url: String,
    /// Base URL of the country metadata service; `/<code>` is appended
    pub metadata_url: String,
    /// Per-request timeout applied to both clients
    pub timeout: Duration,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub database_path: PathBuf,
    pub upstream: UpstreamConfig,
    pub freshness_window_hours: u32,
    /// Per-client request quota; 0 turns throttling off
    pub rate_limit_per_minute: u32,
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_path: default_database_path(),
            upstream: UpstreamConfig {
                predictor_url: DEFAULT_PREDICTOR_URL.to_string(),
                metadata_url: DEFAULT_METADATA_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            },
            freshness_window_hours: DEFAULT_FRESHNESS_WINDOW_HOURS,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Result<Self> {
        let bind_str = overrides
            .bind
            .or(toml.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind_str, e)))?;

        let database_path = overrides
            .database_path
            .or(toml.database_path)
            .unwrap_or_else(default_database_path);

        let predictor_url = overrides
            .predictor_url
            .or(toml.upstream.predictor_url)
            .unwrap_or_else(|| DEFAULT_PREDICTOR_URL.to_string());
        let metadata_url = overrides
            .metadata_url
            .or(toml.upstream.metadata_url)
            .unwrap_or_else(|| DEFAULT_METADATA_URL.to_string());
        validate_url("predictor_url", &predictor_url)?;
        validate_url("metadata_url", &metadata_url)?;

        let timeout_secs = overrides
            .http_timeout_secs
            .or(toml.upstream.http_timeout_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "http_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let freshness_window_hours = overrides
            .freshness_window_hours
            .or(toml.freshness_window_hours)
            .unwrap_or(DEFAULT_FRESHNESS_WINDOW_HOURS);

        let rate_limit_per_minute = overrides
            .rate_limit_per_minute
            .or(toml.rate_limit_per_minute)
            .unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE);

        Ok(Self {
            bind,
            database_path,
            upstream: UpstreamConfig {
                predictor_url,
                metadata_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            freshness_window_hours,
            rate_limit_per_minute,
            logging: toml.logging,
        })
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("{} is not a valid URL '{}': {}", key, value, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        "http" | "https" => Err(Error::Config(format!("{} has no host: '{}'", key, value))),
        scheme => Err(Error::Config(format!(
            "{} must be an http(s) URL, got scheme '{}'",
            key, scheme
        ))),
    }
}

/// Default config file location: `<config dir>/namebase/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("namebase").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("namebase"))
        .unwrap_or_else(|| PathBuf::from("./namebase_data"))
        .join("namebase.db")
}
