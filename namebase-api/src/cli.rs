//! Command-line arguments for namebase-api
//!
//! Every flag can also come from a `NAMEBASE_*` environment variable; the
//! flag wins when both are given.

use clap::Parser;
use namebase_common::config::{default_config_path, ConfigOverrides, ServiceConfig, TomlConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "namebase-api")]
#[command(about = "Caching name-nationality lookup service")]
#[command(version)]
pub struct Args {
    /// TOML config file (default: <config dir>/namebase/config.toml)
    #[arg(short, long, env = "NAMEBASE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Socket address to listen on, e.g. 127.0.0.1:8000
    #[arg(short, long, env = "NAMEBASE_BIND")]
    pub bind: Option<String>,

    /// SQLite database file
    #[arg(short, long = "database", env = "NAMEBASE_DATABASE")]
    pub database_path: Option<PathBuf>,

    /// Base URL of the name predictor API
    #[arg(long, env = "NAMEBASE_PREDICTOR_URL")]
    pub predictor_url: Option<String>,

    /// Base URL of the country metadata API
    #[arg(long, env = "NAMEBASE_METADATA_URL")]
    pub metadata_url: Option<String>,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "NAMEBASE_HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: Option<u64>,

    /// Hours a cached name stays fresh
    #[arg(long = "freshness-hours", env = "NAMEBASE_FRESHNESS_HOURS")]
    pub freshness_window_hours: Option<u32>,

    /// Requests per minute allowed for each client (0 disables throttling)
    #[arg(long = "rate-limit", env = "NAMEBASE_RATE_LIMIT")]
    pub rate_limit_per_minute: Option<u32>,
}

/// Where the TOML layer of the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Loaded from this file
    File(PathBuf),
    /// This file was looked for but does not exist
    Missing(PathBuf),
    /// No config location could be determined
    Defaults,
}

impl Args {
    /// CLI/env values as configuration overrides
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            database_path: self.database_path.clone(),
            predictor_url: self.predictor_url.clone(),
            metadata_url: self.metadata_url.clone(),
            http_timeout_secs: self.http_timeout_secs,
            freshness_window_hours: self.freshness_window_hours,
            rate_limit_per_minute: self.rate_limit_per_minute,
        }
    }

    /// Load the TOML file (if any) and resolve the full configuration
    ///
    /// Runs before tracing is installed, so the file outcome is handed back
    /// for the caller to log.
    pub fn load_config(&self) -> namebase_common::Result<(ServiceConfig, ConfigSource)> {
        let (toml, source) = match self.config.clone().or_else(default_config_path) {
            Some(path) => match TomlConfig::load(&path)? {
                Some(toml) => (toml, ConfigSource::File(path)),
                None => (TomlConfig::default(), ConfigSource::Missing(path)),
            },
            None => (TomlConfig::default(), ConfigSource::Defaults),
        };

        Ok((ServiceConfig::resolve(self.overrides(), toml)?, source))
    }
}
