//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use crate::models::SourceKind;
use crate::{AppError, AppResult};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub boundary: BoundaryConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9001
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Upstream dashboard backend (the data boundary)
#[derive(Debug, Deserialize, Clone)]
pub struct BoundaryConfig {
    /// Base URL the `/get/...` paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after a failed acquisition; values above 1 are clamped to 1
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Value for the `Authorization` header, if the backend requires one
    pub auth_token: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    1
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            auth_token: None,
        }
    }
}

/// Refresh cadence per data source, in seconds. `0` means on demand only.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    #[serde(default = "default_call_records_secs")]
    pub call_records_secs: u64,

    #[serde(default = "default_system_stats_secs")]
    pub system_stats_secs: u64,

    #[serde(default = "default_config_secs")]
    pub config_secs: u64,

    /// Tariffs, trunks, servers and hubs
    #[serde(default)]
    pub reference_secs: u64,
}

fn default_call_records_secs() -> u64 {
    5
}

fn default_system_stats_secs() -> u64 {
    30
}

fn default_config_secs() -> u64 {
    10
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::statistics()
    }
}

impl RefreshConfig {
    /// Cadences of the overview dashboard: records and system stats every 30s
    pub fn overview() -> Self {
        Self {
            call_records_secs: 30,
            system_stats_secs: 30,
            config_secs: default_config_secs(),
            reference_secs: 0,
        }
    }

    /// Cadences of the call statistics dashboard: records every 5s
    pub fn statistics() -> Self {
        Self {
            call_records_secs: default_call_records_secs(),
            system_stats_secs: default_system_stats_secs(),
            config_secs: default_config_secs(),
            reference_secs: 0,
        }
    }

    /// Interval between cycles for a source, `None` when it is only fetched on demand
    pub fn cadence(&self, source: SourceKind) -> Option<Duration> {
        let secs = match source {
            SourceKind::CallRecords => self.call_records_secs,
            SourceKind::SystemStats => self.system_stats_secs,
            SourceKind::Config => self.config_secs,
            SourceKind::Tariffs | SourceKind::Trunks | SourceKind::Servers | SourceKind::Hubs => {
                self.reference_secs
            }
        };

        (secs > 0).then(|| Duration::from_secs(secs))
    }
}

/// Aggregation and display settings
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// IANA timezone used to derive the hour-of-day and date of a call
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Maximum number of slices in the tariff/trunk charts
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_top_n() -> usize {
    8
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            top_n: default_top_n(),
        }
    }
}

impl AnalyticsConfig {
    /// Parse the configured timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            AppError::Config(format!("invalid analytics.timezone '{}': {}", self.timezone, e))
        })
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("boundary.base_url", default_base_url())?
            .set_default("boundary.timeout_ms", default_timeout_ms() as i64)?
            .set_default("boundary.max_retries", default_max_retries() as i64)?
            .set_default("refresh.call_records_secs", default_call_records_secs() as i64)?
            .set_default("refresh.system_stats_secs", default_system_stats_secs() as i64)?
            .set_default("refresh.config_secs", default_config_secs() as i64)?
            .set_default("refresh.reference_secs", 0)?
            .set_default("analytics.timezone", default_timezone())?
            .set_default("analytics.top_n", default_top_n() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with CALLSTATS_ prefix
            .add_source(
                Environment::with_prefix("CALLSTATS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
