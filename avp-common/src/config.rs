//! Dashboard configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (`--api-url`)
//! 2. Environment variables (`AVP_API_BASE_URL`, `AVP_REFRESH_DELAY_MS`, `AVP_LOG_LEVEL`)
//! 3. TOML config file (`--config <path>`, else `<config_dir>/avp/config.toml`)
//! 4. Compiled defaults
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the remaining sources apply. A malformed file passed explicitly is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the backend base URL
pub const ENV_API_BASE_URL: &str = "AVP_API_BASE_URL";
/// Environment variable overriding the post-upload refresh delay
pub const ENV_REFRESH_DELAY_MS: &str = "AVP_REFRESH_DELAY_MS";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "AVP_LOG_LEVEL";

/// Compiled default values
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const API_BASE_URL: &'static str = "http://127.0.0.1:8080";
    /// Backend processing is asynchronous; give it time before re-fetching
    pub const REFRESH_DELAY_MS: u64 = 2000;
    pub const RECENT_LIMIT: usize = crate::models::card::DEFAULT_RECENT_LIMIT;
    pub const TOP_OBJECTS_LIMIT: usize = crate::models::AnalyticsSummary::DEFAULT_TOP_OBJECTS;
    pub const LOG_LEVEL: &'static str = "info";
}

/// Contents of the TOML config file
///
/// Every field is optional; absent fields fall through to the compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub refresh_delay_ms: Option<u64>,
    #[serde(default)]
    pub recent_limit: Option<usize>,
    #[serde(default)]
    pub top_objects_limit: Option<usize>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive applying the level to the dashboard crates
    pub fn filter_directive(&self) -> String {
        format!("avp_dash={0},avp_common={0}", self.level)
    }
}

fn default_log_level() -> String {
    CompiledDefaults::LOG_LEVEL.to_string()
}

/// Fully resolved dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    /// Delay before the one-shot refresh after a successful upload
    pub refresh_delay_ms: u64,
    /// Cards in the recent-activity view
    pub recent_limit: usize,
    /// Entries in the top-objects list
    pub top_objects_limit: usize,
    pub logging: LoggingConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: CompiledDefaults::API_BASE_URL.to_string(),
            refresh_delay_ms: CompiledDefaults::REFRESH_DELAY_MS,
            recent_limit: CompiledDefaults::RECENT_LIMIT,
            top_objects_limit: CompiledDefaults::TOP_OBJECTS_LIMIT,
            logging: LoggingConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolve configuration from every source
    ///
    /// `config_path` is the explicit `--config` argument, if any.
    pub fn resolve(cli_api_url: Option<&str>, config_path: Option<&Path>) -> Result<Self> {
        let toml_config = match config_path {
            Some(path) => load_explicit(path)?,
            None => load_default_location(),
        };
        Self::from_sources(cli_api_url, toml_config)
    }

    /// Layer CLI and environment over an already loaded TOML config
    pub fn from_sources(cli_api_url: Option<&str>, toml_config: TomlConfig) -> Result<Self> {
        let mut config = Self::default();

        // Priority 3: TOML
        if let Some(url) = toml_config.api_base_url {
            config.api_base_url = url;
        }
        if let Some(ms) = toml_config.refresh_delay_ms {
            config.refresh_delay_ms = ms;
        }
        if let Some(n) = toml_config.recent_limit {
            config.recent_limit = n;
        }
        if let Some(n) = toml_config.top_objects_limit {
            config.top_objects_limit = n;
        }
        config.logging = toml_config.logging;

        // Priority 2: environment
        if let Some(url) = env_value(ENV_API_BASE_URL) {
            config.api_base_url = url;
        }
        if let Some(raw) = env_value(ENV_REFRESH_DELAY_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => config.refresh_delay_ms = ms,
                Err(_) => warn!(
                    "Invalid {} '{}', keeping {} ms",
                    ENV_REFRESH_DELAY_MS, raw, config.refresh_delay_ms
                ),
            }
        }
        if let Some(level) = env_value(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }

        // Priority 1: command line
        if let Some(url) = cli_api_url.map(str::trim).filter(|u| !u.is_empty()) {
            config.api_base_url = url.to_string();
        }

        config.api_base_url = normalize_base_url(&config.api_base_url)?;
        Ok(config)
    }

    /// Post-upload refresh delay as a `Duration`
    pub fn refresh_delay(&self) -> Duration {
        crate::time::millis_to_duration(self.refresh_delay_ms)
    }
}

/// Default config file location for the platform
///
/// `~/.config/avp/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("avp").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_toml(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Parse TOML config text
pub fn parse_toml(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

fn load_explicit(path: &Path) -> Result<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "Loaded config file");
            parse_toml(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
        }
        Err(e) => {
            warn!(
                "Config file {} not readable ({}), using defaults",
                path.display(),
                e
            );
            Ok(TomlConfig::default())
        }
    }
}

fn load_default_location() -> TomlConfig {
    let Some(path) = default_config_path() else {
        debug!("Could not determine config directory, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return TomlConfig::default();
    }

    match load_toml(&path) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded config file");
            config
        }
        Err(e) => {
            warn!("Ignoring config file: {}", e);
            TomlConfig::default()
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API base URL must start with http:// or https://, got '{}'",
            raw
        )));
    }
    Ok(url.to_string())
}
