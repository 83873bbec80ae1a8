//! Configuration loading and config file resolution
//!
//! Configuration is optional. Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`GROUPWISE_CONFIG`)
//! 3. Per-user config file (`<config dir>/groupwise/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A file that is missing or unreadable degrades to compiled defaults with a
//! warning. A file that exists but does not parse or validate is an error.

use crate::partition::{validate_balance_weight, DEFAULT_BALANCE_WEIGHT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GROUPWISE_CONFIG";

/// Environment variable overriding the HTTP bind address
pub const BIND_ENV_VAR: &str = "GROUPWISE_BIND";

/// Complete configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub grouping: GroupingDefaults,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Engine defaults applied when a request leaves a value out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingDefaults {
    /// Target group size
    #[serde(default = "default_group_size")]
    pub group_size: usize,

    /// Discount for candidates deepening a category majority, in `[0, 1]`
    #[serde(default = "default_balance_weight")]
    pub balance_weight: f64,
}

impl Default for GroupingDefaults {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            balance_weight: default_balance_weight(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// HTTP service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (host:port)
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_group_size() -> usize {
    4
}

fn default_balance_weight() -> f64 {
    DEFAULT_BALANCE_WEIGHT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:5740".to_string()
}

impl TomlConfig {
    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.grouping.group_size < 1 {
            return Err(Error::Config(
                "grouping.group_size must be at least 1".to_string(),
            ));
        }
        validate_balance_weight(self.grouping.balance_weight)
            .map_err(|_| Error::Config(format!(
                "grouping.balance_weight must lie in [0, 1], got {}",
                self.grouping.balance_weight
            )))?;
        Ok(())
    }

    /// Apply `GROUPWISE_BIND` if set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var(BIND_ENV_VAR) {
            if !bind.trim().is_empty() {
                info!("Bind address from {}: {}", BIND_ENV_VAR, bind);
                self.server.bind = bind;
            }
        }
    }
}

/// Locate the config file to use, if any
///
/// Returns `None` when neither an explicit path nor a per-user file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file
    user_config_path().filter(|path| path.exists())
}

/// `<config dir>/groupwise/config.toml` for the current platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("groupwise").join("config.toml"))
}

/// Load configuration with graceful degradation
///
/// Missing files fall back to compiled defaults; malformed files are errors.
/// Environment overrides are applied last.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let mut config = match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => match TomlConfig::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(Error::Io(e)) => {
                warn!(
                    "Config file {} unreadable ({}), using compiled defaults",
                    path.display(),
                    e
                );
                TomlConfig::default()
            }
            Err(e) => return Err(e),
        },
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            TomlConfig::default()
        }
        None => TomlConfig::default(),
    };

    config.apply_env_overrides();
    Ok(config)
}
