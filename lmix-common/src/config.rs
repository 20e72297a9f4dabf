//! Configuration file model and resolution
//!
//! An optional TOML file supplies defaults for every toolkit parameter that
//! can also be given on the command line. Command-line values always win.
//!
//! Config file resolution order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. `<config_dir>/lmix/config.toml`, only if it exists
//! 4. No file: compiled defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "LMIX_CONFIG";

/// Contents of the TOML config file
///
/// Every field is optional so partial files are valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Directory holding `lmplz`, `interpolate` and `build_binary`
    pub kenlm_bins: Option<PathBuf>,
    /// Number of corpora processed concurrently
    pub jobs: Option<usize>,
    pub logging: LoggingConfig,
    pub estimate: EstimateConfig,
    pub binarize: BinarizeConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[estimate]` section, passed through to the estimation tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub order: Option<usize>,
    /// Memory budget string, e.g. `"80%"` or `"4G"`
    pub memory: Option<String>,
    /// Pipe-delimited pruning thresholds, e.g. `"0|0|1"`
    pub prune: Option<String>,
    pub discount_fallback: Option<bool>,
}

/// `[binarize]` section, passed through to the binarization tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeConfig {
    pub a_bits: Option<u8>,
    pub q_bits: Option<u8>,
    /// Data structure selector (`trie` or `probing`)
    pub structure: Option<String>,
}

/// Where the config file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in the environment; must exist
    Explicit(PathBuf),
    /// Found at the per-user default location
    Default(PathBuf),
    /// No config file
    None,
}

/// Decide which config file (if any) applies to this run
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: default location, only when present
    match default_config_path() {
        Some(path) if path.is_file() => ConfigSource::Default(path),
        _ => ConfigSource::None,
    }
}

/// Per-user default config path (`~/.config/lmix/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lmix").join("config.toml"))
}

/// Load the config file named by `source`
///
/// A missing explicit file is an error; `ConfigSource::None` yields defaults.
pub fn load_config(source: &ConfigSource) -> Result<TomlConfig> {
    let path = match source {
        ConfigSource::Explicit(path) => {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path
        }
        ConfigSource::Default(path) => path,
        ConfigSource::None => {
            debug!("No config file, using compiled defaults");
            return Ok(TomlConfig::default());
        }
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = parse_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!(config_file = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Parse TOML text into a `TomlConfig`
pub fn parse_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}
