//! Application configuration
//!
//! ## Resolution
//!
//! 1. An explicit path (`--config` or `KHARCHA_CONFIG`)
//! 2. The user override (`~/.config/kharcha/config.toml` on Linux)
//! 3. Embedded defaults compiled into the binary
//!
//! Every key is optional. Missing sections and fields keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::intent::DEFAULT_TOP_N;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/kharcha.toml");

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "KHARCHA_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub query: QueryConfig,
    pub classifier: ClassifierConfig,
    pub server: ServerSettings,
}

/// Chat answer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_top_n: usize,
    pub list_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
            list_limit: 10,
        }
    }
}

/// Fallback categorization during import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub enabled: bool,
    pub min_training_examples: usize,
    pub max_features: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_training_examples: 10,
            max_features: 1000,
        }
    }
}

/// HTTP server knobs that belong in the config file
///
/// Secrets (API keys, database passphrase) come from the environment instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration, preferring `path`, then `KHARCHA_CONFIG`, then the
    /// user override, then embedded defaults
    ///
    /// An explicit path that doesn't exist is an error; a missing user override
    /// is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            return Self::from_file(&path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Load a specific config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::parse(&content)
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.query.default_top_n == 0 {
            return Err(Error::Config("query.default_top_n must be at least 1".into()));
        }
        if self.query.list_limit == 0 {
            return Err(Error::Config("query.list_limit must be at least 1".into()));
        }
        if self.classifier.max_features == 0 {
            return Err(Error::Config("classifier.max_features must be at least 1".into()));
        }
        Ok(())
    }
}

/// Path of the user override file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kharcha").join("config.toml"))
}
