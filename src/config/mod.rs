//! @acp:module "Configuration"
//! @acp:summary "Driver configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Driver configuration
//!
//! Optional `.gemtools.config.json` in the working directory. Every field
//! has a default, so an empty object is a valid file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::ExecutionStrategy;
use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".gemtools.config.json";

fn default_color() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level used when `--loglevel` is not given
    #[serde(default)]
    pub log_level: LogLevel,

    /// How jobs are executed
    #[serde(default)]
    pub execution: ExecutionStrategy,

    /// Colored terminal output
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            execution: ExecutionStrategy::default(),
            color: default_color(),
        }
    }
}

impl Config {
    /// Load config from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location, falling back to defaults
    ///
    /// A missing file is silent; a malformed one is reported as the error
    /// alongside the defaults so the caller can warn.
    pub fn load_or_default() -> (Self, Option<ConfigError>) {
        Self::load_from_or_default(CONFIG_FILE)
    }

    pub fn load_from_or_default<P: AsRef<Path>>(path: P) -> (Self, Option<ConfigError>) {
        if !path.as_ref().exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}
