//! # Configuration
//!
//! Optional TOML file with driver settings.
//!
//! ```toml
//! [driver]
//! max_steps = 50000
//! ```
//!
//! Missing sections and fields fall back to their defaults. Command-line
//! flags are applied on top of whatever the file says.
//!
//! Without a `[driver]` section or `--max-steps`, `scenario` and `laws`
//! use the default step limit, while `pipe` runs unlimited: the console
//! pipeline always ends on finite input.

use duplex_core::{DriverConfig, DuplexError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest configuration file accepted (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Application settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Driver limits, if the file or a flag set any.
    pub driver: Option<DriverConfig>,
}

impl AppConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, DuplexError> {
        toml::from_str(text).map_err(|e| DuplexError::ConfigError(format!("Invalid TOML: {}", e)))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, DuplexError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            DuplexError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(DuplexError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            DuplexError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), driver = ?config.driver, "config loaded");
        Ok(config)
    }

    /// Load `path` if given, then apply command-line overrides.
    pub fn resolve(path: Option<&Path>, max_steps: Option<u64>) -> Result<Self, DuplexError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(max_steps) = max_steps {
            config.driver = Some(DriverConfig::with_max_steps(max_steps));
        }
        Ok(config)
    }

    /// Limits for `scenario` and `laws`.
    pub fn driver(&self) -> DriverConfig {
        self.driver.unwrap_or_default()
    }

    /// Limits for `pipe`: unlimited unless configured.
    pub fn pipe_driver(&self) -> DriverConfig {
        self.driver.unwrap_or(DriverConfig::unlimited())
    }
}
