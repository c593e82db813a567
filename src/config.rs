//! Service configuration.
//!
//! Configuration is loaded from:
//! 1. a `scangen.toml` file (base configuration)
//! 2. environment variables (prefixed with `SCANGEN_`)
//!
//! Every field has a default, so a missing file yields a working
//! configuration.
//!
//! # Example
//! ```no_run
//! use scangen::config::ServiceConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::load()?;
//! println!("log level: {}", config.log_level);
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory scanned for YAML generator descriptors; `None` disables
    /// discovery
    #[serde(default)]
    pub descriptor_dir: Option<PathBuf>,
    /// Whether a broken descriptor file fails registry construction instead
    /// of being skipped
    #[serde(default)]
    pub strict_discovery: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            descriptor_dir: None,
            strict_discovery: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from scangen.toml and environment variables
    ///
    /// Environment variables can override configuration with prefix SCANGEN_
    /// Example: SCANGEN_LOG_LEVEL=debug
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("scangen.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SCANGEN_"))
            .extract()
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}
