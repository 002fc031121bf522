//! Configuration management for smswatch
//!
//! Settings are layered, lowest priority first:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use smswatch::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Rolling log at: {}", config.log.path.display());
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `SMSWATCH__<section>__<key>`:
//! - `SMSWATCH__LOG__PATH=/data/app_log.txt`
//! - `SMSWATCH__LOG__MAX_LINES=5000`
//! - `SMSWATCH__CAPTURE__TARGET=13800000000`
//!
//! # Configuration File
//!
//! By default the file is `config/smswatch.toml`; `SMSWATCH_CONFIG` or an
//! explicit path overrides it.

mod models;
mod sources;
mod validation;

pub use models::{CaptureConfig, Config, LogConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// `path` overrides the config file location when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, skipping `.env`
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
