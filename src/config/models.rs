use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logstore::DEFAULT_MAX_LINES;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Rolling log settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Backing file; created on first write
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
    /// Line cap that triggers oldest-half eviction
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            max_lines: default_max_lines(),
        }
    }
}

fn default_log_path() -> PathBuf {
    PathBuf::from("data/app_log.txt")
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

/// Capture session settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Sender to watch for; may be overridden on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}
