//! Log entry model and its on-disk line format
//!
//! One entry renders as a single physical line:
//!
//! ```text
//! [2025-01-31 14:02:11.087] [INFO] [SmsListener] listening for 13800000000
//! ```
//!
//! An attached [`FailureDetail`] follows as extra physical lines belonging to
//! the same entry.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp layout, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown log level: {0}")]
pub struct UnknownLevel(String);

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Failure attached to an entry: a message plus a trace representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub message: String,
    pub trace: Vec<String>,
}

impl FailureDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Build from an error, walking its `source()` chain.
    ///
    /// A backtrace is appended when `RUST_BACKTRACE` enables capture.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut detail = Self::new(err.to_string());
        let mut source = err.source();
        while let Some(cause) = source {
            detail.trace.push(format!("Caused by: {cause}"));
            source = cause.source();
        }
        detail.with_backtrace(&Backtrace::capture())
    }

    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.trace.extend(
                backtrace
                    .to_string()
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
        }
        self
    }

    /// Physical lines this detail occupies in the log file
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.message.as_str()).chain(self.trace.iter().map(String::as_str))
    }
}

impl<E> From<&E> for FailureDetail
where
    E: std::error::Error + 'static,
{
    fn from(err: &E) -> Self {
        FailureDetail::from_error(err)
    }
}

/// A single log entry before rendering
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub tag: String,
    pub message: String,
    pub failure: Option<FailureDetail>,
}

impl LogEntry {
    /// Render to newline-terminated text ready to append
    pub fn render(&self) -> String {
        let mut out = format!(
            "[{}] [{}] [{}] {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.tag,
            self.message
        );
        if let Some(failure) = &self.failure {
            for line in failure.lines() {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 31, 14, 2, 11).unwrap()
            + chrono::Duration::milliseconds(87)
    }

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_render_plain_entry() {
        let entry = LogEntry {
            timestamp: fixed_time(),
            level: LogLevel::Info,
            tag: "SmsListener".to_string(),
            message: "listening".to_string(),
            failure: None,
        };
        assert_eq!(
            entry.render(),
            "[2025-01-31 14:02:11.087] [INFO] [SmsListener] listening\n"
        );
    }

    #[test]
    fn test_render_with_failure_spans_lines() {
        let entry = LogEntry {
            timestamp: fixed_time(),
            level: LogLevel::Error,
            tag: "Mail".to_string(),
            message: "send failed".to_string(),
            failure: Some(FailureDetail {
                message: "boom".to_string(),
                trace: vec!["Caused by: io".to_string()],
            }),
        };
        let rendered = entry.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[ERROR] [Mail] send failed"));
        assert_eq!(lines[1], "boom");
        assert_eq!(lines[2], "Caused by: io");
    }

    #[test]
    fn test_failure_from_error_walks_sources() {
        let err = Outer(std::io::Error::other("disk gone"));
        let detail = FailureDetail::from(&err);
        assert_eq!(detail.message, "outer failure");
        assert_eq!(detail.trace[0], "Caused by: disk gone");
    }

    #[test]
    fn test_level_parse_and_display() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("trace".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }
}
