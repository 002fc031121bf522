use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::LogConfig;
use crate::observability::Metrics;

use super::diagnostics::{DiagnosticSink, TracingDiagnostics};
use super::entry::{FailureDetail, LogEntry, LogLevel};
use super::error::{LogStoreError, Result};
use super::rotation::{count_lines, lines_to_keep, needs_rotation, retain_newest_half};

/// Returned by [`RollingLogStore::content`] when nothing has been logged yet
pub const NO_ENTRIES: &str = "No log entries yet";

/// Size and line accounting for the rolling log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogStats {
    pub size_bytes: u64,
    pub line_count: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    /// Cached physical line count; `None` until read or after a failure
    line_count: Option<usize>,
    last_timestamp: Option<DateTime<Local>>,
}

impl StoreState {
    fn next_timestamp(&mut self, now: DateTime<Local>) -> DateTime<Local> {
        let ts = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// File-backed, line-bounded log with oldest-half eviction.
///
/// Every public method is infallible from the caller's point of view: I/O
/// failures go to the configured [`DiagnosticSink`] and degrade to a no-op or
/// an empty value. Mutations and measurements serialize on one lock.
pub struct RollingLogStore {
    path: PathBuf,
    max_lines: usize,
    state: Mutex<StoreState>,
    diagnostics: Arc<dyn DiagnosticSink>,
    metrics: Arc<Metrics>,
}

impl RollingLogStore {
    /// Create a store for `path`. Nothing touches the disk until the first append.
    pub fn new(path: impl Into<PathBuf>, max_lines: usize) -> Self {
        Self {
            path: path.into(),
            max_lines,
            state: Mutex::new(StoreState::default()),
            diagnostics: Arc::new(TracingDiagnostics),
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.path.clone(), config.max_lines)
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn info(&self, tag: &str, message: &str) {
        self.append(LogLevel::Info, tag, message, None);
    }

    pub fn warn(&self, tag: &str, message: &str) {
        self.append(LogLevel::Warn, tag, message, None);
    }

    pub fn debug(&self, tag: &str, message: &str) {
        self.append(LogLevel::Debug, tag, message, None);
    }

    pub fn error(&self, tag: &str, message: &str, failure: Option<FailureDetail>) {
        self.append(LogLevel::Error, tag, message, failure);
    }

    /// Append one entry, rotating first if the line cap would be exceeded
    pub fn append(&self, level: LogLevel, tag: &str, message: &str, failure: Option<FailureDetail>) {
        let state = self.state.lock();
        self.append_locked(state, level, tag, message, failure);
    }

    /// Like [`append`](Self::append) but gives up after `wait` if the lock is held.
    ///
    /// Used from the panic hook, where the panicking thread may already own the lock.
    pub(crate) fn try_append_for(
        &self,
        wait: Duration,
        level: LogLevel,
        tag: &str,
        message: &str,
        failure: Option<FailureDetail>,
    ) -> bool {
        match self.state.try_lock_for(wait) {
            Some(state) => {
                self.append_locked(state, level, tag, message, failure);
                true
            }
            None => false,
        }
    }

    fn append_locked(
        &self,
        mut state: MutexGuard<'_, StoreState>,
        level: LogLevel,
        tag: &str,
        message: &str,
        failure: Option<FailureDetail>,
    ) {
        mirror(level, tag, message, failure.as_ref());

        let entry = LogEntry {
            timestamp: state.next_timestamp(Local::now()),
            level,
            tag: tag.to_string(),
            message: message.to_string(),
            failure,
        };

        match self.write_entry(&mut state, &entry.render()) {
            Ok(()) => self.metrics.entry_appended(),
            Err(err) => {
                state.line_count = None;
                self.metrics.log_failed();
                self.diagnostics.report("append", &err);
            }
        }
    }

    fn write_entry(&self, state: &mut StoreState, rendered: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LogStoreError::io(parent, e))?;
        }

        let incoming = count_lines(rendered);
        let count = self.rotate_locked(state, incoming)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogStoreError::io(&self.path, e))?;
        file.write_all(rendered.as_bytes())
            .map_err(|e| LogStoreError::io(&self.path, e))?;

        state.line_count = Some(count + incoming);
        Ok(())
    }

    /// Evict the oldest half of the log if the next single-line append would
    /// exceed the cap. Appends already do this before writing.
    pub fn rotate_if_needed(&self) {
        let mut state = self.state.lock();
        if let Err(err) = self.rotate_locked(&mut state, 1) {
            state.line_count = None;
            self.metrics.log_failed();
            self.diagnostics.report("rotate", &err);
        }
    }

    /// Returns the line count after any rotation
    fn rotate_locked(&self, state: &mut StoreState, incoming: usize) -> Result<usize> {
        let count = match state.line_count {
            Some(count) => count,
            None => {
                let count = self.read_line_count()?;
                state.line_count = Some(count);
                count
            }
        };

        if !needs_rotation(count, incoming, self.max_lines) {
            return Ok(count);
        }

        let content = self.read_existing()?.unwrap_or_default();
        let (retained, kept) = retain_newest_half(&content);
        fs::write(&self.path, retained).map_err(|e| LogStoreError::io(&self.path, e))?;
        state.line_count = Some(kept);
        self.metrics.log_rotated();

        debug!(
            before = count,
            kept,
            expected = lines_to_keep(count),
            path = %self.path.display(),
            "Rotated rolling log"
        );
        Ok(kept)
    }

    /// Full log text, [`NO_ENTRIES`] if the log was never written, or a
    /// placeholder describing the read failure.
    pub fn content(&self) -> String {
        let _state = self.state.lock();
        match self.read_existing() {
            Ok(Some(content)) => content,
            Ok(None) => NO_ENTRIES.to_string(),
            Err(err) => {
                self.metrics.log_failed();
                self.diagnostics.report("content", &err);
                format!("Failed to read log: {err}")
            }
        }
    }

    /// Size of the log file in bytes, 0 if absent or unreadable
    pub fn size_bytes(&self) -> u64 {
        let _state = self.state.lock();
        self.file_size()
    }

    /// Physical line count, 0 if absent or unreadable
    pub fn line_count(&self) -> usize {
        let mut state = self.state.lock();
        self.line_count_locked(&mut state)
    }

    /// Size and line count measured under one lock acquisition
    pub fn stats(&self) -> LogStats {
        let mut state = self.state.lock();
        LogStats {
            size_bytes: self.file_size(),
            line_count: self.line_count_locked(&mut state),
        }
    }

    /// Delete the backing file; later reads behave as if nothing was logged
    pub fn clear(&self) {
        let mut state = self.state.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => {
                state.line_count = Some(0);
                info!(path = %self.path.display(), "Rolling log cleared");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => state.line_count = Some(0),
            Err(e) => {
                state.line_count = None;
                self.metrics.log_failed();
                self.diagnostics.report("clear", &LogStoreError::io(&self.path, e));
            }
        }
    }

    fn line_count_locked(&self, state: &mut StoreState) -> usize {
        match self.read_line_count() {
            Ok(count) => {
                state.line_count = Some(count);
                count
            }
            Err(err) => {
                state.line_count = None;
                self.metrics.log_failed();
                self.diagnostics.report("line_count", &err);
                0
            }
        }
    }

    fn file_size(&self) -> u64 {
        match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                self.diagnostics.report("size_bytes", &LogStoreError::io(&self.path, e));
                0
            }
        }
    }

    fn read_line_count(&self) -> Result<usize> {
        Ok(self
            .read_existing()?
            .map(|content| count_lines(&content))
            .unwrap_or(0))
    }

    fn read_existing(&self) -> Result<Option<String>> {
        match fs::read(&self.path) {
            // A torn multibyte write must not wedge the log
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LogStoreError::io(&self.path, e)),
        }
    }
}

/// Mirror an entry to the process-wide tracing subscriber
fn mirror(level: LogLevel, tag: &str, message: &str, failure: Option<&FailureDetail>) {
    let failure = failure.map(|f| f.message.as_str());
    match level {
        LogLevel::Error => tracing::error!(target: "smswatch::applog", tag, failure, "{message}"),
        LogLevel::Warn => tracing::warn!(target: "smswatch::applog", tag, failure, "{message}"),
        LogLevel::Info => tracing::info!(target: "smswatch::applog", tag, "{message}"),
        LogLevel::Debug => tracing::debug!(target: "smswatch::applog", tag, "{message}"),
    }
}
