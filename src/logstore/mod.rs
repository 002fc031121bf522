//! Bounded, file-backed rolling log
//!
//! The application's own log: every entry is appended as one line to a
//! single UTF-8 text file and mirrored to `tracing`. Once the file reaches
//! its line cap, the oldest half is evicted just before the next append.
//!
//! ## Failure model
//!
//! Logging never fails visibly. I/O errors are handed to a
//! [`DiagnosticSink`] (by default [`TracingDiagnostics`]) and the call
//! degrades to a no-op or an empty result.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use smswatch::logstore::RollingLogStore;
//!
//! let store = RollingLogStore::new("data/app_log.txt", 2000);
//! store.info("SmsListener", "listening");
//! println!("{} lines", store.line_count());
//! ```

mod crash;
mod diagnostics;
pub mod entry;
pub mod error;
pub mod rotation;
mod store;

pub use crash::{CRASH_TAG, install_crash_hook};
pub use diagnostics::{DiagnosticSink, TracingDiagnostics};
pub use entry::{FailureDetail, LogEntry, LogLevel};
pub use error::{LogStoreError, Result};
pub use rotation::DEFAULT_MAX_LINES;
pub use store::{LogStats, NO_ENTRIES, RollingLogStore};
