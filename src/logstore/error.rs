use thiserror::Error;

/// Failures inside the rolling log store.
///
/// These never reach callers of the public log API; they are handed to the
/// store's [`DiagnosticSink`](super::DiagnosticSink) and swallowed.
#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LogStoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LogStoreError>;
