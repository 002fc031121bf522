use super::error::LogStoreError;

/// Side channel for failures the log store swallows
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, operation: &'static str, error: &LogStoreError);
}

/// Reports swallowed failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, operation: &'static str, error: &LogStoreError) {
        tracing::error!(operation, %error, "Rolling log operation failed");
    }
}
