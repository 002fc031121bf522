//! Observability: tracing setup and in-process counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed (tests, embedding hosts)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Counters shared by the log store and the capture dispatcher
#[derive(Debug, Default)]
pub struct Metrics {
    entries_appended: AtomicU64,
    log_rotations: AtomicU64,
    log_failures: AtomicU64,
    events_received: AtomicU64,
    events_matched: AtomicU64,
    listener_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_appended(&self) {
        self.entries_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_rotated(&self) {
        self.log_rotations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "log_rotations", "Metric incremented");
    }

    pub fn log_failed(&self) {
        self.log_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "log_failures", "Metric incremented");
    }

    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_matched(&self) {
        self.events_matched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "events_matched", "Metric incremented");
    }

    pub fn listener_failed(&self) {
        self.listener_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "listener_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries_appended: self.entries_appended.load(Ordering::Relaxed),
            log_rotations: self.log_rotations.load(Ordering::Relaxed),
            log_failures: self.log_failures.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_matched: self.events_matched.load(Ordering::Relaxed),
            listener_failures: self.listener_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub entries_appended: u64,
    pub log_rotations: u64,
    pub log_failures: u64,
    pub events_received: u64,
    pub events_matched: u64,
    pub listener_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = Metrics::new();
        metrics.entry_appended();
        metrics.entry_appended();
        metrics.event_received();
        metrics.event_matched();
        metrics.log_failed();

        let snap = metrics.snapshot();
        assert_eq!(snap.entries_appended, 2);
        assert_eq!(snap.events_received, 1);
        assert_eq!(snap.events_matched, 1);
        assert_eq!(snap.log_failures, 1);
        assert_eq!(snap.log_rotations, 0);
    }
}
