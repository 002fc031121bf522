use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use smswatch::capture::{CaptureDispatcher, InboundEvent, ListenerError, MessageListener};
use smswatch::config::Config;
use smswatch::logstore::{FailureDetail, RollingLogStore, install_crash_hook};
use smswatch::observability::Metrics;

const TAG: &str = "SmsListener";

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("No capture target: pass --target or set capture.target")]
    MissingTarget,

    #[error("Failed to read inbound events: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dispatch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Line written to stdout for every matching message
#[derive(Debug, Serialize)]
struct Notification<'a> {
    event: &'static str,
    source: &'a str,
    payload: &'a str,
}

/// Records matches in the rolling log and notifies on stdout
struct Notifier {
    store: Arc<RollingLogStore>,
}

impl MessageListener for Notifier {
    fn on_message(&self, source: &str, payload: &str) -> Result<(), ListenerError> {
        self.store
            .info(TAG, &format!("Message from {source}: {payload}"));

        let line = serde_json::to_string(&Notification {
            event: "message",
            source,
            payload,
        })
        .map_err(|e| ListenerError::Other(e.to_string()))?;

        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

/// Run one capture session until stdin closes or a shutdown signal arrives
pub async fn run(config: Config, target: Option<String>) -> Result<(), WatchError> {
    let target = target
        .or_else(|| config.capture.target.clone())
        .filter(|t| !t.trim().is_empty())
        .ok_or(WatchError::MissingTarget)?;

    let metrics = Arc::new(Metrics::new());
    let store = Arc::new(RollingLogStore::from_config(&config.log).with_metrics(metrics.clone()));
    install_crash_hook(store.clone());

    let dispatcher = Arc::new(CaptureDispatcher::new().with_metrics(metrics.clone()));
    dispatcher.set_target(target.as_str());
    dispatcher.register_listener(Arc::new(Notifier {
        store: store.clone(),
    }));

    store.info(TAG, &format!("Started listening for {target}"));
    info!(%target, log = %store.path().display(), "Capture session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = feed(&dispatcher, &store, line).await {
                        break Err(e);
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(WatchError::from(e)),
            },
            _ = &mut shutdown => break Ok(()),
        }
    };

    dispatcher.unregister_listener();
    dispatcher.clear_target();
    store.info(TAG, "Stopped listening");

    let snapshot = metrics.snapshot();
    info!(
        received = snapshot.events_received,
        matched = snapshot.events_matched,
        listener_failures = snapshot.listener_failures,
        "Capture session ended"
    );
    result
}

/// Parse one JSON line and dispatch it on the blocking pool
async fn feed(
    dispatcher: &Arc<CaptureDispatcher>,
    store: &Arc<RollingLogStore>,
    line: String,
) -> Result<(), WatchError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let event: InboundEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Skipping malformed inbound event");
            return Ok(());
        }
    };

    let dispatcher = Arc::clone(dispatcher);
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || {
        if let Err(err) = dispatcher.handle_event(&event) {
            error!(source = %event.source, %err, "Listener failed");
            store.error(
                TAG,
                &format!("Failed to handle message from {}", event.source),
                Some(FailureDetail::from(&err)),
            );
        }
    })
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MessageListener for Recorder {
        fn on_message(&self, source: &str, payload: &str) -> Result<(), ListenerError> {
            self.calls
                .lock()
                .push((source.to_string(), payload.to_string()));
            Ok(())
        }
    }

    fn session(
        target: &str,
        listener: Arc<dyn MessageListener>,
    ) -> (Arc<CaptureDispatcher>, Arc<RollingLogStore>, Arc<Metrics>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let metrics = Arc::new(Metrics::new());
        let store = Arc::new(RollingLogStore::new(temp_dir.path().join("app_log.txt"), 2000));
        let dispatcher = Arc::new(CaptureDispatcher::new().with_metrics(metrics.clone()));
        dispatcher.set_target(target);
        dispatcher.register_listener(listener);
        (dispatcher, store, metrics, temp_dir)
    }

    #[tokio::test]
    async fn test_feed_skips_malformed_and_blank_lines() {
        let recorder = Arc::new(Recorder::default());
        let (dispatcher, store, metrics, _temp) = session("13800000000", recorder.clone());

        let lines = [
            r#"{"source": "+86 138 0000 0000", "parts": ["hel", "lo"]}"#,
            "not json at all",
            "   ",
            r#"{"source": "15900001111", "parts": ["x"]}"#,
        ];
        for line in lines {
            feed(&dispatcher, &store, line.to_string()).await.unwrap();
        }

        assert_eq!(
            *recorder.calls.lock(),
            vec![("+86 138 0000 0000".to_string(), "hello".to_string())]
        );
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_received, 2);
        assert_eq!(snapshot.events_matched, 1);
    }

    #[tokio::test]
    async fn test_feed_logs_listener_failure() {
        fn reject(_source: &str, _payload: &str) -> Result<(), ListenerError> {
            Err(ListenerError::Rejected("mailbox full".to_string()))
        }
        let (dispatcher, store, metrics, _temp) = session("10086", Arc::new(reject));

        feed(&dispatcher, &store, r#"{"source": "10086", "parts": ["hi"]}"#.to_string())
            .await
            .unwrap();

        assert_eq!(metrics.snapshot().listener_failures, 1);
        let content = store.content();
        assert!(content.contains("[ERROR] [SmsListener] Failed to handle message from 10086"));
        assert!(content.contains("listener rejected message: mailbox full"));
    }

    #[tokio::test]
    async fn test_notifier_records_match_in_log() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(RollingLogStore::new(temp_dir.path().join("app_log.txt"), 2000));
        let notifier = Arc::new(Notifier {
            store: store.clone(),
        });
        let dispatcher = Arc::new(CaptureDispatcher::new());
        dispatcher.set_target("95588");
        dispatcher.register_listener(notifier);

        feed(&dispatcher, &store, r#"{"source": "95588", "parts": ["balance 12.00"]}"#.to_string())
            .await
            .unwrap();

        assert_eq!(store.line_count(), 1);
        assert!(store.content().contains("Message from 95588: balance 12.00"));
    }
}
