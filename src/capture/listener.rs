use thiserror::Error;

/// Failure raised by a listener; the dispatcher hands it back unchanged
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("listener rejected message: {0}")]
    Rejected(String),
    #[error("listener I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("listener failed: {0}")]
    Other(String),
}

/// Handler invoked for each inbound message that matches the session target
pub trait MessageListener: Send + Sync {
    fn on_message(&self, source: &str, payload: &str) -> Result<(), ListenerError>;
}

impl<F> MessageListener for F
where
    F: Fn(&str, &str) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_message(&self, source: &str, payload: &str) -> Result<(), ListenerError> {
        self(source, payload)
    }
}
