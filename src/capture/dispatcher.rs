use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::observability::Metrics;

use super::event::{InboundEvent, concat_parts};
use super::listener::{ListenerError, MessageListener};

/// Identifies one listener registration in logs
pub type ListenerId = Uuid;

/// Where the capture session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable target. A registered listener alone cannot fire.
    Idle,
    /// Target set, no listener
    Armed,
    /// Target and listener set; matching events are delivered
    Listening,
}

/// Outcome of one inbound delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The listener was invoked and returned normally
    Delivered,
    /// Session active but the source did not match the target
    NoMatch,
    /// No listener or no target
    Inactive,
}

struct Registration {
    id: ListenerId,
    listener: Arc<dyn MessageListener>,
}

#[derive(Default)]
struct Session {
    target: Option<String>,
    registration: Option<Registration>,
}

impl Session {
    fn has_target(&self) -> bool {
        self.target
            .as_deref()
            .is_some_and(|t| !normalize(t).is_empty())
    }
}

/// Holds the single active listener and the sender filter.
///
/// Registration, unregistration and target changes are atomic with respect
/// to [`handle_inbound`](Self::handle_inbound): a delivery sees either the
/// previous listener in full or none. The listener is invoked outside the
/// lock, so it may call back into the dispatcher.
pub struct CaptureDispatcher {
    session: RwLock<Session>,
    metrics: Arc<Metrics>,
}

impl CaptureDispatcher {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(Session::default()),
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the sender filter
    pub fn set_target(&self, target: impl Into<String>) {
        let target = target.into();
        info!(%target, "Capture target set");
        self.session.write().target = Some(target);
    }

    pub fn clear_target(&self) {
        self.session.write().target = None;
        info!("Capture target cleared");
    }

    pub fn target(&self) -> Option<String> {
        self.session.read().target.clone()
    }

    /// Install `listener`, replacing any previous one
    pub fn register_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId {
        let id = Uuid::now_v7();
        let previous = self
            .session
            .write()
            .registration
            .replace(Registration { id, listener });

        match previous {
            Some(old) => info!(listener_id = %id, replaced = %old.id, "Listener replaced"),
            None => info!(listener_id = %id, "Listener registered"),
        }
        id
    }

    /// Remove the listener. Returns whether one was registered.
    pub fn unregister_listener(&self) -> bool {
        let removed = self.session.write().registration.take();
        if let Some(old) = &removed {
            info!(listener_id = %old.id, "Listener unregistered");
        }
        removed.is_some()
    }

    pub fn listener_id(&self) -> Option<ListenerId> {
        self.session.read().registration.as_ref().map(|r| r.id)
    }

    pub fn state(&self) -> SessionState {
        let session = self.session.read();
        match (session.has_target(), session.registration.is_some()) {
            (false, _) => SessionState::Idle,
            (true, false) => SessionState::Armed,
            (true, true) => SessionState::Listening,
        }
    }

    /// Match one delivery against the target and invoke the listener on a hit.
    ///
    /// `parts` are concatenated in order into a single payload. A listener
    /// failure is returned to the caller as-is.
    pub fn handle_inbound<S: AsRef<str>>(
        &self,
        source: &str,
        parts: &[S],
    ) -> Result<Dispatch, ListenerError> {
        let payload = concat_parts(parts);
        self.metrics.event_received();

        let listener = {
            let session = self.session.read();
            let (Some(target), Some(registration), true) = (
                session.target.as_deref(),
                session.registration.as_ref(),
                session.has_target(),
            ) else {
                debug!(source, "Inbound event ignored, session inactive");
                return Ok(Dispatch::Inactive);
            };
            if !matches(source, target) {
                debug!(source, "Inbound event does not match target");
                return Ok(Dispatch::NoMatch);
            }
            Arc::clone(&registration.listener)
        };

        self.metrics.event_matched();
        info!(source, bytes = payload.len(), "Matching message received");

        listener.on_message(source, &payload).inspect_err(|err| {
            self.metrics.listener_failed();
            debug!(source, %err, "Listener failed");
        })?;
        Ok(Dispatch::Delivered)
    }

    pub fn handle_event(&self, event: &InboundEvent) -> Result<Dispatch, ListenerError> {
        self.handle_inbound(&event.source, &event.parts)
    }
}

impl Default for CaptureDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip formatting characters that carriers and users insert into numbers
fn normalize(id: &str) -> String {
    id.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect()
}

/// Whether `source` identifies the sender `target`.
///
/// Both sides are compared with spacing, dashes, dots and parentheses
/// removed; the source matches when it contains the target, which tolerates
/// country-code prefixes. Empty identifiers never match.
pub fn matches(source: &str, target: &str) -> bool {
    let source = normalize(source);
    let target = normalize(target);
    !source.is_empty() && !target.is_empty() && source.contains(&target)
}
