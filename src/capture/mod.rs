//! Inbound message capture and listener dispatch
//!
//! A capture session watches for messages from one sender. The host feeds
//! every delivery to [`CaptureDispatcher::handle_inbound`]; deliveries whose
//! source matches the session target are handed to the single registered
//! [`MessageListener`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use smswatch::capture::{CaptureDispatcher, Dispatch, ListenerError};
//!
//! let dispatcher = CaptureDispatcher::new();
//! dispatcher.set_target("13800000000");
//! dispatcher.register_listener(Arc::new(
//!     |from: &str, body: &str| -> Result<(), ListenerError> {
//!         println!("{from}: {body}");
//!         Ok(())
//!     },
//! ));
//!
//! let outcome = dispatcher.handle_inbound("+86 138 0000 0000", &["hello"]).unwrap();
//! assert_eq!(outcome, Dispatch::Delivered);
//! ```

mod dispatcher;
mod event;
mod listener;

pub use dispatcher::{CaptureDispatcher, Dispatch, ListenerId, SessionState, matches};
pub use event::InboundEvent;
pub use listener::{ListenerError, MessageListener};
