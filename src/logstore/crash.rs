use std::any::Any;
use std::backtrace::Backtrace;
use std::sync::Arc;
use std::time::Duration;

use super::entry::{FailureDetail, LogLevel};
use super::store::RollingLogStore;

pub const CRASH_TAG: &str = "CRASH";

/// How long the hook waits for the store lock before giving up
const CRASH_LOCK_WAIT: Duration = Duration::from_millis(500);

/// Record panics in the rolling log, then defer to the previously installed hook
pub fn install_crash_hook(store: Arc<RollingLogStore>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let message = panic_message(info.payload());
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".to_string());
        let thread = std::thread::current();
        let detail = FailureDetail::new(format!(
            "thread '{}' panicked at {location}: {message}",
            thread.name().unwrap_or("<unnamed>")
        ))
        .with_backtrace(&Backtrace::force_capture());

        let recorded = store.try_append_for(
            CRASH_LOCK_WAIT,
            LogLevel::Error,
            CRASH_TAG,
            &format!("Application crashed: {message}"),
            Some(detail),
        );
        if !recorded {
            tracing::error!(%message, "Crash not recorded, rolling log is locked");
        }

        previous(info);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(s.as_ref()), "static str");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "Box<dyn Any>");
    }
}
