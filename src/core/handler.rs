//! Handler trait for log sinks
//!
//! A handler is shared by every logger derived from the one it was attached to,
//! across threads. Implementations own their locking; the logger never
//! synchronizes on a handler's behalf.
//!
//! Every handler is `Open` until `close` succeeds and `Closed` afterwards. Once
//! closed, `write`, `flush` and `close` all return
//! [`LoggerError::HandlerClosed`]. `enabled` stays callable.

use super::error::{LoggerError, Result};
use super::event::Event;
use super::level::Level;
use std::sync::atomic::{AtomicBool, Ordering};

pub trait Handler: Send + Sync {
    /// Whether events at `level` would be written
    fn enabled(&self, level: Level) -> bool;

    fn write(&self, event: &Event) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Release the sink. Not idempotent: a second call fails with `HandlerClosed`.
    fn close(&self) -> Result<()>;

    fn name(&self) -> &str;
}

/// Open/closed state shared by the bundled handlers.
#[derive(Debug, Default)]
pub struct CloseState {
    closed: AtomicBool,
}

impl CloseState {
    pub const fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// `Ok` while open, `HandlerClosed` afterwards
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(LoggerError::HandlerClosed)
        } else {
            Ok(())
        }
    }

    /// Transition to closed. Only the first caller succeeds.
    pub fn close(&self) -> Result<()> {
        self.closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| LoggerError::HandlerClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_state_transitions() {
        let state = CloseState::new();
        assert!(state.ensure_open().is_ok());
        assert!(state.close().is_ok());
        assert!(state.is_closed());
        assert!(state.ensure_open().unwrap_err().is_handler_closed());
        assert!(state.close().unwrap_err().is_handler_closed());
    }

    #[test]
    fn test_single_winner_under_contention() {
        let state = std::sync::Arc::new(CloseState::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = std::sync::Arc::clone(&state);
                std::thread::spawn(move || state.close().is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
    }
}
