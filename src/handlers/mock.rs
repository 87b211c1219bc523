//! Recording handler for tests
//!
//! Counts `write` invocations and accepted events separately, so a test can
//! tell "the handler was called" apart from "the handler accepted the event".

use crate::core::{CloseState, Event, Handler, Level, LoggerError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MockHandler {
    threshold: Level,
    always_err: AtomicBool,
    write_calls: AtomicU64,
    events_written: AtomicU64,
    flush_calls: AtomicU64,
    events: Mutex<Vec<Event>>,
    state: CloseState,
}

impl MockHandler {
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// A handler whose `write` and `flush` always fail
    pub fn failing(threshold: Level) -> Self {
        let handler = Self::new(threshold);
        handler.set_always_err(true);
        handler
    }

    pub fn set_always_err(&self, always_err: bool) {
        self.always_err.store(always_err, Ordering::Relaxed);
    }

    /// Number of `write` calls made while open, including failed ones
    pub fn write_calls(&self) -> u64 {
        self.write_calls.load(Ordering::Relaxed)
    }

    /// Number of events accepted
    pub fn events_written(&self) -> u64 {
        self.events_written.load(Ordering::Relaxed)
    }

    pub fn flush_calls(&self) -> u64 {
        self.flush_calls.load(Ordering::Relaxed)
    }

    /// Copies of the accepted events, in arrival order
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn last_event(&self) -> Option<Event> {
        self.events.lock().last().cloned()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn failure(&self) -> Option<LoggerError> {
        self.always_err
            .load(Ordering::Relaxed)
            .then(|| LoggerError::handler_write(self.name(), "mock failure"))
    }
}

impl Handler for MockHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    fn write(&self, event: &Event) -> Result<()> {
        self.state.ensure_open()?;
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.events.lock().push(event.clone());
        self.events_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.state.ensure_open()?;
        self.flush_calls.fetch_add(1, Ordering::Relaxed);
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn close(&self) -> Result<()> {
        self.state.close()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
