//! Handler that accepts and drops every event

use crate::core::{CloseState, Event, Handler, Level, Result};

/// Drops every event at or above its threshold.
///
/// Useful as a cheap sink for benchmarks and for loggers whose output is not
/// wanted but whose call sites should still run.
#[derive(Debug, Default)]
pub struct DiscardHandler {
    threshold: Level,
    state: CloseState,
}

impl DiscardHandler {
    pub fn new(threshold: Level) -> Self {
        Self {
            threshold,
            state: CloseState::new(),
        }
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }
}

impl Handler for DiscardHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    fn write(&self, _event: &Event) -> Result<()> {
        self.state.ensure_open()
    }

    fn flush(&self) -> Result<()> {
        self.state.ensure_open()
    }

    fn close(&self) -> Result<()> {
        self.state.close()
    }

    fn name(&self) -> &str {
        "discard"
    }
}
