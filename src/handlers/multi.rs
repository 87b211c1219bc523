//! Fan-out handler

use crate::core::{CloseState, Event, Handler, Level, LoggerError, Result};
use std::sync::Arc;

/// Forwards each event to every wrapped handler enabled for its level.
///
/// Failures are collected rather than short-circuited: every eligible handler
/// is attempted and all errors come back together.
pub struct MultiHandler {
    handlers: Vec<Arc<dyn Handler>>,
    state: CloseState,
}

impl MultiHandler {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            handlers,
            state: CloseState::new(),
        }
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn for_each<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&dyn Handler) -> Option<Result<()>>,
    {
        let errors: Vec<LoggerError> = self
            .handlers
            .iter()
            .filter_map(|h| op(h.as_ref()))
            .filter_map(|r| r.err())
            .collect();
        LoggerError::aggregate(errors)
    }
}

impl Handler for MultiHandler {
    fn enabled(&self, level: Level) -> bool {
        self.handlers.iter().any(|h| h.enabled(level))
    }

    fn write(&self, event: &Event) -> Result<()> {
        self.state.ensure_open()?;
        let level = event.level();
        self.for_each(|h| h.enabled(level).then(|| h.write(event)))
    }

    fn flush(&self) -> Result<()> {
        self.state.ensure_open()?;
        self.for_each(|h| Some(h.flush()))
    }

    fn close(&self) -> Result<()> {
        self.state.close()?;
        self.for_each(|h| Some(h.close()))
    }

    fn name(&self) -> &str {
        "multi"
    }
}

impl std::fmt::Debug for MultiHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("MultiHandler")
            .field("handlers", &names)
            .field("closed", &self.state.is_closed())
            .finish()
    }
}
