//! Overflow policies for the queued handler
//!
//! When the queue in front of a handler is full, the policy decides what
//! happens to a new event. Events at [`Level::ERROR`] and above never reach
//! the policy: they are written synchronously instead.

use super::level::Level;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Policy for handling queue overflow
///
/// # Example
///
/// ```
/// use structured_log_core::OverflowPolicy;
/// use std::time::Duration;
///
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::AlertAndDrop);
///
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Drop the new event and count it
    DropNewest,

    /// Wait until the worker frees a slot
    ///
    /// Applies backpressure to every logging call site.
    Block,

    /// Wait up to the timeout, then drop with an alert
    BlockWithTimeout(Duration),

    /// Drop, warn on stderr and notify the overflow callback
    #[default]
    AlertAndDrop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

/// Preservation priority derived from an event's level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LogPriority {
    /// Below Warning
    #[default]
    Normal = 0,
    /// Warning up to Error
    High = 1,
    /// Error and above; never dropped
    Critical = 2,
}

impl LogPriority {
    pub fn for_level(level: Level) -> Self {
        if level >= Level::ERROR {
            LogPriority::Critical
        } else if level >= Level::WARNING {
            LogPriority::High
        } else {
            LogPriority::Normal
        }
    }
}

impl fmt::Display for LogPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogPriority::Normal => write!(f, "Normal"),
            LogPriority::High => write!(f, "High"),
            LogPriority::Critical => write!(f, "Critical"),
        }
    }
}

/// Callback type for overflow notifications
///
/// The parameter is the total count of dropped events so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
