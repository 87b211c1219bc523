//! Error types for the logging core

use super::value::Kind;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Emitting or flushing through a logger without a handler
    #[error("logger is invalid: no handler configured")]
    LoggerInvalid,

    /// Any operation against a handler after it was closed
    #[error("handler is closed")]
    HandlerClosed,

    /// Sink-internal write or flush failure
    #[error("handler '{handler}' write failed: {message}")]
    HandlerWrite { handler: String, message: String },

    /// Value accessed through an accessor for a different kind
    #[error("kind mismatch: expected {expected}, found {actual}")]
    KindMismatch { expected: Kind, actual: Kind },

    /// Level text that is neither an anchor name, an offset form nor an integer
    #[error("invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Prefix length larger than the address family allows, or malformed prefix text
    #[error("invalid ip prefix '{prefix}': {message}")]
    InvalidIpPrefix { prefix: String, message: String },

    /// Queue full with buffer details
    #[error("log queue full: {current}/{max} events buffered")]
    QueueFull { current: usize, max: usize },

    /// Queue overflow with dropped event count
    #[error("log queue overflow: dropped {dropped_count} events")]
    QueueOverflow { dropped_count: u64 },

    /// A bounded wait expired
    #[error("timed out after {timeout:?} while {operation}")]
    Timeout { operation: String, timeout: Duration },

    /// Several handlers failed for the same operation
    #[error("{} handler errors: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<LoggerError>),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create a handler write error
    pub fn handler_write(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HandlerWrite {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch(expected: Kind, actual: Kind) -> Self {
        LoggerError::KindMismatch { expected, actual }
    }

    /// Create an invalid ip prefix error
    pub fn invalid_prefix(prefix: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidIpPrefix {
            prefix: prefix.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error with buffer details
    pub fn queue_full(current: usize, max: usize) -> Self {
        LoggerError::QueueFull { current, max }
    }

    /// Create a queue overflow error
    pub fn queue_overflow(dropped_count: u64) -> Self {
        LoggerError::QueueOverflow { dropped_count }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        LoggerError::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Fold per-handler failures into one result.
    ///
    /// No errors is success, a single error is returned unchanged, and several
    /// errors are kept in order inside [`LoggerError::Multiple`].
    pub fn aggregate(mut errors: Vec<LoggerError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LoggerError::Multiple(errors)),
        }
    }

    /// Whether this error means the sink is gone.
    ///
    /// An aggregate counts as closed only when every member is.
    pub fn is_handler_closed(&self) -> bool {
        match self {
            LoggerError::HandlerClosed => true,
            LoggerError::Multiple(errors) => {
                !errors.is_empty() && errors.iter().all(LoggerError::is_handler_closed)
            }
            _ => false,
        }
    }
}
