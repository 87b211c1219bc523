//! Logging macros for ergonomic log message formatting.
//!
//! The macros format lazily: arguments are only rendered when the logger's
//! handler is enabled for the level.
//!
//! # Examples
//!
//! ```
//! use structured_log_core::prelude::*;
//! use structured_log_core::info;
//! use std::sync::Arc;
//!
//! let logger = Logger::new(Arc::new(DiscardHandler::new(Level::INFO)));
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at any level.
///
/// # Examples
///
/// ```
/// # use structured_log_core::prelude::*;
/// # use std::sync::Arc;
/// # let logger = Logger::new(Arc::new(DiscardHandler::new(Level::INFO)));
/// use structured_log_core::log;
/// log!(logger, Level::INFO, "Simple message");
/// log!(logger, Level::ERROR, "Error code: {}", 500);
/// log!(logger, Level(15), "between success and notice");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_fmt($level, format_args!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::TRACE, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use structured_log_core::prelude::*;
/// # use std::sync::Arc;
/// # let logger = Logger::new(Arc::new(DiscardHandler::new(Level::DEBUG)));
/// use structured_log_core::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($arg)+)
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::VERBOSE, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($arg)+)
    };
}

#[macro_export]
macro_rules! success {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::SUCCESS, $($arg)+)
    };
}

#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::NOTICE, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use structured_log_core::prelude::*;
/// # use std::sync::Arc;
/// # let logger = Logger::new(Arc::new(DiscardHandler::new(Level::INFO)));
/// use structured_log_core::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::WARNING, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($arg)+)
    };
}

/// Log a critical message, then flush the handler.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $logger.critical(format!($($arg)+))
    };
}

/// Log a fatal message, flush, then run the logger's exit hook.
///
/// Without a hook installed via `with_exit_fn` this ends the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+))
    };
}
