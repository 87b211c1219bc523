//! # Structured Log Core
//!
//! Structured, leveled logging built around an immutable [`Logger`] value.
//!
//! ## Features
//!
//! - **Typed Values**: fields carry a tagged [`Value`] instead of strings
//! - **Signed Levels**: any `i32` is a level; ten named anchors give it a name
//! - **Cheap Derivation**: `with_*` returns a new logger; up to five fields stay inline
//! - **Caller Tracing**: optional call-site capture that skips registered helpers
//! - **Pluggable Handlers**: writer, console, queued, fan-out and test handlers
//!
//! ## Example
//!
//! ```
//! use structured_log_core::prelude::*;
//! use structured_log_core::handlers::WriterHandler;
//! use std::sync::Arc;
//!
//! let handler = Arc::new(
//!     WriterHandler::new(Vec::new(), Level::INFO).with_output_format(OutputFormat::Json),
//! );
//! let logger = Logger::new(handler.clone())
//!     .with_namespace("http")
//!     .with([field("method", "GET"), field("status", 200u16)]);
//!
//! logger.info("request served");
//! logger.debug("not written");
//!
//! let output = handler.with_writer(|buf| String::from_utf8_lossy(buf).into_owned());
//! assert!(output.contains("\"namespace\":\"http\""));
//! assert_eq!(output.lines().count(), 1);
//! ```

pub mod bridge;
pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::bridge::LineBridge;
    pub use crate::core::{
        field, CallerInfo, Event, Field, FormatterConfig, Handler, Kind, Level, Logger,
        LoggerBuilder, LoggerError, OutputFormat, OverflowPolicy, Result, TimestampFormat,
        TracingContext, Value,
    };
    pub use crate::handlers::{DiscardHandler, MultiHandler, QueuedHandler, WriterHandler};

    #[cfg(feature = "console")]
    pub use crate::handlers::ConsoleHandler;
}

pub use bridge::LineBridge;
pub use crate::core::{
    field, mark_helper, AnyValue, BoundError, CallerInfo, CloseState, Complex, Event, ExitFn,
    Field, FieldBuf, FormatterConfig, Handler, IpPrefix, Kind, Level, LogPriority, Logger,
    LoggerBuilder, LoggerError, OutputFormat, OverflowCallback, OverflowPolicy, QueueMetrics,
    Result, SharedStr, SpanId, TimestampFormat, TraceId, TracingContext, Value, INLINE_FIELDS,
    MAX_CALLER_DEPTH,
};
