//! Core logger types and traits

pub mod caller;
pub mod context;
pub mod error;
pub mod event;
pub mod field;
pub mod format;
pub mod handler;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod text;
pub mod value;

pub use caller::{mark_helper, CallerInfo, MAX_CALLER_DEPTH};
pub use context::{SpanId, TraceId, TracingContext};
pub use error::{LoggerError, Result};
pub use event::{BoundError, Event, FieldBuf};
pub use field::{field, Field, INLINE_FIELDS};
pub use format::{FormatterConfig, OutputFormat, TimestampFormat};
pub use handler::{CloseState, Handler};
pub use level::Level;
pub use logger::{ExitFn, Logger, LoggerBuilder};
pub use metrics::QueueMetrics;
pub use overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy};
pub use text::SharedStr;
pub use value::{AnyValue, Complex, IpPrefix, Kind, Value};
