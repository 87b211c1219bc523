//! Immutable logger handle
//!
//! A [`Logger`] is a small value: a handler reference plus the namespace,
//! fields, bound error and tracing context that every event it emits will
//! carry. Every `with_*` method returns a new logger and leaves the receiver
//! untouched, so a base logger can be shared and derived from on any thread.
//!
//! Up to [`INLINE_FIELDS`] fields are stored inline; deriving within that
//! bound does not touch the heap.

use super::caller::{self, CallerInfo};
use super::context::TracingContext;
use super::error::{LoggerError, Result};
use super::event::{BoundError, Event, FieldBuf};
use super::field::{Field, INLINE_FIELDS};
use super::handler::Handler;
use super::level::Level;
use super::text::SharedStr;
use super::value::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Hook run by [`Logger::fatal`] after the event was written and flushed
pub type ExitFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
pub struct Logger {
    handler: Option<Arc<dyn Handler>>,
    namespace: Option<Arc<str>>,
    fields: FieldBuf,
    error: Option<BoundError>,
    context: Option<TracingContext>,
    caller: bool,
    exit: Option<ExitFn>,
}

impl Logger {
    /// Create a logger writing to `handler`, with caller tracing off
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler: Some(handler),
            ..Self::default()
        }
    }

    /// Like [`Logger::new`], but reports a missing handler as `LoggerInvalid`
    pub fn try_new(handler: Option<Arc<dyn Handler>>) -> Result<Self> {
        handler.map(Self::new).ok_or(LoggerError::LoggerInvalid)
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Logger with additional fields appended after the existing ones
    #[must_use]
    pub fn with<I>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let mut derived = self.clone();
        derived.fields.extend(fields);
        derived
    }

    #[must_use]
    pub fn with_field(&self, key: impl Into<SharedStr>, value: impl Into<Value>) -> Self {
        let mut derived = self.clone();
        derived.fields.push(Field::new(key, value));
        derived
    }

    /// Append `ns` to the namespace, joined with `.`; empty input is a no-op
    #[must_use]
    pub fn with_namespace(&self, ns: &str) -> Self {
        let mut derived = self.clone();
        if ns.is_empty() {
            return derived;
        }
        derived.namespace = Some(match &self.namespace {
            Some(parent) => Arc::from(format!("{}.{}", parent, ns)),
            None => Arc::from(ns),
        });
        derived
    }

    #[must_use]
    pub fn with_error<E>(&self, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.with_shared_error(Arc::new(err))
    }

    /// Bind an error that is already shared
    #[must_use]
    pub fn with_shared_error(&self, err: BoundError) -> Self {
        let mut derived = self.clone();
        derived.error = Some(err);
        derived
    }

    #[must_use]
    pub fn with_ctx(&self, ctx: TracingContext) -> Self {
        let mut derived = self.clone();
        derived.context = Some(ctx);
        derived
    }

    /// Record the call site on every event
    #[must_use]
    pub fn with_caller(&self) -> Self {
        let mut derived = self.clone();
        derived.caller = true;
        derived
    }

    #[must_use]
    pub fn without_caller(&self) -> Self {
        let mut derived = self.clone();
        derived.caller = false;
        derived
    }

    /// Replace what [`Logger::fatal`] does after logging
    #[must_use]
    pub fn with_exit_fn(&self, exit: ExitFn) -> Self {
        let mut derived = self.clone();
        derived.exit = Some(exit);
        derived
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Error bound with [`Logger::with_error`]
    pub fn bound_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    pub fn context(&self) -> Option<&TracingContext> {
        self.context.as_ref()
    }

    pub fn caller_enabled(&self) -> bool {
        self.caller
    }

    pub fn handler(&self) -> Option<&Arc<dyn Handler>> {
        self.handler.as_ref()
    }

    /// False when no handler is attached; such a logger emits nothing
    pub fn is_valid(&self) -> bool {
        self.handler.is_some()
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.as_ref().is_some_and(|h| h.enabled(level))
    }

    pub fn flush(&self) -> Result<()> {
        self.handler
            .as_ref()
            .ok_or(LoggerError::LoggerInvalid)?
            .flush()
    }

    fn build_event(
        &self,
        level: Level,
        message: Cow<'static, str>,
        caller: Option<CallerInfo>,
    ) -> Event {
        let caller = match caller {
            Some(known) => known,
            None if self.caller => caller::locate(),
            None => CallerInfo::default(),
        };
        Event::from_parts(
            level,
            message,
            self.namespace.clone(),
            self.fields.clone(),
            self.error.clone(),
            self.context,
            caller,
        )
    }

    /// Build and write an event; disabled levels cost one `enabled` call
    #[inline(never)]
    fn emit(&self, level: Level, message: Cow<'static, str>) -> Result<()> {
        self.emit_at(level, message, None)
    }

    /// Emit with a call site already known to the caller
    pub(crate) fn emit_at(
        &self,
        level: Level,
        message: Cow<'static, str>,
        caller: Option<CallerInfo>,
    ) -> Result<()> {
        let handler = self.handler.as_ref().ok_or(LoggerError::LoggerInvalid)?;
        if !handler.enabled(level) {
            return Ok(());
        }
        handler.write(&self.build_event(level, message, caller))
    }

    /// Emit at an arbitrary level. Handler errors are not reported.
    #[inline(never)]
    pub fn log(&self, level: Level, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(level, message.into());
    }

    /// Emit and return the handler's verdict, or `LoggerInvalid`
    #[inline(never)]
    pub fn try_log(&self, level: Level, message: impl Into<Cow<'static, str>>) -> Result<()> {
        self.emit(level, message.into())
    }

    /// Emit preformatted arguments, formatting only when the level is enabled
    #[inline(never)]
    pub fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let message = match args.as_str() {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(fmt::format(args)),
        };
        let _ = self.emit(level, message);
    }

    #[inline(never)]
    pub fn trace(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::TRACE, message.into());
    }

    #[inline(never)]
    pub fn debug(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::DEBUG, message.into());
    }

    #[inline(never)]
    pub fn verbose(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::VERBOSE, message.into());
    }

    #[inline(never)]
    pub fn info(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::INFO, message.into());
    }

    #[inline(never)]
    pub fn success(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::SUCCESS, message.into());
    }

    #[inline(never)]
    pub fn notice(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::NOTICE, message.into());
    }

    #[inline(never)]
    pub fn warning(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::WARNING, message.into());
    }

    #[inline(never)]
    pub fn error(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::ERROR, message.into());
    }

    /// Emit at `Critical`, then flush the handler
    #[inline(never)]
    pub fn critical(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::CRITICAL, message.into());
        let _ = self.flush();
    }

    /// Emit at `Fatal`, flush, then run the exit hook.
    ///
    /// The default hook is `std::process::exit(1)`; use
    /// [`Logger::with_exit_fn`] to replace it. The hook runs even when the
    /// logger is invalid.
    #[inline(never)]
    pub fn fatal(&self, message: impl Into<Cow<'static, str>>) {
        let _ = self.emit(Level::FATAL, message.into());
        let _ = self.flush();
        match &self.exit {
            Some(exit) => exit(),
            None => std::process::exit(1),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handler", &self.handler.as_ref().map(|h| h.name()))
            .field("namespace", &self.namespace)
            .field("fields", &self.fields)
            .field("error", &self.error)
            .field("context", &self.context)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a Logger with a fluent API
///
/// # Example
/// ```
/// use structured_log_core::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .handler(Arc::new(DiscardHandler::new(Level::INFO)))
///     .namespace("app")
///     .field(field("version", "1.2.0"))
///     .caller(true)
///     .build()
///     .unwrap();
/// assert_eq!(logger.namespace(), Some("app"));
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    handler: Option<Arc<dyn Handler>>,
    namespace: Option<String>,
    fields: Vec<Field>,
    caller: bool,
    exit: Option<ExitFn>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller(mut self, enabled: bool) -> Self {
        self.caller = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_fn(mut self, exit: ExitFn) -> Self {
        self.exit = Some(exit);
        self
    }

    /// Build the Logger; fails with `LoggerInvalid` without a handler
    pub fn build(self) -> Result<Logger> {
        let mut logger = Logger::try_new(self.handler)?;
        if let Some(ns) = self.namespace {
            logger = logger.with_namespace(&ns);
        }
        logger.fields.extend(self.fields);
        logger.caller = self.caller;
        logger.exit = self.exit;
        Ok(logger)
    }
}
