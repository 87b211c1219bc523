//! Log event snapshot handed to handlers

use super::caller::CallerInfo;
use super::context::TracingContext;
use super::field::{Field, INLINE_FIELDS};
use super::level::Level;
use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::Arc;

/// Field storage shared by loggers and events: inline up to [`INLINE_FIELDS`], then heap
pub type FieldBuf = SmallVec<[Field; INLINE_FIELDS]>;

/// Error bound to a logger with `with_error`
pub type BoundError = Arc<dyn StdError + Send + Sync>;

/// One log call, built by the logger and consumed by a single `Handler::write`.
#[derive(Debug, Clone)]
pub struct Event {
    namespace: Option<Arc<str>>,
    time: DateTime<Utc>,
    level: Level,
    message: Cow<'static, str>,
    error: Option<BoundError>,
    context: Option<TracingContext>,
    caller: CallerInfo,
    fields: FieldBuf,
}

impl Event {
    pub fn new(level: Level, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: None,
            time: Utc::now(),
            level,
            message: message.into(),
            error: None,
            context: None,
            caller: CallerInfo::default(),
            fields: FieldBuf::new(),
        }
    }

    pub(crate) fn from_parts(
        level: Level,
        message: Cow<'static, str>,
        namespace: Option<Arc<str>>,
        fields: FieldBuf,
        error: Option<BoundError>,
        context: Option<TracingContext>,
        caller: CallerInfo,
    ) -> Self {
        Self {
            namespace,
            time: Utc::now(),
            level,
            message,
            error,
            context,
            caller,
            fields,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_namespace(mut self, namespace: impl Into<Arc<str>>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_error(mut self, error: BoundError) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_context(mut self, context: TracingContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_caller(mut self, caller: CallerInfo) -> Self {
        self.caller = caller;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    pub fn context(&self) -> Option<&TracingContext> {
        self.context.as_ref()
    }

    pub fn caller(&self) -> &CallerInfo {
        &self.caller
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether the fields outgrew the inline buffer
    pub fn spilled(&self) -> bool {
        self.fields.spilled()
    }

    /// First field with the given key, ignoring field namespaces
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::field;

    #[test]
    fn test_event_creation() {
        let event = Event::new(Level::INFO, "started")
            .with_namespace("app")
            .with_field(field("port", 8080_u16));
        assert_eq!(event.level(), Level::INFO);
        assert_eq!(event.message(), "started");
        assert_eq!(event.namespace(), Some("app"));
        assert_eq!(event.field("port").unwrap().value.as_u64().unwrap(), 8080);
        assert!(!event.caller().defined);
        assert!(event.error().is_none());
    }

    #[test]
    fn test_spill_past_inline_capacity() {
        let mut event = Event::new(Level::DEBUG, "many");
        for i in 0..INLINE_FIELDS {
            event = event.with_field(field("i", i));
        }
        assert!(!event.spilled());
        event = event.with_field(field("extra", true));
        assert!(event.spilled());
        assert_eq!(event.fields().len(), INLINE_FIELDS + 1);
    }

    #[test]
    fn test_event_error() {
        let err: BoundError = Arc::new(std::io::Error::other("disk full"));
        let event = Event::new(Level::ERROR, "write failed").with_error(err);
        assert_eq!(event.error().unwrap().to_string(), "disk full");
    }
}
