//! Event encodings used by the writer and console handlers
//!
//! - Text: `[2025-01-08T10:30:45.123Z] [INFO] app.http: request done status=200`
//! - Json: one object per line
//! - Logfmt: `time=... level=INFO namespace=app.http message="request done" status=200`
//!
//! The event namespace and each field's own namespace are rendered
//! independently: the first as `namespace`, the second as a `ns.key` prefix.

use super::event::Event;
use super::level::Level;
use super::value::Value;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Timestamp rendering options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45.123456789+00:00`
    Rfc3339,

    /// Seconds since the epoch
    Unix,

    /// Milliseconds since the epoch
    UnixMillis,

    /// strftime-compatible pattern
    ///
    /// ```
    /// use structured_log_core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, time: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => time.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Iso8601Micros => time.to_rfc3339_opts(SecondsFormat::Micros, true),
            TimestampFormat::Rfc3339 => time.to_rfc3339(),
            TimestampFormat::Unix => time.timestamp().to_string(),
            TimestampFormat::UnixMillis => time.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => time.format(pattern).to_string(),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }

    fn to_json(&self, time: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::Unix => time.timestamp().into(),
            TimestampFormat::UnixMillis => time.timestamp_millis().into(),
            _ => self.format(time).into(),
        }
    }
}

/// Formatting options shared by the text-producing handlers
///
/// ```
/// use structured_log_core::{FormatterConfig, TimestampFormat};
///
/// let config = FormatterConfig::new()
///     .with_timestamp_format(TimestampFormat::Iso8601Micros)
///     .with_level_uppercase(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub timestamp_format: TimestampFormat,
    pub include_timestamp: bool,
    pub include_level: bool,
    /// Render `file:line` when the event carries caller info
    pub include_caller: bool,
    /// Render trace and span ids when the event carries a tracing context
    pub include_context: bool,
    pub level_uppercase: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            include_timestamp: true,
            include_level: true,
            include_caller: true,
            include_context: true,
            level_uppercase: true,
        }
    }
}

impl FormatterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_custom_timestamp(mut self, pattern: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(pattern.to_string());
        self
    }

    #[must_use]
    pub fn with_include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    #[must_use]
    pub fn with_include_level(mut self, include: bool) -> Self {
        self.include_level = include;
        self
    }

    #[must_use]
    pub fn with_include_caller(mut self, include: bool) -> Self {
        self.include_caller = include;
        self
    }

    #[must_use]
    pub fn with_include_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    #[must_use]
    pub fn with_level_uppercase(mut self, uppercase: bool) -> Self {
        self.level_uppercase = uppercase;
        self
    }

    /// Wrap this config in an Arc for sharing across handlers
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn level_text(&self, level: Level) -> String {
        let text = level.to_string();
        if self.level_uppercase {
            text.to_uppercase()
        } else {
            text
        }
    }
}

/// Output encoding for one event per line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Logfmt,
}

impl OutputFormat {
    /// Encode an event without a trailing newline
    pub fn format(&self, event: &Event, config: &FormatterConfig) -> String {
        match self {
            OutputFormat::Text => format_text(event, config),
            OutputFormat::Json => format_json(event, config),
            OutputFormat::Logfmt => format_logfmt(event, config),
        }
    }
}

/// Escape line breaks and tabs so one event cannot forge another line
pub fn sanitize(message: &str) -> Cow<'_, str> {
    if !message.contains(['\n', '\r', '\t']) {
        return Cow::Borrowed(message);
    }
    Cow::Owned(
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t"),
    )
}

fn format_text(event: &Event, config: &FormatterConfig) -> String {
    let mut out = String::with_capacity(64 + event.message().len());

    if config.include_timestamp {
        out.push('[');
        out.push_str(&config.timestamp_format.format(&event.time()));
        out.push_str("] ");
    }
    if config.include_level {
        out.push('[');
        out.push_str(&config.level_text(event.level()));
        out.push_str("] ");
    }
    if let Some(ns) = event.namespace() {
        out.push_str(&sanitize(ns));
        out.push_str(": ");
    }
    out.push_str(&sanitize(event.message()));

    for (key, value) in trailing_pairs(event, config) {
        out.push(' ');
        out.push_str(&sanitize(&key));
        out.push('=');
        out.push_str(&value);
    }
    out
}

fn format_logfmt(event: &Event, config: &FormatterConfig) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4 + event.fields().len());

    if config.include_timestamp {
        parts.push(format!(
            "time={}",
            escape_logfmt_value(&config.timestamp_format.format(&event.time()))
        ));
    }
    if config.include_level {
        parts.push(format!("level={}", config.level_text(event.level())));
    }
    if let Some(ns) = event.namespace() {
        parts.push(format!("namespace={}", escape_logfmt_value(&sanitize(ns))));
    }
    parts.push(format!("message={}", quote_logfmt_value(&sanitize(event.message()))));

    for (key, value) in trailing_pairs(event, config) {
        parts.push(format!("{}={}", escape_logfmt_key(&key), value));
    }
    parts.join(" ")
}

/// Fields, error, caller and context as `key=value` text pairs
fn trailing_pairs(event: &Event, config: &FormatterConfig) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(event.fields().len() + 3);

    for field in event.fields() {
        pairs.push((field.qualified_key().into_owned(), text_value(&field.value)));
    }
    if let Some(err) = event.error() {
        pairs.push(("error".to_string(), quote_logfmt_value(&sanitize(&err.to_string()))));
    }
    if config.include_caller && event.caller().defined {
        pairs.push(("caller".to_string(), escape_logfmt_value(&event.caller().to_string())));
    }
    if config.include_context {
        if let Some(ctx) = event.context() {
            pairs.push(("trace_id".to_string(), ctx.trace_id.to_string()));
            pairs.push(("span_id".to_string(), ctx.span_id.to_string()));
        }
    }
    pairs
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => escape_logfmt_value(&sanitize(s.as_str())),
        Value::Any(Some(_)) => escape_logfmt_value(&sanitize(&value.to_string())),
        other => escape_logfmt_value(&other.to_string()),
    }
}

fn format_json(event: &Event, config: &FormatterConfig) -> String {
    let mut obj = serde_json::Map::new();

    if config.include_timestamp {
        obj.insert("time".to_string(), config.timestamp_format.to_json(&event.time()));
    }
    if config.include_level {
        obj.insert("level".to_string(), config.level_text(event.level()).into());
    }
    if let Some(ns) = event.namespace() {
        obj.insert("namespace".to_string(), ns.into());
    }
    obj.insert("message".to_string(), event.message().into());

    if !event.fields().is_empty() {
        let mut grouped: BTreeMap<String, Vec<serde_json::Value>> = BTreeMap::new();
        for field in event.fields() {
            let value = serde_json::to_value(&field.value).unwrap_or(serde_json::Value::Null);
            grouped.entry(field.qualified_key().into_owned()).or_default().push(value);
        }
        // a repeated key keeps every value, in order, as an array
        let fields: serde_json::Map<String, serde_json::Value> = grouped
            .into_iter()
            .map(|(key, mut values)| {
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    serde_json::Value::Array(values)
                };
                (key, value)
            })
            .collect();
        obj.insert("fields".to_string(), serde_json::Value::Object(fields));
    }
    if let Some(err) = event.error() {
        obj.insert("error".to_string(), err.to_string().into());
    }
    if config.include_caller && event.caller().defined {
        if let Ok(caller) = serde_json::to_value(event.caller()) {
            obj.insert("caller".to_string(), caller);
        }
    }
    if config.include_context {
        if let Some(ctx) = event.context() {
            obj.insert("trace_id".to_string(), ctx.trace_id.to_string().into());
            obj.insert("span_id".to_string(), ctx.span_id.to_string().into());
            if let Some(parent) = ctx.parent_span_id {
                obj.insert("parent_span_id".to_string(), parent.to_string().into());
            }
        }
    }

    serde_json::Value::Object(obj).to_string()
}

fn escape_logfmt_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// Quote a value only when it contains spaces, quotes or `=`
fn escape_logfmt_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
