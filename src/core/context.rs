//! Tracing context bound to a logger with `with_ctx`

use serde::{Serialize, Serializer};
use std::fmt;

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub [u8; 16]);

        impl $name {
            /// Generate a random, non-zero id
            pub fn random() -> Self {
                loop {
                    let bytes: [u8; 16] = rand::random();
                    if bytes != [0; 16] {
                        return Self(bytes);
                    }
                }
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0; 16]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0 {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

hex_id! {
    /// Trace id for request correlation, rendered as 32 hex digits
    TraceId
}

hex_id! {
    /// Span id for one operation within a trace
    SpanId
}

/// Tracing context for distributed tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TracingContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<SpanId>,
}

impl TracingContext {
    /// Create a new tracing context
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            parent_span_id: None,
        }
    }

    /// Start a new trace with a fresh root span
    pub fn start() -> Self {
        Self::new(TraceId::random(), SpanId::random())
    }

    /// Open a child span in the same trace
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: SpanId::random(),
            parent_span_id: Some(self.span_id),
        }
    }

    /// Set parent span ID
    pub fn with_parent(mut self, parent_span_id: SpanId) -> Self {
        self.parent_span_id = Some(parent_span_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rendering() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0xab;
        bytes[15] = 0x01;
        let id = TraceId(bytes);
        assert_eq!(id.to_string(), "ab000000000000000000000000000001");
        assert_eq!(id.to_string().len(), 32);
    }

    #[test]
    fn test_random_ids_are_non_zero() {
        assert!(!TraceId::random().is_zero());
        assert!(!SpanId::random().is_zero());
        assert!(SpanId::default().is_zero());
    }

    #[test]
    fn test_child_span() {
        let root = TracingContext::start();
        let child = root.child();
        assert_eq!(child.trace_id, root.trace_id);
        assert_ne!(child.span_id, root.span_id);
        assert_eq!(child.parent_span_id, Some(root.span_id));
    }

    #[test]
    fn test_serialization() {
        let ctx = TracingContext::new(TraceId([1; 16]), SpanId([2; 16]));
        let json = serde_json::to_value(ctx).unwrap();
        assert_eq!(json["trace_id"], "01".repeat(16));
        assert_eq!(json["span_id"], "02".repeat(16));
        assert!(json.get("parent_span_id").is_none());
    }
}
