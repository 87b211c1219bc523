//! Structured fields

use super::text::SharedStr;
use super::value::Value;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Number of fields a logger or event stores inline before spilling to the heap
pub const INLINE_FIELDS: usize = 5;

/// A `(namespace, key, value)` triple.
///
/// The field namespace is independent of the namespace of the logger that
/// carries it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field {
    pub namespace: Option<SharedStr>,
    pub key: SharedStr,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<SharedStr>, value: impl Into<Value>) -> Self {
        Self {
            namespace: None,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn namespaced(
        namespace: impl Into<SharedStr>,
        key: impl Into<SharedStr>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Key prefixed with the field namespace, e.g. `http.status`
    pub fn qualified_key(&self) -> Cow<'_, str> {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => Cow::Owned(format!("{}.{}", ns, self.key)),
            _ => Cow::Borrowed(self.key.as_str()),
        }
    }
}

/// Shorthand for [`Field::new`]
pub fn field(key: impl Into<SharedStr>, value: impl Into<Value>) -> Field {
    Field::new(key, value)
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.qualified_key(), self.value)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Field", 3)?;
        state.serialize_field("namespace", &self.namespace)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}
