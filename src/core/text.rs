//! Shared text for field keys, namespaces and string values
//!
//! Loggers are cloned on every derivation, so any text they hold must clone
//! without copying. Static strings are borrowed; owned strings are moved into
//! an `Arc<str>` once and shared from then on.

use serde::{Serialize, Serializer};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
pub enum SharedStr {
    Static(&'static str),
    Shared(Arc<str>),
}

impl SharedStr {
    pub const fn from_static(text: &'static str) -> Self {
        SharedStr::Static(text)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SharedStr::Static(text) => text,
            SharedStr::Shared(text) => text,
        }
    }
}

impl Default for SharedStr {
    fn default() -> Self {
        SharedStr::Static("")
    }
}

impl Deref for SharedStr {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for SharedStr {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for SharedStr {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for SharedStr {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for SharedStr {}

impl PartialEq<str> for SharedStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SharedStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for SharedStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Debug for SharedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for SharedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for SharedStr {
    fn from(text: &'static str) -> Self {
        SharedStr::Static(text)
    }
}

impl From<String> for SharedStr {
    fn from(text: String) -> Self {
        SharedStr::Shared(Arc::from(text))
    }
}

impl From<Box<str>> for SharedStr {
    fn from(text: Box<str>) -> Self {
        SharedStr::Shared(Arc::from(text))
    }
}

impl From<Arc<str>> for SharedStr {
    fn from(text: Arc<str>) -> Self {
        SharedStr::Shared(text)
    }
}

impl From<Cow<'static, str>> for SharedStr {
    fn from(text: Cow<'static, str>) -> Self {
        match text {
            Cow::Borrowed(text) => SharedStr::Static(text),
            Cow::Owned(text) => text.into(),
        }
    }
}

impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_is_borrowed() {
        let text = SharedStr::from("key");
        assert!(matches!(text, SharedStr::Static("key")));
        assert_eq!(text, "key");
    }

    #[test]
    fn test_clone_shares_owned_text() {
        let text = SharedStr::from(String::from("alice"));
        let copy = text.clone();
        match (&text, &copy) {
            (SharedStr::Shared(a), SharedStr::Shared(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("owned text should be shared"),
        }
    }

    #[test]
    fn test_equality_ignores_storage() {
        assert_eq!(SharedStr::from("same"), SharedStr::from(String::from("same")));
        assert_eq!(SharedStr::from(Cow::Owned("x".to_string())).as_str(), "x");
        assert_eq!(SharedStr::default(), "");
    }
}
