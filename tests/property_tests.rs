//! Property-based tests for structured_log_core using proptest

use proptest::prelude::*;
use structured_log_core::prelude::*;
use structured_log_core::{Complex, IpPrefix};
use std::net::{IpAddr, Ipv4Addr};

// ============================================================================
// Value Tests
// ============================================================================

proptest! {
    /// Signed integers keep their exact value and kind
    #[test]
    fn test_int64_value_preserved(n in any::<i64>()) {
        let value = Value::from(n);
        prop_assert_eq!(value.kind(), Kind::Int64);
        prop_assert_eq!(value.as_i64().unwrap(), n);
        prop_assert!(value.as_u64().is_err());
    }

    #[test]
    fn test_uint64_value_preserved(n in any::<u64>()) {
        let value = Value::capture(n);
        prop_assert_eq!(value.kind(), Kind::Uint64);
        prop_assert_eq!(value.as_u64().unwrap(), n);
    }

    /// Floats keep their bit pattern, including NaN payloads and -0.0
    #[test]
    fn test_float_bits_preserved(bits in any::<u64>()) {
        let f = f64::from_bits(bits);
        let value = Value::from(f);
        prop_assert_eq!(value.as_f64().unwrap().to_bits(), bits);
    }

    #[test]
    fn test_complex_preserved(re in any::<f64>(), im in any::<f64>()) {
        let value = Value::from(Complex { re, im });
        let out = value.as_complex().unwrap();
        prop_assert_eq!(out.re.to_bits(), re.to_bits());
        prop_assert_eq!(out.im.to_bits(), im.to_bits());
    }

    /// Strings survive capture unchanged
    #[test]
    fn test_string_capture(s in ".*") {
        let value = Value::capture(s.clone());
        prop_assert_eq!(value.kind(), Kind::String);
        prop_assert_eq!(value.as_str().unwrap(), s.as_str());
    }

    /// IPv4 prefixes accept exactly 0..=32
    #[test]
    fn test_ipv4_prefix_bounds(octets in any::<[u8; 4]>(), len in 0u8..=64) {
        let addr = IpAddr::V4(Ipv4Addr::from(octets));
        let prefix = IpPrefix::new(addr, len);
        prop_assert_eq!(prefix.is_ok(), len <= 32);
    }
}

// ============================================================================
// Level Tests
// ============================================================================

proptest! {
    /// Every i32 level renders to text that parses back to itself
    #[test]
    fn test_level_display_roundtrip(n in any::<i32>()) {
        let level = Level(n);
        let parsed: Level = level.to_string().parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    /// Level ordering is integer ordering
    #[test]
    fn test_level_ordering(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(Level(a).cmp(&Level(b)), a.cmp(&b));
        prop_assert_eq!(Level(a).is_enabled_at(Level(b)), a >= b);
    }

    /// The rendered anchor is never farther than any other anchor
    #[test]
    fn test_nearest_anchor_is_nearest(n in -200i32..200) {
        let (_, _, offset) = Level(n).nearest_anchor().unwrap();
        for (anchor, _) in Level::ANCHORS {
            prop_assert!(offset.abs() <= (i64::from(n) - i64::from(anchor.0)).abs());
        }
    }

    /// Parsing is case-insensitive on anchor names
    #[test]
    fn test_level_parse_case_insensitive(idx in 0usize..10, upper in any::<bool>()) {
        let (level, name) = Level::ANCHORS[idx];
        let text = if upper { name.to_uppercase() } else { name.to_lowercase() };
        prop_assert_eq!(text.parse::<Level>().unwrap(), level);
    }
}

// ============================================================================
// Logger Tests
// ============================================================================

proptest! {
    /// Deriving never changes the parent's fields
    #[test]
    fn test_with_field_is_non_destructive(count in 0usize..12) {
        let base = Logger::default().with_field("base", true);
        let mut derived = base.clone();
        for i in 0..count {
            derived = derived.with_field("n", i as u64);
        }
        prop_assert_eq!(base.fields().len(), 1);
        prop_assert_eq!(derived.fields().len(), count + 1);
    }

    /// Namespaces join with dots, skipping empty segments
    #[test]
    fn test_namespace_join(parts in prop::collection::vec("[a-z]{0,6}", 1..6)) {
        let mut logger = Logger::default();
        for part in &parts {
            logger = logger.with_namespace(part);
        }
        let expected: Vec<&str> = parts.iter().map(String::as_str).filter(|p| !p.is_empty()).collect();
        let expected = if expected.is_empty() { None } else { Some(expected.join(".")) };
        prop_assert_eq!(logger.namespace().map(str::to_string), expected);
    }
}
