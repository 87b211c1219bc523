//! Severity levels
//!
//! A [`Level`] is a signed integer. A sparse set of named anchors sits on the
//! scale; any other value renders relative to its nearest anchor, e.g.
//! `Warning+5` or `Trace-10`.

use super::error::LoggerError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(pub i32);

impl Level {
    pub const TRACE: Level = Level(-30);
    pub const DEBUG: Level = Level(-20);
    pub const VERBOSE: Level = Level(-10);
    pub const INFO: Level = Level(0);
    pub const SUCCESS: Level = Level(10);
    pub const NOTICE: Level = Level(20);
    pub const WARNING: Level = Level(30);
    pub const ERROR: Level = Level(40);
    pub const CRITICAL: Level = Level(50);
    pub const FATAL: Level = Level(90);

    /// Named anchors in ascending order.
    pub const ANCHORS: [(Level, &'static str); 10] = [
        (Level::TRACE, "Trace"),
        (Level::DEBUG, "Debug"),
        (Level::VERBOSE, "Verbose"),
        (Level::INFO, "Info"),
        (Level::SUCCESS, "Success"),
        (Level::NOTICE, "Notice"),
        (Level::WARNING, "Warning"),
        (Level::ERROR, "Error"),
        (Level::CRITICAL, "Critical"),
        (Level::FATAL, "Fatal"),
    ];

    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    /// Nearest anchor and the signed distance from it.
    ///
    /// Ties resolve to the lower anchor.
    pub fn nearest_anchor(self) -> Option<(Level, &'static str, i64)> {
        let mut best: Option<(Level, &'static str, i64)> = None;
        for (anchor, name) in Level::ANCHORS {
            let offset = i64::from(self.0) - i64::from(anchor.0);
            match best {
                Some((_, _, current)) if offset.abs() >= current.abs() => {}
                _ => best = Some((anchor, name, offset)),
            }
        }
        best
    }

    /// Bare anchor name when the level sits exactly on an anchor.
    pub fn anchor_name(self) -> Option<&'static str> {
        Level::ANCHORS
            .iter()
            .find(|(anchor, _)| *anchor == self)
            .map(|(_, name)| *name)
    }

    /// Whether this level is at or above `threshold`.
    pub fn is_enabled_at(self, threshold: Level) -> bool {
        self >= threshold
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self.nearest_anchor().map(|(anchor, _, _)| anchor) {
            Some(Level::TRACE) => BrightBlack,
            Some(Level::DEBUG) | Some(Level::VERBOSE) => Blue,
            Some(Level::INFO) => White,
            Some(Level::SUCCESS) => Green,
            Some(Level::NOTICE) => Cyan,
            Some(Level::WARNING) => Yellow,
            Some(Level::ERROR) => Red,
            _ => BrightRed,
        }
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nearest_anchor() {
            Some((_, name, 0)) => f.write_str(name),
            Some((_, name, offset)) if offset > 0 => write!(f, "{}+{}", name, offset),
            Some((_, name, offset)) => write!(f, "{}-{}", name, -offset),
            None => write!(f, "Level({})", self.0),
        }
    }
}

fn parse_anchor(name: &str) -> Option<Level> {
    if name.eq_ignore_ascii_case("warn") {
        return Some(Level::WARNING);
    }
    Level::ANCHORS
        .iter()
        .find(|(_, anchor)| anchor.eq_ignore_ascii_case(name))
        .map(|(level, _)| *level)
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || LoggerError::InvalidLevel(s.to_string());

        if let Ok(value) = text.parse::<i32>() {
            return Ok(Level(value));
        }

        // offset forms: Name+N / Name-N
        if let Some(pos) = text.find(['+', '-']) {
            let (name, rest) = text.split_at(pos);
            let anchor = parse_anchor(name).ok_or_else(invalid)?;
            let magnitude: i32 = rest[1..].parse().map_err(|_| invalid())?;
            let offset = if rest.starts_with('-') {
                magnitude.checked_neg().ok_or_else(invalid)?
            } else {
                magnitude
            };
            return anchor.0.checked_add(offset).map(Level).ok_or_else(invalid);
        }

        parse_anchor(text).ok_or_else(invalid)
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a level name, an anchor offset such as \"Info+5\", or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Level, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Level, E> {
                i32::try_from(v).map(Level).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Level, E> {
                i32::try_from(v).map(Level).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}
