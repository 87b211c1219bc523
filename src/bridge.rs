//! Bridge from line-oriented loggers
//!
//! [`LineBridge`] implements `std::io::Write`, so anything that writes log
//! lines to a writer can feed a [`Logger`]. Each `write` call becomes one
//! event at a fixed level.
//!
//! The bridge only translates bytes. It cannot stop the legacy logger from
//! panicking or exiting the process on its own fatal paths.

use crate::core::{CallerInfo, Level, Logger, LoggerError};
use std::borrow::Cow;
use std::io;

#[derive(Debug, Clone)]
pub struct LineBridge {
    logger: Logger,
    level: Level,
    parse_location: bool,
}

impl LineBridge {
    pub fn new(logger: Logger, level: Level) -> Self {
        Self {
            logger,
            level,
            parse_location: false,
        }
    }

    /// Move a leading `path:line: ` prefix into the event's caller info
    #[must_use]
    pub fn with_location_parsing(mut self, enabled: bool) -> Self {
        self.parse_location = enabled;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

/// Split `src/main.rs:42: message` into a caller record and the message.
fn split_location(line: &str) -> Option<(CallerInfo, &str)> {
    let mut parts = line.splitn(3, ':');
    let file = parts.next()?;
    let lineno: u32 = parts.next()?.trim().parse().ok()?;
    let message = parts.next()?;
    if file.is_empty() {
        return None;
    }
    let message = message.strip_prefix(' ').unwrap_or(message);
    Some((CallerInfo::new(file, lineno, ""), message))
}

impl io::Write for LineBridge {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.logger.is_valid() {
            return Err(io::Error::other(LoggerError::LoggerInvalid));
        }

        let text = String::from_utf8_lossy(buf);
        let line = text.trim_end_matches(['\n', '\r']);

        let (caller, message) = match self.parse_location.then(|| split_location(line)).flatten() {
            Some((caller, message)) => (Some(caller), message),
            None => (None, line),
        };

        self.logger
            .emit_at(self.level, Cow::Owned(message.to_string()), caller)
            .map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.logger.flush().map_err(io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::MockHandler;
    use std::io::Write;
    use std::sync::Arc;

    #[test]
    fn test_each_write_is_one_event() {
        let mock = Arc::new(MockHandler::new(Level::TRACE));
        let mut bridge = LineBridge::new(Logger::new(mock.clone()), Level::NOTICE);

        writeln!(bridge, "legacy line").unwrap();
        bridge.write_all(b"second\r\n").unwrap();

        let events = mock.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message(), "legacy line");
        assert_eq!(events[0].level(), Level::NOTICE);
        assert_eq!(events[1].message(), "second");
    }

    #[test]
    fn test_location_parsing() {
        let mock = Arc::new(MockHandler::new(Level::TRACE));
        let mut bridge =
            LineBridge::new(Logger::new(mock.clone()), Level::INFO).with_location_parsing(true);

        bridge.write_all(b"src/legacy.rs:42: connection reset\n").unwrap();
        bridge.write_all(b"no location here\n").unwrap();

        let events = mock.events();
        assert_eq!(events[0].message(), "connection reset");
        assert_eq!(events[0].caller().file, "src/legacy.rs");
        assert_eq!(events[0].caller().line, 42);
        assert_eq!(events[1].message(), "no location here");
        assert!(!events[1].caller().defined);
    }

    #[test]
    fn test_invalid_logger_is_an_io_error() {
        let mut bridge = LineBridge::new(Logger::default(), Level::INFO);
        let err = bridge.write(b"lost").unwrap_err();
        assert!(err.to_string().contains("no handler"));
    }

    #[test]
    fn test_below_threshold_is_accepted() {
        let mock = Arc::new(MockHandler::new(Level::ERROR));
        let mut bridge = LineBridge::new(Logger::new(mock.clone()), Level::DEBUG);
        assert_eq!(bridge.write(b"quiet").unwrap(), 5);
        assert_eq!(mock.write_calls(), 0);
    }

    #[test]
    fn test_split_location() {
        let (caller, message) = split_location("a/b.rs:7: hi: there").unwrap();
        assert_eq!(caller.file, "a/b.rs");
        assert_eq!(caller.line, 7);
        assert_eq!(message, "hi: there");
        assert!(split_location("plain: text").is_none());
        assert!(split_location(":3: x").is_none());
    }
}
