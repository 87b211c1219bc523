//! Integration tests for structured_log_core
//!
//! These tests verify:
//! - Namespace joining and logger immutability
//! - Handler fan-out and close semantics
//! - Log injection prevention in file output
//! - Queued delivery to a file
//! - The line bridge

use structured_log_core::handlers::{MockHandler, MultiHandler, QueuedHandler, WriterHandler};
use structured_log_core::prelude::*;
use structured_log_core::{LineBridge, LoggerError, TracingContext};
use std::fs;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;

fn mock(threshold: Level) -> Arc<MockHandler> {
    Arc::new(MockHandler::new(threshold))
}

#[test]
fn test_namespace_join() {
    let handler = mock(Level::TRACE);
    let base = Logger::new(handler.clone());

    let child = base.with_namespace("db").with_namespace("pool").with_namespace("");
    child.info("connected");

    assert_eq!(child.namespace(), Some("db.pool"));
    assert_eq!(handler.last_event().unwrap().namespace(), Some("db.pool"));
}

#[test]
fn test_derivation_leaves_parent_untouched() {
    let handler = mock(Level::TRACE);
    let base = Logger::new(handler.clone()).with_field("service", "api");

    let derived = base
        .with_field("request_id", 42u64)
        .with_namespace("http")
        .with_ctx(TracingContext::start());

    assert_eq!(base.fields().len(), 1);
    assert!(base.namespace().is_none());
    assert!(base.context().is_none());
    assert_eq!(derived.fields().len(), 2);

    base.info("from base");
    derived.info("from derived");

    let events = handler.events();
    assert_eq!(events[0].fields().len(), 1);
    assert!(events[0].context().is_none());
    assert_eq!(events[1].field("request_id").unwrap().value.as_u64().unwrap(), 42);
    assert!(events[1].context().is_some());
}

#[test]
fn test_concurrent_derivation() {
    let handler = mock(Level::TRACE);
    let base = Logger::new(handler.clone()).with_namespace("worker");

    std::thread::scope(|s| {
        for id in 0..4u64 {
            let base = &base;
            s.spawn(move || {
                let logger = base.with_field("id", id);
                for _ in 0..25 {
                    logger.info("tick");
                }
            });
        }
    });

    assert_eq!(handler.events_written(), 100);
    assert!(handler
        .events()
        .iter()
        .all(|e| e.namespace() == Some("worker") && e.fields().len() == 1));
}

#[test]
fn test_closed_handler_counts_nothing() {
    let handler = mock(Level::TRACE);
    let logger = Logger::new(handler.clone());

    logger.info("before");
    handler.close().unwrap();

    let err = logger.try_log(Level::INFO, "after").unwrap_err();
    assert!(err.is_handler_closed());
    assert!(handler.close().unwrap_err().is_handler_closed());
    assert!(handler.flush().unwrap_err().is_handler_closed());

    assert_eq!(handler.write_calls(), 1);
    assert_eq!(handler.events_written(), 1);
    assert_eq!(handler.flush_calls(), 0);
}

#[test]
fn test_multi_handler_fan_out_by_level() {
    let a = mock(Level::INFO);
    let b = Arc::new(MockHandler::failing(Level::ERROR));
    let multi = Arc::new(MultiHandler::new(vec![a.clone() as Arc<dyn Handler>, b.clone()]));
    let logger = Logger::new(multi);

    assert!(logger.try_log(Level::WARNING, "only a").is_ok());
    assert_eq!(a.write_calls(), 1);
    assert_eq!(b.write_calls(), 0);

    let err = logger.try_log(Level::ERROR, "both").unwrap_err();
    assert_eq!(a.write_calls(), 2);
    assert_eq!(b.write_calls(), 1);
    assert!(err.to_string().contains("mock failure"));
}

#[test]
fn test_invalid_logger() {
    let logger = Logger::default();
    assert!(!logger.is_valid());
    assert!(!logger.enabled(Level::FATAL));
    assert!(matches!(
        logger.try_log(Level::ERROR, "nowhere"),
        Err(LoggerError::LoggerInvalid)
    ));
    assert!(matches!(Logger::try_new(None), Err(LoggerError::LoggerInvalid)));

    // must not panic
    logger.info("dropped");
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let handler = Arc::new(WriterHandler::open(&log_file, Level::INFO).expect("open"));
    let logger = Logger::new(handler.clone());

    logger.info("User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation");
    handler.close().expect("close");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
}

#[test]
fn test_json_file_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("events.json");

    let handler = Arc::new(
        WriterHandler::open(&log_file, Level::DEBUG)
            .expect("open")
            .with_output_format(OutputFormat::Json),
    );
    let logger = Logger::new(handler.clone())
        .with_namespace("billing")
        .with([field("invoice", 1001i64), field("paid", true)])
        .with_error(std::io::Error::new(std::io::ErrorKind::Other, "card declined"));

    logger.warning("payment failed");
    handler.close().expect("close");

    let content = fs::read_to_string(&log_file).expect("read");
    let json: serde_json::Value = serde_json::from_str(content.trim()).expect("valid json");
    assert_eq!(json["level"], "WARNING");
    assert_eq!(json["namespace"], "billing");
    assert_eq!(json["message"], "payment failed");
    assert_eq!(json["fields"]["invoice"], 1001);
    assert_eq!(json["fields"]["paid"], true);
    assert_eq!(json["error"], "card declined");
}

#[test]
fn test_queued_file_delivery() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("queued.log");

    let file = Arc::new(WriterHandler::open(&log_file, Level::TRACE).expect("open"));
    let queued = Arc::new(QueuedHandler::new(file, 256).expect("queue"));
    let logger = Logger::new(queued.clone());

    for i in 0..100 {
        logger.log_fmt(Level::INFO, format_args!("message {}", i));
    }
    logger.flush().expect("flush");
    queued.close().expect("close");

    let content = fs::read_to_string(&log_file).expect("read");
    assert_eq!(content.lines().count(), 100);
    assert!(content.lines().last().unwrap().ends_with("message 99"));
    assert_eq!(queued.metrics().written(), 100);
}

#[test]
fn test_line_bridge_through_writer() {
    let handler = Arc::new(
        WriterHandler::new(Vec::new(), Level::INFO)
            .with_formatter_config(FormatterConfig::new().with_include_timestamp(false).shared()),
    );
    let logger = Logger::new(handler.clone()).with_namespace("legacy");
    let mut bridge = LineBridge::new(logger, Level::WARNING).with_location_parsing(true);

    writeln!(bridge, "vendor/lib.rs:12: deprecated call").unwrap();
    bridge.flush().unwrap();

    let output = handler.with_writer(|buf| String::from_utf8_lossy(buf).into_owned());
    assert_eq!(
        output,
        "[WARNING] legacy: deprecated call caller=vendor/lib.rs:12\n"
    );
}

#[test]
fn test_builder_round_trip() {
    let handler = mock(Level::TRACE);
    let logger = Logger::builder()
        .handler(handler.clone())
        .namespace("app")
        .field(field("version", "1.2.0"))
        .build()
        .unwrap();

    logger.success("deployed");
    let event = handler.last_event().unwrap();
    assert_eq!(event.level(), Level::SUCCESS);
    assert_eq!(event.namespace(), Some("app"));
    assert_eq!(event.field("version").unwrap().value.as_str().unwrap(), "1.2.0");
}
