//! Criterion benchmarks for structured_log_core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use structured_log_core::handlers::QueuedHandler;
use structured_log_core::prelude::*;
use std::sync::Arc;

fn discard_logger(threshold: Level) -> Logger {
    Logger::new(Arc::new(DiscardHandler::new(threshold)))
}

// ============================================================================
// Value Benchmarks
// ============================================================================

fn bench_value_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_construction");
    group.throughput(Throughput::Elements(1));

    group.bench_function("from_i64", |b| {
        b.iter(|| black_box(Value::from(black_box(42i64))));
    });

    group.bench_function("from_static_str", |b| {
        b.iter(|| black_box(Value::from(black_box("static"))));
    });

    group.bench_function("capture_recognized", |b| {
        b.iter(|| black_box(Value::capture(black_box(3.5f64))));
    });

    group.bench_function("capture_any", |b| {
        b.iter(|| black_box(Value::capture(black_box(vec![1u8, 2, 3]))));
    });

    group.finish();
}

// ============================================================================
// Logger Derivation Benchmarks
// ============================================================================

fn bench_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("derivation");
    group.throughput(Throughput::Elements(1));

    let logger = discard_logger(Level::INFO);

    group.bench_function("with_field", |b| {
        b.iter(|| black_box(logger.with_field("key", black_box(1u64))));
    });

    group.bench_function("with_five_inline", |b| {
        b.iter(|| {
            black_box(logger.with([
                field("a", 1i64),
                field("b", "two"),
                field("c", 3.0f64),
                field("d", true),
                field("e", 5u64),
            ]))
        });
    });

    group.bench_function("with_spilled", |b| {
        b.iter(|| black_box(logger.with((0..8u64).map(|i| field("n", i)))));
    });

    group.bench_function("with_namespace", |b| {
        let base = logger.with_namespace("app");
        b.iter(|| black_box(base.with_namespace(black_box("http"))));
    });

    group.finish();
}

// ============================================================================
// Emission Benchmarks
// ============================================================================

fn bench_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission");
    group.throughput(Throughput::Elements(1));

    let logger = discard_logger(Level::INFO).with([field("user", "alice"), field("id", 7u64)]);

    group.bench_function("info_enabled", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("debug_disabled", |b| {
        b.iter(|| logger.debug(black_box("Debug message")));
    });

    group.bench_function("log_fmt_disabled", |b| {
        b.iter(|| logger.log_fmt(Level::TRACE, format_args!("value {}", black_box(42))));
    });

    let traced = logger.with_caller();
    group.bench_function("info_with_caller", |b| {
        b.iter(|| traced.info(black_box("Info message")));
    });

    group.finish();
}

fn bench_queued(c: &mut Criterion) {
    let mut group = c.benchmark_group("queued");
    group.throughput(Throughput::Elements(1));

    let queued = Arc::new(
        QueuedHandler::builder()
            .capacity(10_000)
            .overflow_policy(OverflowPolicy::DropNewest)
            .build(Arc::new(DiscardHandler::new(Level::TRACE)))
            .expect("queue"),
    );
    let logger = Logger::new(queued.clone());

    group.bench_function("info", |b| {
        b.iter(|| logger.info(black_box("Queued message")));
    });

    group.finish();
    let _ = queued.close();
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let config = FormatterConfig::default();
    let event = Event::new(Level::WARNING, "request failed")
        .with_namespace("http")
        .with_field(field("status", 503u16))
        .with_field(field("path", "/api/v1/items"))
        .with_context(TracingContext::start());

    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Logfmt] {
        group.bench_function(format!("{:?}", format).to_lowercase(), |b| {
            b.iter(|| black_box(format.format(black_box(&event), &config)));
        });
    }

    group.finish();
}

// ============================================================================
// Level Benchmarks
// ============================================================================

fn bench_level_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_text");

    group.bench_function("display_anchor", |b| {
        b.iter(|| black_box(black_box(Level::NOTICE).to_string()));
    });

    group.bench_function("display_offset", |b| {
        b.iter(|| black_box(black_box(Level(37)).to_string()));
    });

    group.bench_function("parse", |b| {
        b.iter(|| black_box(black_box("Warning+3").parse::<Level>()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_value_construction,
    bench_derivation,
    bench_emission,
    bench_queued,
    bench_encoding,
    bench_level_text,
);
criterion_main!(benches);
