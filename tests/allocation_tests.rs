//! Heap allocation checks for the hot logging path
//!
//! A counting global allocator records allocations made on the current
//! thread, so tests running in parallel do not disturb each other.

use structured_log_core::prelude::*;
use structured_log_core::INLINE_FIELDS;
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn allocations_during<R>(f: impl FnOnce() -> R) -> (usize, R) {
    let before = ALLOCATIONS.with(Cell::get);
    let out = f();
    let after = ALLOCATIONS.with(Cell::get);
    (after - before, out)
}

fn logger() -> Logger {
    Logger::new(Arc::new(DiscardHandler::new(Level::TRACE)))
}

#[test]
fn test_value_construction_does_not_allocate() {
    let (count, values) = allocations_during(|| {
        [
            Value::from(42i64),
            Value::from(7u32),
            Value::from(1.5f64),
            Value::from(true),
            Value::from("static text"),
            Value::from(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            Value::capture(-3i16),
            Value::capture(Some(9u8)),
            Value::capture(None::<f32>),
        ]
    });
    assert_eq!(count, 0);
    assert_eq!(values[6].as_i64().unwrap(), -3);
    assert!(values[8].is_null());
}

#[test]
fn test_inline_fields_do_not_allocate() {
    let base = logger();
    let (count, derived) = allocations_during(|| {
        base.with([
            field("a", 1i64),
            field("b", "two"),
            field("c", 3.0f64),
            field("d", false),
            field("e", 5u64),
        ])
    });
    assert_eq!(INLINE_FIELDS, 5);
    assert_eq!(count, 0);
    assert_eq!(derived.fields().len(), 5);
}

#[test]
fn test_emission_does_not_allocate() {
    let logger = logger().with([field("user", "alice"), field("attempt", 2u8)]);
    // warm up lazily initialized state
    logger.info("warm up");

    let (count, ()) = allocations_during(|| {
        logger.info("static message");
        logger.log(Level(15), "custom level");
        logger.log_fmt(Level::DEBUG, format_args!("no arguments"));
    });
    assert_eq!(count, 0);
}

#[test]
fn test_disabled_level_does_not_allocate() {
    let logger = Logger::new(Arc::new(DiscardHandler::new(Level::ERROR)));
    let (count, ()) = allocations_during(|| {
        logger.log_fmt(Level::DEBUG, format_args!("value {}", 42));
    });
    assert_eq!(count, 0);
}

#[test]
fn test_owned_text_is_shared_not_copied() {
    let base = logger()
        .with_field("user", String::from("alice"))
        .with_field(String::from("region"), Value::string(String::from("eu-west")))
        .with_namespace("auth");
    base.info("warm up");

    let (count, child) = allocations_during(|| base.with_field("attempt", 1u8));
    assert_eq!(count, 0);

    let (count, ()) = allocations_during(|| child.info("static"));
    assert_eq!(count, 0);

    let (count, copy) = allocations_during(|| child.clone());
    assert_eq!(count, 0);
    assert_eq!(copy.fields()[0].value.as_str().unwrap(), "alice");
    assert_eq!(copy.fields()[1].key, "region");
}

#[test]
fn test_spilled_fields_allocate() {
    let base = logger();
    let (count, derived) = allocations_during(|| {
        base.with((0..INLINE_FIELDS as u64 + 1).map(|i| field("n", i)))
    });
    assert!(count > 0);
    assert_eq!(derived.fields().len(), INLINE_FIELDS + 1);
}
