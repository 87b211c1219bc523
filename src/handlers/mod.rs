//! Handler implementations
//!
//! - [`WriterHandler`]: encoded events to any `io::Write`, or a file
//! - [`ConsoleHandler`]: stdout/stderr with optional colors
//! - [`QueuedHandler`]: bounded queue and worker thread in front of another handler
//! - [`MultiHandler`]: fan-out to several handlers
//! - [`DiscardHandler`]: accepts and drops everything
//! - [`MockHandler`]: records events for tests

#[cfg(feature = "console")]
pub mod console;
pub mod discard;
pub mod mock;
pub mod multi;
pub mod queued;
pub mod writer;

#[cfg(feature = "console")]
pub use console::ConsoleHandler;
pub use discard::DiscardHandler;
pub use mock::MockHandler;
pub use multi::MultiHandler;
pub use queued::{
    QueuedHandler, QueuedHandlerBuilder, DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use writer::WriterHandler;
