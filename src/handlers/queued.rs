//! Queue in front of another handler
//!
//! [`QueuedHandler`] hands events to a bounded channel and lets a single worker
//! thread write them to the wrapped handler. Callers never wait on the wrapped
//! sink unless the overflow policy says so.
//!
//! Events at [`Level::ERROR`] and above are never dropped: when the queue is
//! full they are written synchronously on the caller's thread.

use crate::core::{
    CloseState, Event, Handler, Level, LogPriority, LoggerError, OverflowCallback,
    OverflowPolicy, QueueMetrics, Result,
};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default wait for the worker to drain when the handler is dropped unclosed
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default wait for `flush` to be acknowledged by the worker
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

const BATCH_SIZE: usize = 50;

enum Message {
    Event(Box<Event>),
    Flush(Sender<Result<()>>),
}

pub struct QueuedHandler {
    inner: Arc<dyn Handler>,
    sender: RwLock<Option<Sender<Message>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    metrics: Arc<QueueMetrics>,
    capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    flush_timeout: Duration,
    shutdown_timeout: Duration,
    state: CloseState,
}

impl QueuedHandler {
    /// Wrap `inner` with a queue of `capacity` events and the default policy
    pub fn new(inner: Arc<dyn Handler>, capacity: usize) -> Result<Self> {
        Self::builder().capacity(capacity).build(inner)
    }

    #[must_use]
    pub fn builder() -> QueuedHandlerBuilder {
        QueuedHandlerBuilder::new()
    }

    pub fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow_policy(&self) -> &OverflowPolicy {
        &self.overflow_policy
    }

    pub fn inner(&self) -> &Arc<dyn Handler> {
        &self.inner
    }

    fn spawn_worker(
        inner: Arc<dyn Handler>,
        receiver: Receiver<Message>,
        metrics: Arc<QueueMetrics>,
    ) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("log-queue".to_string())
            .spawn(move || {
                let mut batch = Vec::with_capacity(BATCH_SIZE);
                // Exits once every sender is gone and the queue is drained
                while let Ok(first) = receiver.recv() {
                    batch.push(first);
                    while batch.len() < BATCH_SIZE {
                        match receiver.try_recv() {
                            Ok(message) => batch.push(message),
                            Err(_) => break,
                        }
                    }
                    Self::process_batch(inner.as_ref(), &mut batch, &metrics);
                }
            })?;
        Ok(handle)
    }

    /// Write a batch in arrival order, isolating panics in the wrapped handler.
    fn process_batch(inner: &dyn Handler, batch: &mut Vec<Message>, metrics: &QueueMetrics) {
        let mut wrote = false;
        for message in batch.drain(..) {
            match message {
                Message::Event(event) => {
                    wrote = true;
                    match catch_unwind(AssertUnwindSafe(|| inner.write(&event))) {
                        Ok(Ok(())) => {
                            metrics.record_written();
                        }
                        Ok(Err(e)) => {
                            metrics.record_write_error();
                            eprintln!("[LOGGER ERROR] Handler '{}' failed: {}", inner.name(), e);
                        }
                        Err(panic) => {
                            metrics.record_write_error();
                            eprintln!(
                                "[LOGGER CRITICAL] Handler '{}' panicked: {}. \
                                 The queue keeps running.",
                                inner.name(),
                                panic_message(panic.as_ref())
                            );
                        }
                    }
                }
                Message::Flush(reply) => {
                    wrote = false;
                    let result = catch_unwind(AssertUnwindSafe(|| inner.flush())).unwrap_or_else(
                        |panic| {
                            Err(LoggerError::handler_write(
                                inner.name(),
                                format!("panicked during flush: {}", panic_message(panic.as_ref())),
                            ))
                        },
                    );
                    let _ = reply.send(result);
                }
            }
        }

        // Flush after each batch to ensure timely writes
        if wrote {
            match catch_unwind(AssertUnwindSafe(|| inner.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_handler_closed() => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Handler '{}' flush failed: {}", inner.name(), e);
                }
                Err(panic) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Handler '{}' panicked during flush: {}",
                        inner.name(),
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
    }

    fn handle_overflow(&self, sender: &Sender<Message>, message: Message, event: &Event) -> Result<()> {
        self.metrics.record_queue_full();

        // Critical events are never dropped
        if LogPriority::for_level(event.level()) == LogPriority::Critical {
            self.metrics.record_critical_preserved();
            return self.inner.write(event);
        }

        match &self.overflow_policy {
            OverflowPolicy::DropNewest => {
                let dropped = self.metrics.record_dropped() + 1;
                Err(LoggerError::queue_overflow(dropped))
            }
            OverflowPolicy::Block => {
                self.metrics.record_block();
                sender
                    .send(message)
                    .map_err(|_| LoggerError::HandlerClosed)?;
                self.metrics.record_enqueued();
                Ok(())
            }
            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match sender.send_timeout(message, *timeout) {
                    Ok(()) => {
                        self.metrics.record_enqueued();
                        Ok(())
                    }
                    Err(SendTimeoutError::Timeout(_)) => self.alert_and_drop(),
                    Err(SendTimeoutError::Disconnected(_)) => Err(LoggerError::HandlerClosed),
                }
            }
            OverflowPolicy::AlertAndDrop => self.alert_and_drop(),
        }
    }

    fn alert_and_drop(&self) -> Result<()> {
        let dropped = self.metrics.record_dropped() + 1;

        // Alert on first drop and periodically thereafter
        if dropped == 1 || dropped % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} events dropped. \
                 Consider increasing the capacity or using a different overflow policy.",
                dropped
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped);
            }
        }
        Err(LoggerError::queue_overflow(dropped))
    }

    /// Wait for the worker to exit, polling so a stuck sink cannot hang the caller
    fn join_worker(&self, timeout: Duration) -> Result<()> {
        let Some(handle) = self.worker.lock().take() else {
            return Ok(());
        };
        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Queue worker panicked during shutdown: {:?}", e);
                    return Err(LoggerError::other("queue worker panicked"));
                }
                return Ok(());
            }
            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Queue worker did not finish within {:?}. \
                     Some events may be lost.",
                    timeout
                );
                return Err(LoggerError::timeout("draining the event queue", timeout));
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Handler for QueuedHandler {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn write(&self, event: &Event) -> Result<()> {
        self.state.ensure_open()?;
        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            return Err(LoggerError::HandlerClosed);
        };

        match sender.try_send(Message::Event(Box::new(event.clone()))) {
            Ok(()) => {
                self.metrics.record_enqueued();
                Ok(())
            }
            Err(TrySendError::Full(message)) => self.handle_overflow(sender, message, event),
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::HandlerClosed),
        }
    }

    /// Wait until everything queued before this call reached the wrapped
    /// handler and it flushed, or until the flush timeout expires.
    fn flush(&self) -> Result<()> {
        self.state.ensure_open()?;
        let sender = self
            .sender
            .read()
            .as_ref()
            .cloned()
            .ok_or(LoggerError::HandlerClosed)?;

        let deadline = Instant::now() + self.flush_timeout;
        let (reply_tx, reply_rx) = bounded(1);
        match sender.send_deadline(Message::Flush(reply_tx), deadline) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                return Err(LoggerError::timeout("flushing queued events", self.flush_timeout))
            }
            Err(SendTimeoutError::Disconnected(_)) => return Err(LoggerError::HandlerClosed),
        }
        drop(sender);

        match reply_rx.recv_deadline(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                Err(LoggerError::timeout("flushing queued events", self.flush_timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(LoggerError::other("queue worker stopped")),
        }
    }

    /// Stop accepting events, drain the queue, then close the wrapped handler.
    fn close(&self) -> Result<()> {
        self.state.close()?;
        // Dropping the only sender lets the worker drain and exit
        drop(self.sender.write().take());

        let mut errors = Vec::new();
        if let Err(e) = self.join_worker(self.shutdown_timeout) {
            errors.push(e);
        }
        if let Err(e) = self.inner.close() {
            errors.push(e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Queue closed with {} dropped events (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
        LoggerError::aggregate(errors)
    }

    fn name(&self) -> &str {
        "queued"
    }
}

impl Drop for QueuedHandler {
    fn drop(&mut self) {
        if !self.state.is_closed() {
            if let Err(e) = self.close() {
                if !e.is_handler_closed() {
                    eprintln!("[LOGGER ERROR] Failed to close queued handler: {}", e);
                }
            }
        }
    }
}

impl std::fmt::Debug for QueuedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedHandler")
            .field("inner", &self.inner.name())
            .field("capacity", &self.capacity)
            .field("overflow_policy", &self.overflow_policy)
            .field("closed", &self.state.is_closed())
            .finish()
    }
}

/// Builder for [`QueuedHandler`]
///
/// ```
/// use structured_log_core::handlers::{DiscardHandler, QueuedHandler};
/// use structured_log_core::{Handler, Level, OverflowPolicy};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let handler = QueuedHandler::builder()
///     .capacity(256)
///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
///     .on_overflow(Arc::new(|count| eprintln!("{} events dropped", count)))
///     .build(Arc::new(DiscardHandler::new(Level::INFO)))
///     .unwrap();
/// handler.close().unwrap();
/// ```
pub struct QueuedHandlerBuilder {
    capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    flush_timeout: Duration,
    shutdown_timeout: Duration,
}

impl QueuedHandlerBuilder {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
            on_overflow: None,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Queue capacity in events; at least one
    #[must_use = "builder methods return a new value"]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Called with the total drop count on the first drop and every 1000th after
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Start the worker thread and wrap `inner`
    pub fn build(self, inner: Arc<dyn Handler>) -> Result<QueuedHandler> {
        let (sender, receiver) = bounded(self.capacity);
        let metrics = Arc::new(QueueMetrics::new());
        let worker = QueuedHandler::spawn_worker(Arc::clone(&inner), receiver, Arc::clone(&metrics))?;

        Ok(QueuedHandler {
            inner,
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            metrics,
            capacity: self.capacity,
            overflow_policy: self.overflow_policy,
            on_overflow: self.on_overflow,
            flush_timeout: self.flush_timeout,
            shutdown_timeout: self.shutdown_timeout,
            state: CloseState::new(),
        })
    }
}

impl Default for QueuedHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
