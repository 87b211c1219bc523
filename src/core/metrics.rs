//! Queue metrics for observability
//!
//! Counters maintained by [`QueuedHandler`](crate::handlers::QueuedHandler)
//! so operators can see when the queue overflows or the wrapped sink fails.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a queued handler
///
/// # Example
///
/// ```
/// use structured_log_core::QueueMetrics;
///
/// let metrics = QueueMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_written();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct QueueMetrics {
    /// Events accepted into the queue
    enqueued: AtomicU64,

    /// Events the wrapped handler accepted
    written: AtomicU64,

    /// Events lost to overflow
    dropped_count: AtomicU64,

    /// Events the wrapped handler rejected or panicked on
    write_errors: AtomicU64,

    /// Number of times the queue was found full
    queue_full_events: AtomicU64,

    /// Number of times a producer waited for queue space
    block_events: AtomicU64,

    /// High-severity events written synchronously past a full queue
    critical_preserved: AtomicU64,
}

impl QueueMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            critical_preserved: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn critical_preserved(&self) -> u64 {
        self.critical_preserved.load(Ordering::Relaxed)
    }

    /// Record an accepted event; returns the previous count
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_critical_preserved(&self) -> u64 {
        self.critical_preserved.fetch_add(1, Ordering::Relaxed)
    }

    /// Events accepted by the queue but not yet handed to the wrapped handler
    pub fn pending(&self) -> u64 {
        self.enqueued()
            .saturating_sub(self.written() + self.write_errors())
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no events have been seen.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.enqueued() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.written.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        self.queue_full_events.store(0, Ordering::Relaxed);
        self.block_events.store(0, Ordering::Relaxed);
        self.critical_preserved.store(0, Ordering::Relaxed);
    }
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for QueueMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            write_errors: AtomicU64::new(self.write_errors()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
            block_events: AtomicU64::new(self.block_events()),
            critical_preserved: AtomicU64::new(self.critical_preserved()),
        }
    }
}
