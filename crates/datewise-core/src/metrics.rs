//! Global atomic counters for datewise runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a batch).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    engine_calls: AtomicU64,
    tool_calls: AtomicU64,
    items_completed: AtomicU64,
    items_failed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            engine_calls: AtomicU64::new(0),
            tool_calls: AtomicU64::new(0),
            items_completed: AtomicU64::new(0),
            items_failed: AtomicU64::new(0),
        }
    }

    pub fn inc_engine_calls(&self) {
        self.engine_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "engine_calls", "counter incremented");
    }

    pub fn inc_tool_calls(&self) {
        self.tool_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tool_calls", "counter incremented");
    }

    pub fn inc_items_completed(&self) {
        self.items_completed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "items_completed", "counter incremented");
    }

    pub fn inc_items_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "items_failed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            engine_calls = self.engine_calls(),
            tool_calls = self.tool_calls(),
            items_completed = self.items_completed(),
            items_failed = self.items_failed(),
        );
    }

    pub fn engine_calls(&self) -> u64 {
        self.engine_calls.load(Ordering::Relaxed)
    }

    pub fn tool_calls(&self) -> u64 {
        self.tool_calls.load(Ordering::Relaxed)
    }

    pub fn items_completed(&self) -> u64 {
        self.items_completed.load(Ordering::Relaxed)
    }

    pub fn items_failed(&self) -> u64 {
        self.items_failed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        assert_eq!(m.engine_calls(), 0);
        m.inc_engine_calls();
        m.inc_engine_calls();
        assert_eq!(m.engine_calls(), 2);

        m.inc_tool_calls();
        assert_eq!(m.tool_calls(), 1);

        m.inc_items_completed();
        m.inc_items_failed();
        m.inc_items_failed();
        assert_eq!(m.items_completed(), 1);
        assert_eq!(m.items_failed(), 2);
    }
}
