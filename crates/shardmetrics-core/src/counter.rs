//! Monotonic counter accumulator.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running non-negative total for one key within one generation.
#[derive(Debug, Default)]
pub struct CounterMetric {
    total: AtomicU64,
}

impl CounterMetric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta`, saturating at `u64::MAX`.
    pub fn inc(&self, delta: u64) {
        if delta == 0 {
            return;
        }
        let _ = self
            .total
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                Some(cur.saturating_add(delta))
            });
    }

    pub fn count(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    pub(crate) fn into_count(self) -> u64 {
        self.total.into_inner()
    }
}
