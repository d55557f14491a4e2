//! Relative-error streaming quantile sketch.
//!
//! `QuantileSketch` absorbs non-negative values in O(1) and answers quantile
//! queries whose result is within the configured relative accuracy (default
//! 1%) of the true empirical quantile, without keeping raw samples.
//!
//! Zero is tracked in its own bucket and reported as 0. Negative and NaN
//! inputs are outside the documented domain and are clamped to zero.

mod mapping;
mod store;

pub use mapping::{CubicMapping, DEFAULT_RELATIVE_ACCURACY};
pub use store::DenseStore;

use crate::error::{MetricsError, Result};

/// Quantiles exported for every latency metric, in export order.
pub const EXPORTED_QUANTILES: [f64; 4] = [0.50, 0.90, 0.95, 0.99];

/// Query and mutation surface shared by the live sketch and its read-only view.
pub trait Histogram {
    /// Record one observation.
    fn add(&mut self, value: f64) -> Result<()>;

    /// Value at quantile `q` (clamped to `[0, 1]`); 0 when empty.
    fn value_at_quantile(&self, q: f64) -> f64;

    /// Several quantiles in one pass; all zeros when empty.
    fn values_at_quantiles(&self, qs: &[f64]) -> Vec<f64>;

    fn count(&self) -> u64;

    /// Running mean; 0 when empty.
    fn average(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct QuantileSketch {
    mapping: CubicMapping,
    store: DenseStore,
    zero_count: u64,
    count: u64,
    sum: f64,
}

impl Default for QuantileSketch {
    fn default() -> Self {
        Self {
            mapping: CubicMapping::default(),
            store: DenseStore::new(),
            zero_count: 0,
            count: 0,
            sum: 0.0,
        }
    }
}

impl QuantileSketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relative_accuracy(relative_accuracy: f64) -> Result<Self> {
        Ok(Self::with_mapping(CubicMapping::new(relative_accuracy)?))
    }

    pub fn with_mapping(mapping: CubicMapping) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    pub fn relative_accuracy(&self) -> f64 {
        self.mapping.relative_accuracy()
    }

    /// Infallible insert used by the registry.
    pub fn accept(&mut self, value: f64) {
        let value = if value.is_finite() {
            value.max(0.0)
        } else if value == f64::INFINITY {
            f64::MAX
        } else {
            0.0
        };

        self.count += 1;
        self.sum += value;
        if value < self.mapping.min_indexable_value() {
            self.zero_count += 1;
        } else {
            self.store.add(self.mapping.index(value), 1);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Nearest-rank target for `q`: the smallest k with k >= q * n.
    fn rank(&self, q: f64) -> u64 {
        let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };
        // The tolerance keeps products like 0.9 * 10 from rounding up a rank.
        let target = (q * self.count as f64 - 1e-9).ceil();
        (target.max(1.0) as u64).min(self.count)
    }

    fn value_at_rank(&self, rank: u64) -> f64 {
        if rank <= self.zero_count {
            return 0.0;
        }
        let mut seen = self.zero_count;
        let mut last = 0.0;
        for (index, count) in self.store.iter() {
            seen += count;
            last = self.mapping.value(index);
            if seen >= rank {
                return last;
            }
        }
        last
    }
}

impl Histogram for QuantileSketch {
    fn add(&mut self, value: f64) -> Result<()> {
        self.accept(value);
        Ok(())
    }

    fn value_at_quantile(&self, q: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.value_at_rank(self.rank(q))
    }

    fn values_at_quantiles(&self, qs: &[f64]) -> Vec<f64> {
        if self.is_empty() {
            return vec![0.0; qs.len()];
        }

        // Answer in ascending rank order with a single bucket scan.
        let mut order: Vec<(usize, u64)> = qs.iter().map(|q| self.rank(*q)).enumerate().collect();
        order.sort_by_key(|(_, rank)| *rank);

        let mut out = vec![0.0; qs.len()];
        let mut pending = order.into_iter().peekable();
        while let Some((_, rank)) = pending.peek() {
            if *rank > self.zero_count {
                break;
            }
            pending.next();
        }

        let mut seen = self.zero_count;
        let mut last = 0.0;
        for (index, count) in self.store.iter() {
            seen += count;
            last = self.mapping.value(index);
            while let Some((slot, rank)) = pending.peek() {
                if *rank > seen {
                    break;
                }
                out[*slot] = last;
                pending.next();
            }
        }
        for (slot, _) in pending {
            out[slot] = last;
        }
        out
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }
}

/// Read-only view handed out after flush. Queries delegate; `add` fails with
/// `MetricsError::NotPermitted`.
#[derive(Debug, Clone)]
pub struct ReadOnlyHistogram {
    inner: QuantileSketch,
}

impl ReadOnlyHistogram {
    pub fn new(inner: QuantileSketch) -> Self {
        Self { inner }
    }

    pub fn relative_accuracy(&self) -> f64 {
        self.inner.relative_accuracy()
    }
}

impl Histogram for ReadOnlyHistogram {
    fn add(&mut self, _value: f64) -> Result<()> {
        Err(MetricsError::NotPermitted("histogram is read-only after flush"))
    }

    fn value_at_quantile(&self, q: f64) -> f64 {
        self.inner.value_at_quantile(q)
    }

    fn values_at_quantiles(&self, qs: &[f64]) -> Vec<f64> {
        self.inner.values_at_quantiles(qs)
    }

    fn count(&self) -> u64 {
        self.inner.count()
    }

    fn average(&self) -> f64 {
        self.inner.average()
    }
}
