//! Concurrent metric registry with swap-on-flush generations.
//!
//! The live generation sits behind an `ArcSwap`. Recorders load it, look up or
//! create the accumulator for their key in a `DashMap`, and mutate that
//! accumulator under its own lock. Nothing serializes unrelated keys.
//!
//! `flush` swaps in an empty generation, waits for recorders still holding
//! the retired one to finish, and turns it into an owned `RegistrySnapshot`.
//! Each raw observation is counted exactly once, but at an unspecified one of
//! the two adjacent flush intervals if it races the flush boundary.
//!
//! Label cardinality is not bounded here. Every distinct
//! `(index, shard, operation)` tuple costs one accumulator per generation, so
//! index and shard naming discipline is the caller's concern.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::catalog::{HISTOGRAM_SUFFIXES, INDEX_SHARD_CPU_PERCENT_METRIC, INDEX_SHARD_CPU_TIME_METRIC};
use crate::counter::CounterMetric;
use crate::error::Result;
use crate::key::{MetricKey, Sample};
use crate::sketch::{CubicMapping, Histogram, QuantileSketch, ReadOnlyHistogram, EXPORTED_QUANTILES};

/// One observation, tagged with the accumulator kind it feeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Histogram(f64),
    Counter(u64),
}

/// Sketch guarded by its own lock; contention is limited to one label tuple.
#[derive(Debug)]
pub struct HistogramMetric {
    sketch: Mutex<QuantileSketch>,
}

impl HistogramMetric {
    fn new(mapping: CubicMapping) -> Self {
        Self {
            sketch: Mutex::new(QuantileSketch::with_mapping(mapping)),
        }
    }

    pub fn add(&self, value: f64) {
        // A poisoned lock only means another recorder panicked mid-add; the
        // sketch itself is still consistent enough to keep counting.
        self.sketch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accept(value);
    }

    fn copy_sketch(&self) -> QuantileSketch {
        self.sketch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn into_sketch(self) -> QuantileSketch {
        self.sketch.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Generation {
    started: Instant,
    histograms: DashMap<MetricKey, Arc<HistogramMetric>>,
    counters: DashMap<MetricKey, Arc<CounterMetric>>,
}

impl Generation {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            histograms: DashMap::new(),
            counters: DashMap::new(),
        }
    }

    fn histogram(&self, key: &MetricKey, mapping: CubicMapping) -> Arc<HistogramMetric> {
        if let Some(found) = self.histograms.get(key) {
            return Arc::clone(found.value());
        }
        // Racing creators all resolve to whichever instance won the entry.
        let entry = self
            .histograms
            .entry(key.clone())
            .or_insert_with(|| Arc::new(HistogramMetric::new(mapping)));
        Arc::clone(entry.value())
    }

    fn counter(&self, key: &MetricKey) -> Arc<CounterMetric> {
        if let Some(found) = self.counters.get(key) {
            return Arc::clone(found.value());
        }
        let entry = self
            .counters
            .entry(key.clone())
            .or_insert_with(|| Arc::new(CounterMetric::new()));
        Arc::clone(entry.value())
    }
}

pub struct MetricRegistry {
    live: ArcSwap<Generation>,
    mapping: CubicMapping,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::with_mapping(CubicMapping::default())
    }
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose sketches use the given relative accuracy.
    pub fn with_relative_accuracy(relative_accuracy: f64) -> Result<Self> {
        Ok(Self::with_mapping(CubicMapping::new(relative_accuracy)?))
    }

    fn with_mapping(mapping: CubicMapping) -> Self {
        Self {
            live: ArcSwap::from_pointee(Generation::new()),
            mapping,
        }
    }

    pub fn relative_accuracy(&self) -> f64 {
        self.mapping.relative_accuracy()
    }

    /// Add one observation to the accumulator for `key`, creating it on
    /// first use.
    pub fn record(&self, key: &MetricKey, observation: Observation) {
        // The guard keeps this generation alive until the write lands, which
        // is what `flush` waits on.
        let generation = self.live.load();
        match observation {
            Observation::Histogram(value) => {
                let metric = generation.histogram(key, self.mapping);
                metric.add(value);
            }
            Observation::Counter(delta) => {
                let metric = generation.counter(key);
                metric.inc(delta);
            }
        }
    }

    pub fn record_histogram(&self, key: &MetricKey, value: f64) {
        self.record(key, Observation::Histogram(value));
    }

    pub fn record_counter(&self, key: &MetricKey, delta: u64) {
        self.record(key, Observation::Counter(delta));
    }

    /// Detach everything recorded since the previous flush.
    pub fn flush(&self) -> RegistrySnapshot {
        let retired = self.live.swap(Arc::new(Generation::new()));
        let generation = wait_exclusive(retired);
        let snapshot = RegistrySnapshot::from_generation(generation);
        tracing::debug!(
            histograms = snapshot.histograms.len(),
            counters = snapshot.counters.len(),
            elapsed_ms = snapshot.elapsed.as_millis() as u64,
            "registry flushed"
        );
        snapshot
    }
}

/// Spin until recorders that loaded the retired generation have dropped it.
/// Each of them holds it for a single bounded `add`/`inc`.
fn wait_exclusive(mut generation: Arc<Generation>) -> Generation {
    loop {
        match Arc::try_unwrap(generation) {
            Ok(owned) => return owned,
            Err(shared) => {
                generation = shared;
                std::thread::yield_now();
            }
        }
    }
}

/// Immutable, exclusively owned view of one flushed generation.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    elapsed: Duration,
    histograms: Vec<(MetricKey, ReadOnlyHistogram)>,
    counters: Vec<(MetricKey, u64)>,
}

impl RegistrySnapshot {
    fn from_generation(generation: Generation) -> Self {
        let elapsed = generation.started.elapsed();

        let mut histograms: Vec<(MetricKey, ReadOnlyHistogram)> = generation
            .histograms
            .into_iter()
            .map(|(key, metric)| {
                let sketch = match Arc::try_unwrap(metric) {
                    Ok(owned) => owned.into_sketch(),
                    Err(shared) => shared.copy_sketch(),
                };
                (key, ReadOnlyHistogram::new(sketch))
            })
            .collect();
        histograms.sort_by(|a, b| a.0.cmp(&b.0));

        let mut counters: Vec<(MetricKey, u64)> = generation
            .counters
            .into_iter()
            .map(|(key, metric)| {
                let count = match Arc::try_unwrap(metric) {
                    Ok(owned) => owned.into_count(),
                    Err(shared) => shared.count(),
                };
                (key, count)
            })
            .collect();
        counters.sort_by(|a, b| a.0.cmp(&b.0));

        Self { elapsed, histograms, counters }
    }

    /// Wall time covered by this generation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty() && self.counters.is_empty()
    }

    pub fn histograms(&self) -> &[(MetricKey, ReadOnlyHistogram)] {
        &self.histograms
    }

    pub fn counters(&self) -> &[(MetricKey, u64)] {
        &self.counters
    }

    pub fn histogram(&self, key: &MetricKey) -> Option<&ReadOnlyHistogram> {
        self.histograms
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|i| &self.histograms[i].1)
    }

    pub fn counter(&self, key: &MetricKey) -> Option<u64> {
        self.counters
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|i| self.counters[i].1)
    }

    /// Flatten into export samples.
    ///
    /// Each histogram key yields `_count`, `_average`, `_p50`, `_p90`, `_p95`
    /// and `_p99`. Each counter key yields its total; CPU time counters are
    /// followed by a derived CPU percent sample.
    pub fn samples(&self) -> Vec<Sample> {
        let mut out = Vec::with_capacity(self.histograms.len() * HISTOGRAM_SUFFIXES.len() + self.counters.len() * 2);

        for (key, histogram) in &self.histograms {
            let quantiles = histogram.values_at_quantiles(&EXPORTED_QUANTILES);
            let mut values = Vec::with_capacity(HISTOGRAM_SUFFIXES.len());
            values.push(histogram.count() as f64);
            values.push(histogram.average());
            values.extend(quantiles);

            for (suffix, value) in HISTOGRAM_SUFFIXES.iter().zip(values) {
                out.push(Sample::new(format!("{}{}", key.name(), suffix), key.labels(), value));
            }
        }

        for (key, count) in &self.counters {
            out.push(Sample::new(key.name(), key.labels(), *count as f64));
            if key.name() == INDEX_SHARD_CPU_TIME_METRIC {
                out.push(Sample::new(
                    INDEX_SHARD_CPU_PERCENT_METRIC,
                    key.labels(),
                    cpu_percent(*count, self.elapsed),
                ));
            }
        }
        out
    }
}

/// CPU time as a percentage of wall time: `cpu / wall * 100`, 0 for an empty
/// window.
pub fn cpu_percent(cpu_nanos: u64, wall: Duration) -> f64 {
    let wall_nanos = wall.as_nanos() as f64;
    if wall_nanos <= 0.0 {
        return 0.0;
    }
    cpu_nanos as f64 / wall_nanos * 100.0
}
