//! Recording facade used by request lifecycle hooks.
//!
//! A `Recorder` owns an injected `MetricRegistry` plus a `Classifier` and
//! turns completed operations into labeled observations. None of its methods
//! fail or block on I/O.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::{
    self, LatencyFamily, MetricRegistration, INDEX_SHARD_CPU_TIME_METRIC,
    INDEX_SHARD_MEMORY_ALLOCATION_METRIC,
};
use crate::classify::{escape_wildcard, Classifier};
use crate::key::{MetricKey, Sample};
use crate::registry::{MetricRegistry, RegistrySnapshot};
use crate::request::{OperationRequest, ResourceUsage};

/// Runtime toggles. Flipping them never touches already-recorded data.
#[derive(Debug)]
pub struct RecorderSettings {
    metrics_enabled: AtomicBool,
    resource_tracking_enabled: AtomicBool,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            metrics_enabled: AtomicBool::new(true),
            resource_tracking_enabled: AtomicBool::new(true),
        }
    }
}

impl RecorderSettings {
    pub fn new(metrics_enabled: bool, resource_tracking_enabled: bool) -> Self {
        Self {
            metrics_enabled: AtomicBool::new(metrics_enabled),
            resource_tracking_enabled: AtomicBool::new(resource_tracking_enabled),
        }
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled.load(Ordering::Relaxed)
    }

    pub fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn resource_tracking_enabled(&self) -> bool {
        self.resource_tracking_enabled.load(Ordering::Relaxed)
    }

    pub fn set_resource_tracking_enabled(&self, enabled: bool) {
        self.resource_tracking_enabled.store(enabled, Ordering::Relaxed);
    }
}

/// Latency family a completed request reports into, if any.
///
/// Coordinator searches feed the search histogram; bulk and multi-search
/// feed the bulk histogram. Shard-level and read requests only report
/// resource usage.
pub fn latency_family(request: &OperationRequest) -> Option<LatencyFamily> {
    match request {
        OperationRequest::Search { .. } => Some(LatencyFamily::Search),
        OperationRequest::Bulk { .. } | OperationRequest::MultiSearch => Some(LatencyFamily::Bulk),
        _ => None,
    }
}

fn is_tracked_shape(request: &OperationRequest) -> bool {
    match request {
        OperationRequest::Search { .. }
        | OperationRequest::ShardSearch(_)
        | OperationRequest::ShardFetchSearch(_)
        | OperationRequest::BulkShard(_)
        | OperationRequest::MultiGetShard(_)
        | OperationRequest::MultiSearch
        | OperationRequest::Bulk { .. }
        | OperationRequest::Get { .. }
        | OperationRequest::MultiGet { .. } => true,
        OperationRequest::Forwarded { inner } => is_tracked_shape(inner),
        _ => false,
    }
}

fn success_label(success: bool) -> &'static str {
    if success {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone)]
pub struct Recorder {
    inner: Arc<RecorderInner>,
}

struct RecorderInner {
    registry: Arc<MetricRegistry>,
    classifier: Classifier,
    settings: RecorderSettings,
}

impl Recorder {
    pub fn new(registry: Arc<MetricRegistry>, classifier: Classifier) -> Self {
        Self::with_settings(registry, classifier, RecorderSettings::default())
    }

    pub fn with_settings(
        registry: Arc<MetricRegistry>,
        classifier: Classifier,
        settings: RecorderSettings,
    ) -> Self {
        Self {
            inner: Arc::new(RecorderInner {
                registry,
                classifier,
                settings,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.inner.registry
    }

    pub fn classifier(&self) -> &Classifier {
        &self.inner.classifier
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.inner.settings
    }

    /// Record one latency observation under `(family prefix, [scope, success])`.
    pub fn record_latency(&self, family: LatencyFamily, scope: &str, success: bool, elapsed_ms: u64) {
        let key = MetricKey::new(
            family.prefix(),
            [escape_wildcard(scope.to_string()), success_label(success).to_string()],
        );
        self.inner.registry.record_histogram(&key, elapsed_ms as f64);
    }

    pub fn record_search_latency(&self, index: &str, success: bool, elapsed_ms: u64) {
        self.record_latency(LatencyFamily::Search, index, success, elapsed_ms);
    }

    pub fn record_bulk_latency(&self, index: &str, success: bool, elapsed_ms: u64) {
        self.record_latency(LatencyFamily::Bulk, index, success, elapsed_ms);
    }

    /// Add CPU time and allocated bytes for `(index, shard, operation)`.
    /// A zero value is skipped so untracked requests leave no empty entries.
    pub fn record_resource_usage(
        &self,
        index: &str,
        shard: &str,
        operation: &str,
        cpu_nanos: u64,
        memory_bytes: u64,
    ) {
        let labels = [escape_wildcard(index.to_string()), shard.to_string(), operation.to_string()];
        if cpu_nanos > 0 {
            let key = MetricKey::new(INDEX_SHARD_CPU_TIME_METRIC, labels.iter().cloned());
            self.inner.registry.record_counter(&key, cpu_nanos);
        }
        if memory_bytes > 0 {
            let key = MetricKey::new(INDEX_SHARD_MEMORY_ALLOCATION_METRIC, labels);
            self.inner.registry.record_counter(&key, memory_bytes);
        }
    }

    /// Whether completions of this request shape are worth recording.
    pub fn tracks(&self, request: &OperationRequest) -> bool {
        self.inner.settings.metrics_enabled() && is_tracked_shape(request)
    }

    /// Full completion hook: classify, then record resource usage and latency.
    pub fn record_completion(
        &self,
        request: &OperationRequest,
        success: bool,
        elapsed: Duration,
        usage: Option<ResourceUsage>,
    ) {
        if !self.inner.settings.metrics_enabled() {
            return;
        }

        let labels = self.inner.classifier.classify(request);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        if let Some(usage) = usage {
            if self.inner.settings.resource_tracking_enabled() {
                self.record_resource_usage(
                    &labels.index,
                    &labels.shard,
                    labels.operation.as_str(),
                    usage.cpu_time_nanos,
                    usage.memory_bytes,
                );
                tracing::trace!(
                    index = %labels.index,
                    shard = %labels.shard,
                    operation = labels.operation.as_str(),
                    cpu_nanos = usage.cpu_time_nanos,
                    memory_bytes = usage.memory_bytes,
                    "recorded resource usage"
                );
            }
        }

        if let Some(family) = latency_family(request) {
            self.record_latency(family, &labels.index, success, elapsed_ms);
        }
    }

    /// Start timing a tracked request. Returns `None` for untracked shapes
    /// or when metrics are disabled.
    pub fn begin(&self, request: OperationRequest) -> Option<InFlight> {
        if !self.tracks(&request) {
            return None;
        }
        Some(InFlight {
            recorder: self.clone(),
            request: Some(request),
            started: Instant::now(),
        })
    }

    /// Flush the registry and return the raw snapshot.
    pub fn flush_snapshot(&self) -> RegistrySnapshot {
        self.inner.registry.flush()
    }

    /// Flush the registry and flatten it into export samples.
    pub fn flush(&self) -> Vec<Sample> {
        self.flush_snapshot().samples()
    }

    pub fn registrations(&self) -> Vec<MetricRegistration> {
        catalog::registrations()
    }
}

/// Timing handle for one operation. Records exactly once: on `succeed`, on
/// `fail`, or as a failure when dropped without either.
pub struct InFlight {
    recorder: Recorder,
    request: Option<OperationRequest>,
    started: Instant,
}

impl InFlight {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn succeed(mut self, usage: Option<ResourceUsage>) {
        self.complete(true, usage);
    }

    pub fn fail(mut self, usage: Option<ResourceUsage>) {
        self.complete(false, usage);
    }

    fn complete(&mut self, success: bool, usage: Option<ResourceUsage>) {
        if let Some(request) = self.request.take() {
            self.recorder
                .record_completion(&request, success, self.started.elapsed(), usage);
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.request.is_some() {
            tracing::debug!("operation dropped before completion, recording as failure");
            self.complete(false, None);
        }
    }
}
