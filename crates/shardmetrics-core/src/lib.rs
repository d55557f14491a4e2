//! shardmetrics core: request classification, quantile sketches and the
//! concurrent flushable metric registry.
//!
//! This crate owns everything between "an operation completed" and "here is
//! an immutable snapshot of what happened since the last flush". It carries no
//! HTTP or runtime dependencies; exporting is the exporter crate's concern.
//!
//! # Guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Recording never fails; the only fallible paths are construction with bad
//! parameters and mutation of a read-only histogram, both surfaced as
//! `MetricsError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod catalog;
pub mod classify;
pub mod counter;
pub mod error;
pub mod key;
pub mod recorder;
pub mod registry;
pub mod request;
pub mod sketch;

/// Shared result type.
pub use error::{ErrorCode, MetricsError, Result};

pub use catalog::{LatencyFamily, MetricRegistration};
pub use classify::{Classifier, Operation, RequestLabels};
pub use key::{MetricKey, Sample};
pub use recorder::{InFlight, Recorder, RecorderSettings};
pub use registry::{MetricRegistry, Observation, RegistrySnapshot};
pub use request::{OperationRequest, ResourceUsage, ShardTarget};
pub use sketch::{Histogram, QuantileSketch, ReadOnlyHistogram};
