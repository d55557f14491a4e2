//! Top-level facade crate for shardmetrics.
//!
//! Re-exports the engine and the exporter library so users can depend on a
//! single crate.

pub mod core {
    pub use shardmetrics_core::*;
}

pub mod exporter {
    pub use shardmetrics_exporter::*;
}

pub use shardmetrics_core::{Classifier, MetricRegistry, OperationRequest, Recorder, Sample};
