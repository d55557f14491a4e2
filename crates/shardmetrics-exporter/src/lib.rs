//! shardmetrics exporter library entry.
//!
//! Wires a `shardmetrics-core` recorder to a strict YAML config, a flush
//! schedule and an axum HTTP surface serving Prometheus text. It is consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod flush;
pub mod ops;
pub mod render;
pub mod router;
