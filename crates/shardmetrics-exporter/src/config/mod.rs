//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use shardmetrics_core::error::{MetricsError, Result};

pub use schema::{EngineSection, ExporterConfig, ExporterSection, FlushMode};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "SHARDMETRICS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "shardmetrics.yaml";

/// Config path from `SHARDMETRICS_CONFIG`, falling back to `shardmetrics.yaml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
