use serde::Deserialize;
use shardmetrics_core::error::{MetricsError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub engine: EngineSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::InvalidConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.exporter.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            engine: EngineSection::default(),
        }
    }
}

/// When the registry is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushMode {
    /// Every `/metrics` request flushes and renders that snapshot.
    Scrape,
    /// A background task flushes on a fixed period; scrapes read the latest.
    Interval,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_flush_mode")]
    pub flush_mode: FlushMode,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            flush_mode: default_flush_mode(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(MetricsError::InvalidConfig(format!(
                "exporter.listen must be a socket address, got {:?}",
                self.listen
            )));
        }
        if !(1000..=3_600_000).contains(&self.flush_interval_ms) {
            return Err(MetricsError::InvalidConfig(
                "exporter.flush_interval_ms must be between 1000 and 3600000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:9108".into()
}
fn default_flush_mode() -> FlushMode {
    FlushMode::Scrape
}
fn default_flush_interval_ms() -> u64 {
    60_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_relative_accuracy")]
    pub relative_accuracy: f64,

    #[serde(default = "default_max_index_labels")]
    pub max_index_labels: usize,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    #[serde(default = "default_true")]
    pub resource_tracking_enabled: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            relative_accuracy: default_relative_accuracy(),
            max_index_labels: default_max_index_labels(),
            metrics_enabled: true,
            resource_tracking_enabled: true,
        }
    }
}

impl EngineSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.relative_accuracy > 0.0 && self.relative_accuracy <= 0.5) {
            return Err(MetricsError::InvalidConfig(
                "engine.relative_accuracy must be in (0, 0.5]".into(),
            ));
        }
        if !(1..=32).contains(&self.max_index_labels) {
            return Err(MetricsError::InvalidConfig(
                "engine.max_index_labels must be between 1 and 32".into(),
            ));
        }
        Ok(())
    }
}

fn default_relative_accuracy() -> f64 {
    shardmetrics_core::sketch::DEFAULT_RELATIVE_ACCURACY
}
fn default_max_index_labels() -> usize {
    shardmetrics_core::classify::DEFAULT_MAX_INDICES
}
fn default_true() -> bool {
    true
}
