//! Shared application state for the exporter.
//!
//! Holds the one `Recorder` of the process and the most recently published
//! sample list. The registry is built from the engine section of the config.

use std::sync::Arc;

use arc_swap::ArcSwap;

use shardmetrics_core::error::Result;
use shardmetrics_core::{Classifier, MetricRegistry, Recorder, RecorderSettings, Sample};

use crate::config::{ExporterConfig, FlushMode};
use crate::render;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    recorder: Recorder,
    latest: ArcSwap<Vec<Sample>>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let registry = MetricRegistry::with_relative_accuracy(cfg.engine.relative_accuracy)?;
        let classifier = Classifier::new(cfg.engine.max_index_labels)?;
        let settings = RecorderSettings::new(
            cfg.engine.metrics_enabled,
            cfg.engine.resource_tracking_enabled,
        );
        let recorder = Recorder::with_settings(Arc::new(registry), classifier, settings);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                recorder,
                latest: ArcSwap::from_pointee(Vec::new()),
            }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn recorder(&self) -> &Recorder {
        &self.inner.recorder
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.inner.cfg.exporter.flush_mode
    }

    /// Flush the registry and publish the result as the latest samples.
    pub fn flush_and_publish(&self) -> Arc<Vec<Sample>> {
        let samples = Arc::new(self.inner.recorder.flush());
        self.inner.latest.store(Arc::clone(&samples));
        samples
    }

    /// Last published sample list (empty before the first flush).
    pub fn latest(&self) -> Arc<Vec<Sample>> {
        self.inner.latest.load_full()
    }

    /// Samples for one scrape, honoring the configured flush mode.
    pub fn scrape(&self) -> Arc<Vec<Sample>> {
        match self.flush_mode() {
            FlushMode::Scrape => self.flush_and_publish(),
            FlushMode::Interval => self.latest(),
        }
    }

    /// Text exposition for one scrape.
    pub fn render_metrics(&self) -> String {
        let samples = self.scrape();
        render::render_text(&self.inner.recorder.registrations(), &samples)
    }
}
