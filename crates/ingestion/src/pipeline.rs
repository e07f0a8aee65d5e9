//! Ingestion Pipeline main entry

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{MotionSource, RawMotion};
use tracing::{debug, info, instrument};

use crate::adapter::SourceAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics};

/// Ingestion Pipeline
///
/// Owns the registered sources and the single channel they all feed.
pub struct IngestionPipeline {
    /// Registered adapters
    adapters: Vec<SourceAdapter>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Reading sender (shared by all adapters)
    tx: Sender<RawMotion>,

    /// Reading receiver
    rx: Option<Receiver<RawMotion>>,
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - Channel capacity
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig::new(channel_capacity))
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity.max(1));

        Self {
            adapters: Vec::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
        }
    }

    /// Register a motion source
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source),
        fields(source_id = %source.source_id())
    )]
    pub fn register_source(&mut self, source: Box<dyn MotionSource>) {
        let source_id = source.source_id().to_string();
        debug!(source_id = %source_id, "registered motion source");
        self.adapters.push(SourceAdapter::new(source_id, source));
    }

    /// Start all registered sources
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all sources");
        for adapter in &self.adapters {
            adapter.start(self.tx.clone(), self.metrics.clone());
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all sources");
        for adapter in &self.adapters {
            adapter.stop();
        }
    }

    /// Get reading stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<RawMotion>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered source count
    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Whether any source is still producing readings
    pub fn any_listening(&self) -> bool {
        self.adapters.iter().any(SourceAdapter::is_listening)
    }

    /// Check if the named source is listening
    pub fn is_source_listening(&self, source_id: &str) -> bool {
        self.adapters
            .iter()
            .find(|a| a.source_id() == source_id)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }

    /// Close the sending side once all sources are done.
    ///
    /// Receivers drain what is queued and then see the channel closed.
    pub fn close(&self) {
        self.tx.close();
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplaySource;
    use contracts::ReplayConfig;

    #[test]
    fn test_pipeline_creation() {
        let pipeline = IngestionPipeline::new(100);
        assert_eq!(pipeline.source_count(), 0);
        assert!(!pipeline.any_listening());
    }

    #[test]
    fn test_take_receiver_once() {
        let mut pipeline = IngestionPipeline::new(100);
        assert!(pipeline.take_receiver().is_some());
        assert!(pipeline.take_receiver().is_none());
    }

    #[test]
    fn test_replay_through_pipeline() {
        let readings = (0..20)
            .map(|i| RawMotion::new(0.0, 0.0, 1.0, i * 20))
            .collect();
        let source = ReplaySource::from_readings(
            "replay",
            readings,
            ReplayConfig {
                path: "mem".into(),
                speed_multiplier: 0.0,
                loop_playback: false,
            },
        );

        let mut pipeline = IngestionPipeline::new(64);
        pipeline.register_source(Box::new(source));
        let rx = pipeline.take_receiver().unwrap();
        pipeline.start_all();

        let mut count = 0;
        while count < 20 {
            if rx.recv_blocking().is_err() {
                break;
            }
            count += 1;
        }

        assert_eq!(count, 20);
        assert_eq!(pipeline.metrics().snapshot().readings_received, 20);
    }
}
