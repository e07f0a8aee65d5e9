//! Dispatcher - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{EmitPolicy, PipelineOutput, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, NetworkSink};

#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub sinks: Vec<SinkConfig>,
    /// Which snapshots are forwarded
    pub emit: EmitPolicy,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<PipelineOutput>,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<PipelineOutput>) -> Self {
        Self { config, input_rx }
    }

    /// Build every sink and start its worker
    #[instrument(name = "dispatcher_builder_build", skip(self), fields(sink_count = self.config.sinks.len()))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let mut handles = Vec::with_capacity(self.config.sinks.len());
        for sink_config in &self.config.sinks {
            handles.push(create_sink_handle(sink_config).await?);
        }

        Ok(Dispatcher {
            handles,
            emit: self.config.emit,
            input_rx: self.input_rx,
        })
    }
}

#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => Ok(SinkHandle::spawn(
            LogSink::new(&config.name),
            config.queue_capacity,
        )),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans pipeline snapshots out to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    emit: EmitPolicy,
    input_rx: mpsc::Receiver<PipelineOutput>,
}

impl Dispatcher {
    /// Create a dispatcher with prebuilt sink handles
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        emit: EmitPolicy,
        input_rx: mpsc::Receiver<PipelineOutput>,
    ) -> Self {
        Self {
            handles,
            emit,
            input_rx,
        }
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run until the input channel closes, then drain every sink.
    ///
    /// Returns the final per-sink counters.
    #[instrument(name = "dispatcher_run", skip(self), fields(emit = ?self.emit))]
    pub async fn run(mut self) -> Vec<(String, MetricsSnapshot)> {
        info!(sinks = self.handles.len(), "dispatcher started");

        let mut received: u64 = 0;
        let mut forwarded: u64 = 0;

        while let Some(output) = self.input_rx.recv().await {
            received += 1;
            if self.should_emit(&output) {
                forwarded += 1;
                self.dispatch(&output);
            }

            if received % 500 == 0 {
                debug!(received, forwarded, "dispatcher progress");
            }
        }

        info!(received, forwarded, "dispatcher input closed, shutting down");

        let mut summary = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let name = handle.name().to_string();
            let metrics = std::sync::Arc::clone(handle.metrics());
            handle.shutdown().await;
            summary.push((name, metrics.snapshot()));
        }

        info!("dispatcher shutdown complete");
        summary
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<Vec<(String, MetricsSnapshot)>> {
        tokio::spawn(self.run())
    }

    fn should_emit(&self, output: &PipelineOutput) -> bool {
        match self.emit {
            EmitPolicy::EverySample => true,
            EmitPolicy::TransitionsOnly => output.transition.is_some(),
        }
    }

    fn dispatch(&self, output: &PipelineOutput) {
        for handle in &self.handles {
            handle.try_send(output.clone());
        }
    }
}

/// Build a dispatcher from sink configs
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    emit: EmitPolicy,
    input_rx: mpsc::Receiver<PipelineOutput>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
        emit,
    };
    DispatcherBuilder::new(config, input_rx).build().await
}
