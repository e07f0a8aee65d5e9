//! Run orchestrator - wires source, motion pipeline and dispatcher.
//!
//! ```text
//! MotionSource --(bounded channel)--> MotionPipeline --(mpsc)--> Dispatcher --> sinks
//! ```
//!
//! The run loop owns the pipeline exclusively; every reading is processed to
//! completion before the next is taken off the channel.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{MotionProfile, PipelineOutput};
use ingestion::IngestionPipeline;
use motion_engine::MotionPipeline;
use observability::{record_pipeline_output, record_pipeline_stats, record_sink_totals};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{RunStats, StopReason};
use crate::error::CliError;

/// Identifier of the single registered source
pub const SOURCE_ID: &str = "motion";

/// How often the loop checks whether the source has finished
const IDLE_POLL: Duration = Duration::from_millis(50);

/// How long sinks get to drain after the loop ends
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub profile: MotionProfile,

    /// Stop after this many outputs (None = unlimited)
    pub max_outputs: Option<u64>,

    /// Wall-clock limit (None = no limit)
    pub timeout: Option<Duration>,

    /// Capacity of the sample and output queues
    pub buffer_size: usize,

    /// Prometheus exporter port (None = disabled)
    pub metrics_port: Option<u16>,
}

pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run until the source is exhausted, a limit is hit or `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<RunStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let profile = &self.config.profile;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let source = ingestion::build_source(SOURCE_ID, &profile.source)
            .context("Failed to build motion source")?;
        let mut ingestion = IngestionPipeline::new(self.config.buffer_size);
        ingestion.register_source(source);
        let readings = ingestion
            .take_receiver()
            .ok_or_else(|| CliError::pipeline_execution("ingestion receiver already taken"))?;

        let (output_tx, output_rx) = mpsc::channel::<PipelineOutput>(self.config.buffer_size.max(1));
        if profile.sinks.is_empty() {
            warn!("no sinks configured - outputs only feed the run summary");
        }
        let dispatcher =
            dispatcher::create_dispatcher(profile.sinks.clone(), profile.emit, output_rx)
                .await
                .context("Failed to create dispatcher")?;
        let active_sinks = dispatcher.sink_count();
        let dispatcher_task = dispatcher.spawn();

        let mut motion = MotionPipeline::new(profile.pipeline.clone());
        info!(
            cadence_strategy = motion.cadence_strategy(),
            intensity = ?motion.intensity_mode(),
            initial_state = %motion.current_state(),
            active_sinks,
            emit = ?profile.emit,
            "motion pipeline ready"
        );

        let mut stats = RunStats::default();
        ingestion.start_all();

        let deadline = async {
            match self.config.timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);
        let mut idle_check = tokio::time::interval(IDLE_POLL);

        stats.stop_reason = loop {
            tokio::select! {
                received = readings.recv() => {
                    let Ok(raw) = received else {
                        break StopReason::SourceClosed;
                    };
                    let Some(output) = motion.process_sample(&raw) else {
                        continue;
                    };

                    record_pipeline_output(&output);
                    stats.outputs.update(&output);
                    if let Some(transition) = &output.transition {
                        info!(
                            from = %transition.from,
                            to = %transition.to,
                            at_ms = transition.at_ms,
                            cadence = output.cadence.rounded,
                            activity = format!("{:.3}", output.activity.level),
                            "movement state changed"
                        );
                    }

                    if output_tx.send(output).await.is_err() {
                        warn!("dispatcher channel closed");
                        break StopReason::DispatcherClosed;
                    }

                    if self
                        .config
                        .max_outputs
                        .is_some_and(|max| stats.outputs.total_outputs >= max)
                    {
                        info!(outputs = stats.outputs.total_outputs, "reached output limit");
                        break StopReason::MaxOutputs;
                    }
                }
                _ = idle_check.tick() => {
                    if !ingestion.any_listening() && readings.is_empty() {
                        debug!("source finished and queue drained");
                        break StopReason::SourceExhausted;
                    }
                }
                _ = &mut deadline => {
                    warn!(timeout = ?self.config.timeout, "run timed out");
                    break StopReason::Timeout;
                }
                _ = &mut shutdown => {
                    warn!("received shutdown signal, stopping");
                    break StopReason::Interrupted;
                }
            }
        };

        info!(reason = %stats.stop_reason, "shutting down");
        ingestion.stop_all();
        drop(output_tx);

        stats.sinks = match tokio::time::timeout(DRAIN_TIMEOUT, dispatcher_task).await {
            Ok(Ok(sinks)) => sinks,
            Ok(Err(e)) => {
                warn!(error = %e, "dispatcher task failed");
                Vec::new()
            }
            Err(_) => {
                warn!("sinks did not drain in time");
                Vec::new()
            }
        };
        for (name, m) in &stats.sinks {
            record_sink_totals(name, m.write_count, m.failure_count, m.dropped_count);
        }

        stats.pipeline = motion.stats();
        record_pipeline_stats(&stats.pipeline);

        let ingest = ingestion.metrics().snapshot();
        stats.readings_received = ingest.readings_received;
        stats.readings_dropped = ingest.readings_dropped;
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            samples = stats.pipeline.samples_accepted,
            steps = stats.pipeline.steps_detected,
            transitions = stats.pipeline.transitions,
            final_state = %motion.current_state(),
            "run complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        EmitPolicy, ReplayConfig, SinkConfig, SinkType, SourceConfig, SyntheticGaitConfig,
    };
    use std::collections::HashMap;
    use std::io::Write;

    fn config(profile: MotionProfile) -> RunConfig {
        RunConfig {
            profile,
            max_outputs: None,
            timeout: Some(Duration::from_secs(20)),
            buffer_size: 4096,
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn test_replay_run_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let recording = dir.path().join("walk.jsonl");
        let mut file = std::fs::File::create(&recording).unwrap();
        for i in 0..500i64 {
            let z = if i % 25 == 0 { 2.0 } else { 0.5 };
            writeln!(file, r#"{{"x":0.0,"y":0.0,"z":{z},"timestamp_ms":{}}}"#, i * 20).unwrap();
        }
        writeln!(file, r#"{{"x":null,"y":0.0,"z":1.0,"timestamp_ms":10000}}"#).unwrap();
        drop(file);

        let mut params = HashMap::new();
        params.insert("base_path".to_string(), dir.path().display().to_string());
        let profile = MotionProfile {
            source: SourceConfig::Replay(ReplayConfig {
                path: recording,
                speed_multiplier: 0.0,
                loop_playback: false,
            }),
            emit: EmitPolicy::TransitionsOnly,
            sinks: vec![SinkConfig {
                name: "changes".to_string(),
                sink_type: SinkType::File,
                queue_capacity: 64,
                params,
            }],
            ..MotionProfile::default()
        };

        let stats = Runner::new(config(profile))
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.stop_reason, StopReason::SourceExhausted);
        assert_eq!(stats.readings_received, 501);
        assert_eq!(stats.pipeline.samples_accepted, 500);
        assert_eq!(stats.pipeline.malformed_dropped, 1);
        // one step every 500 ms
        assert_eq!(stats.pipeline.steps_detected, 20);
        assert_eq!(stats.sinks.len(), 1);

        let written = stats.sinks[0].1.write_count;
        assert_eq!(written, stats.pipeline.transitions);
        let lines = std::fs::read_to_string(dir.path().join("changes.jsonl")).unwrap();
        assert_eq!(lines.lines().count() as u64, written);
    }

    #[tokio::test]
    async fn test_max_outputs_stops_synthetic_run() {
        let profile = MotionProfile {
            source: SourceConfig::Synthetic(SyntheticGaitConfig {
                duration_s: None,
                realtime: true,
                sample_rate_hz: 200.0,
                ..SyntheticGaitConfig::default()
            }),
            ..MotionProfile::default()
        };
        let mut run_config = config(profile);
        run_config.max_outputs = Some(50);

        let stats = Runner::new(run_config)
            .run(std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.stop_reason, StopReason::MaxOutputs);
        assert_eq!(stats.outputs.total_outputs, 50);
    }

    #[tokio::test]
    async fn test_shutdown_signal_interrupts() {
        let profile = MotionProfile {
            source: SourceConfig::Synthetic(SyntheticGaitConfig {
                duration_s: None,
                ..SyntheticGaitConfig::default()
            }),
            ..MotionProfile::default()
        };

        let stats = Runner::new(config(profile))
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(stats.stop_reason, StopReason::Interrupted);
    }
}
