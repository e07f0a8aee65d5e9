//! # Integration Tests
//!
//! End-to-end flows across the workspace crates.
//!
//! Covers:
//! - profile contracts (TOML in, pipeline config out)
//! - source -> motion pipeline -> dispatcher runs without a device
//! - property tests over the pipeline stages

#[cfg(test)]
mod properties;

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{EmitPolicy, IntensityMode, PipelineConfig, SourceConfig};

    const PROFILE: &str = r#"
emit = "transitions_only"

[pipeline]
intensity = "cadence"

[pipeline.cadence]
strategy = { kind = "interval", max_events = 5 }

[[pipeline.classifier.bands]]
upper = 20.0
label = "Still"

[[pipeline.classifier.bands]]
upper = 45.0
label = "Transition"

[[pipeline.classifier.bands]]
upper = 80.0
label = "Walk"

[[pipeline.classifier.bands]]
upper = 115.0
label = "Transition"

[[pipeline.classifier.bands]]
upper = 140.0
inclusive = true
label = "FastWalk"

[[pipeline.classifier.bands]]
label = "Run"

[pipeline.classifier.hysteresis]

[source]
kind = "replay"
path = "walk.jsonl"
"#;

    #[test]
    fn test_profile_matches_builtin_six_state() {
        let profile = ConfigLoader::load_from_str(PROFILE, ConfigFormat::Toml).unwrap();

        assert_eq!(profile.pipeline, PipelineConfig::six_state_hysteresis());
        assert_eq!(profile.pipeline.intensity, IntensityMode::Cadence);
        assert_eq!(profile.emit, EmitPolicy::TransitionsOnly);
        assert!(matches!(profile.source, SourceConfig::Replay(ref r) if r.speed_multiplier == 1.0));
    }

    #[test]
    fn test_descending_bounds_rejected() {
        let broken = PROFILE.replace("upper = 45.0", "upper = 10.0");
        assert!(ConfigLoader::load_from_str(&broken, ConfigFormat::Toml).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use contracts::{
        CadenceConfig, CadenceStrategy, MotionSource, MovementState, PipelineConfig,
        PipelineOutput, RawMotion, SinkConfig, SinkType, SyntheticGaitConfig,
    };
    use dispatcher::create_dispatcher;
    use ingestion::{IngestionPipeline, SyntheticGaitSource};
    use motion_engine::MotionPipeline;
    use observability::RunMetricsAggregator;
    use tokio::sync::mpsc;

    fn unsmoothed() -> PipelineConfig {
        PipelineConfig {
            cadence: CadenceConfig {
                smoothing_alpha: 1.0,
                ..CadenceConfig::default()
            },
            ..PipelineConfig::default()
        }
    }

    /// Alternating 0.5 / 2.0 readings, `spacing_ms` apart
    fn alternating(count: i64, spacing_ms: i64) -> Vec<RawMotion> {
        (1..=count)
            .map(|i| {
                let z = if i % 2 == 0 { 2.0 } else { 0.5 };
                RawMotion::new(0.0, 0.0, z, i * spacing_ms)
            })
            .collect()
    }

    #[test]
    fn test_alternating_magnitudes_reach_walk() {
        let mut pipeline = MotionPipeline::new(unsmoothed());

        let outputs: Vec<PipelineOutput> = alternating(12, 500)
            .iter()
            .filter_map(|r| pipeline.process_sample(r))
            .collect();
        assert_eq!(outputs.len(), 12);

        let last = outputs.last().unwrap();
        assert_eq!(last.timestamp_ms, 6000);
        assert_eq!(last.cadence.history_len, 6);
        assert_eq!(last.cadence.raw, 72.0);
        assert_eq!(last.cadence.rounded, 72);
        assert_eq!(last.state, MovementState::from("Walk"));

        let transitions: Vec<_> = outputs.iter().filter_map(|o| o.transition.clone()).collect();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, MovementState::from("Still"));
        assert_eq!(transitions[0].at_ms, 3000);
    }

    #[test]
    fn test_sparse_steps_fall_out_of_window() {
        let mut pipeline = MotionPipeline::new(unsmoothed());
        for reading in alternating(12, 1000) {
            pipeline.process_sample(&reading);
        }

        assert_eq!(pipeline.stats().steps_detected, 6);
        // only 8000, 10000 and 12000 remain in the 5 s window
        let cadence = pipeline.cadence();
        assert_eq!(cadence.history_len, 3);
        assert_eq!(cadence.raw, 36.0);
        assert_eq!(pipeline.current_state(), &MovementState::from("Walk"));
    }

    /// SyntheticGaitSource -> IngestionPipeline -> MotionPipeline -> Dispatcher
    #[tokio::test]
    async fn test_e2e_synthetic_walk() {
        let dir = tempfile::tempdir().unwrap();

        let source = SyntheticGaitSource::new(
            "gait",
            SyntheticGaitConfig {
                sample_rate_hz: 50.0,
                step_rate_hz: 2.0,
                baseline: 0.3,
                peak: 2.0,
                noise: 0.0,
                duration_s: Some(10.0),
                realtime: false,
            },
        );
        let expected = source.signal().sample_count().unwrap();
        assert_eq!(expected, 500);

        let mut ingestion = IngestionPipeline::new(1024);
        ingestion.register_source(Box::new(source));
        let readings = ingestion.take_receiver().unwrap();

        let mut params = HashMap::new();
        params.insert("base_path".to_string(), dir.path().display().to_string());
        let sink_configs = vec![
            SinkConfig {
                name: "snapshots".to_string(),
                sink_type: SinkType::File,
                queue_capacity: 1024,
                params,
            },
            SinkConfig {
                name: "console".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: 1024,
                params: HashMap::new(),
            },
        ];
        let (output_tx, output_rx) = mpsc::channel::<PipelineOutput>(1024);
        let dispatcher = create_dispatcher(sink_configs, Default::default(), output_rx)
            .await
            .unwrap();
        let dispatcher_handle = dispatcher.spawn();

        let mut motion = MotionPipeline::new(PipelineConfig {
            cadence: CadenceConfig {
                strategy: CadenceStrategy::Interval { max_events: 5 },
                ..CadenceConfig::default()
            },
            ..PipelineConfig::default()
        });
        let mut aggregator = RunMetricsAggregator::new();

        ingestion.start_all();
        for _ in 0..expected {
            let raw = tokio::time::timeout(Duration::from_secs(5), readings.recv())
                .await
                .expect("source stalled")
                .unwrap();
            if let Some(output) = motion.process_sample(&raw) {
                aggregator.update(&output);
                output_tx.send(output).await.unwrap();
            }
        }
        ingestion.stop_all();
        drop(output_tx);

        let sinks = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle)
            .await
            .expect("dispatcher did not drain")
            .unwrap();

        let stats = motion.stats();
        assert_eq!(stats.samples_accepted, 500);
        assert_eq!(stats.steps_detected, 20);
        assert_eq!(motion.cadence().rounded, 120);
        assert_eq!(motion.current_state(), &MovementState::from("Walk"));
        assert_eq!(ingestion.metrics().snapshot().readings_dropped, 0);

        let summary = aggregator.summary();
        assert_eq!(summary.total_outputs, 500);
        assert_eq!(summary.total_transitions, 1);
        assert_eq!(summary.final_state.as_deref(), Some("Walk"));

        for (name, metrics) in &sinks {
            assert_eq!(metrics.write_count, 500, "sink {name}");
            assert_eq!(metrics.dropped_count, 0, "sink {name}");
        }

        let content = std::fs::read_to_string(dir.path().join("snapshots.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 500);
        let last: serde_json::Value = serde_json::from_str(lines[499]).unwrap();
        assert_eq!(last["state"], "Walk");
        assert_eq!(last["sequence"], 500);
    }

    #[test]
    fn test_source_stops_on_its_own() {
        let source = SyntheticGaitSource::new(
            "short",
            SyntheticGaitConfig {
                duration_s: Some(0.2),
                realtime: false,
                ..SyntheticGaitConfig::default()
            },
        );
        let (tx, rx) = std::sync::mpsc::channel();
        source.listen(std::sync::Arc::new(move |r| {
            let _ = tx.send(r);
        }));

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.timestamp_ms, 0);
        source.stop();
        assert!(!source.is_listening());
    }
}
