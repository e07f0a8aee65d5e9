//! Property tests over the individual pipeline stages.

use contracts::{
    ActivityConfig, ClassifierConfig, HysteresisConfig, MovementState, PipelineConfig, RawMotion,
    Sample, StateTable, StepDetectorConfig, StepEvent,
};
use motion_engine::{
    normalize, ActivityLevelEstimator, CadenceSource, CountCadence, MotionPipeline,
    SampleWindow, StateClassifier, StepDetector, StepHistory,
};
use proptest::prelude::*;

/// Strictly increasing timestamps built from positive gaps
fn timestamps(gaps: &[i64]) -> Vec<i64> {
    gaps.iter()
        .scan(0i64, |now, gap| {
            *now += gap;
            Some(*now)
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_window_holds_only_recent_samples(
        span_ms in 1u64..5_000,
        gaps in prop::collection::vec(0i64..400, 1..200),
    ) {
        let mut window = SampleWindow::new(span_ms);
        let mut pushed = Vec::new();

        for ts in timestamps(&gaps) {
            window.push(Sample { timestamp_ms: ts, magnitude: 1.0 });
            pushed.push(ts);

            let cutoff = ts - span_ms as i64;
            prop_assert!(window.iter().all(|s| ts - s.timestamp_ms <= span_ms as i64));
            let expected = pushed.iter().filter(|&&p| p >= cutoff).count();
            prop_assert_eq!(window.len(), expected);
        }
    }

    #[test]
    fn prop_steps_respect_refractory(
        refractory_ms in 0u64..1_000,
        readings in prop::collection::vec((1i64..120, 0.0f64..3.0), 1..300),
    ) {
        let config = StepDetectorConfig { peak_threshold: 1.2, refractory_ms };
        let mut detector = StepDetector::new(&config, 60_000);
        let mut fired = Vec::new();
        let mut now = 0;

        for (gap, magnitude) in readings {
            now += gap;
            if detector.detect(&Sample { timestamp_ms: now, magnitude }) {
                prop_assert!(magnitude > 1.2);
                fired.push(now);
            }
        }

        for pair in fired.windows(2) {
            prop_assert!(pair[1] - pair[0] > refractory_ms as i64);
        }
    }

    #[test]
    fn prop_count_cadence_scales_history(
        window_ms in 1_000u64..20_000,
        steps in 0usize..40,
    ) {
        let mut history = StepHistory::new(window_ms);
        for i in 0..steps {
            history.push(StepEvent { timestamp_ms: i as i64 });
        }

        let cadence = CountCadence::new(window_ms).raw_cadence(&history);
        let expected = steps as f64 * (60_000.0 / window_ms as f64);
        prop_assert!((cadence - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_activity_stays_in_unit_range(
        magnitudes in prop::collection::vec(0.0f64..50.0, 0..120),
    ) {
        let mut window = SampleWindow::new(60_000);
        let mut estimator = ActivityLevelEstimator::new(ActivityConfig::default());

        for (i, magnitude) in magnitudes.into_iter().enumerate() {
            window.push(Sample { timestamp_ms: i as i64 * 20, magnitude });
            let reading = estimator.update(&window);
            prop_assert!((0.0..=1.0).contains(&reading.normalized));
            prop_assert!((0.0..=1.0).contains(&reading.level));
        }
    }

    #[test]
    fn prop_normalize_clamps(raw in 0.0f64..20.0) {
        let value = normalize(raw, 0.1, 3.0);
        prop_assert!((0.0..=1.0).contains(&value));
        if raw <= 0.1 {
            prop_assert_eq!(value, 0.0);
        }
        if raw >= 3.1 {
            prop_assert_eq!(value, 1.0);
        }
    }

    #[test]
    fn prop_oscillating_candidate_never_commits(
        stability_ms in 100u64..5_000,
        ticks in 2usize..200,
    ) {
        let mut classifier = StateClassifier::new(&ClassifierConfig {
            bands: StateTable::six_state_cadence(),
            hysteresis: Some(HysteresisConfig { stability_window_ms: stability_ms, min_evidence: 0 }),
        });

        // two alternating candidates, each tick shorter than the stability window
        let step = (stability_ms as i64 - 1).max(1);
        for i in 0..ticks {
            let candidate = if i % 2 == 0 { "Walk" } else { "Run" };
            let now = i as i64 * step;
            prop_assert!(classifier.commit(MovementState::from(candidate), now, 10).is_none());
        }
        prop_assert_eq!(classifier.current(), &MovementState::from("Still"));
    }

    #[test]
    fn prop_held_candidate_commits_once(
        stability_ms in 0u64..3_000,
        tick_ms in 1i64..200,
        ticks in 1usize..100,
    ) {
        let mut classifier = StateClassifier::new(&ClassifierConfig {
            bands: StateTable::six_state_cadence(),
            hysteresis: Some(HysteresisConfig { stability_window_ms: stability_ms, min_evidence: 0 }),
        });

        // long enough to cover the stability window, plus extra ticks
        let needed = stability_ms as i64 / tick_ms + 1;
        let total = needed as usize + ticks;
        let commits = (0..total)
            .filter(|&i| {
                classifier
                    .commit(MovementState::from("Walk"), i as i64 * tick_ms, 5)
                    .is_some()
            })
            .count();

        prop_assert_eq!(commits, 1);
        prop_assert_eq!(classifier.current(), &MovementState::from("Walk"));
    }

    #[test]
    fn prop_dropped_readings_leave_no_trace(
        readings in prop::collection::vec((1i64..100, 0.0f64..3.0), 1..150),
        noise_every in 2usize..10,
    ) {
        let mut clean = MotionPipeline::new(PipelineConfig::default());
        let mut noisy = MotionPipeline::new(PipelineConfig::default());
        let mut now = 1_000;

        for (i, (gap, z)) in readings.into_iter().enumerate() {
            now += gap;
            let reading = RawMotion::new(0.0, 0.0, z, now);

            if i > 0 && i % noise_every == 0 {
                // a malformed reading and a stale one
                let malformed = RawMotion { x: Some(f64::NAN), ..reading };
                prop_assert!(noisy.process_sample(&malformed).is_none());
                prop_assert!(noisy.process_sample(&RawMotion::new(0.0, 0.0, 9.0, now - 1_000)).is_none());
            }

            prop_assert_eq!(clean.process_sample(&reading), noisy.process_sample(&reading));
        }

        prop_assert_eq!(clean.stats().samples_accepted, noisy.stats().samples_accepted);
        prop_assert_eq!(clean.trace_snapshot(), noisy.trace_snapshot());
    }
}
