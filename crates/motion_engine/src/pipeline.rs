//! Per-sample orchestration.

use contracts::{
    ActivityReading, CadenceReading, IntensityMode, MovementState, PipelineConfig, PipelineOutput,
    PipelineStats, RawMotion, TracePoint,
};
use tracing::{instrument, trace};

use crate::activity::ActivityLevelEstimator;
use crate::cadence::CadenceEstimator;
use crate::classifier::StateClassifier;
use crate::detector::StepDetector;
use crate::ingest::{IngestOutcome, SampleIngest};
use crate::intensity::{intensity_source, IntensitySource};
use crate::trace::MagnitudeTrace;

/// Motion pipeline
///
/// Owns every stage and runs each raw reading to completion:
/// ingest, step detection, cadence, activity, classification and commit.
/// Dropped readings leave all state untouched apart from the drop counters.
#[derive(Debug)]
pub struct MotionPipeline {
    config: PipelineConfig,
    ingest: SampleIngest,
    detector: StepDetector,
    cadence: CadenceEstimator,
    activity: ActivityLevelEstimator,
    intensity: Box<dyn IntensitySource>,
    classifier: StateClassifier,
    trace: MagnitudeTrace,
    stats: PipelineStats,
}

impl MotionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let detector = StepDetector::new(&config.detector, config.cadence.history_window_ms);
        let trace = MagnitudeTrace::new(config.trace.capacity, config.detector.peak_threshold);

        Self {
            ingest: SampleIngest::new(config.ingest.window_ms),
            detector,
            cadence: CadenceEstimator::from_config(&config.cadence),
            activity: ActivityLevelEstimator::new(config.activity.clone()),
            intensity: intensity_source(config.intensity),
            classifier: StateClassifier::new(&config.classifier),
            trace,
            stats: PipelineStats::default(),
            config,
        }
    }

    /// Process one raw reading
    ///
    /// Returns `None` when the reading was malformed or out of order.
    #[instrument(
        level = "trace",
        name = "motion_pipeline_process",
        skip(self, raw),
        fields(timestamp_ms = raw.timestamp_ms)
    )]
    pub fn process_sample(&mut self, raw: &RawMotion) -> Option<PipelineOutput> {
        let sample = match self.ingest.ingest(raw) {
            IngestOutcome::Accepted(sample) => sample,
            IngestOutcome::Malformed => {
                self.stats.malformed_dropped += 1;
                metrics::counter!("stride_samples_total", "status" => "malformed").increment(1);
                trace!("malformed reading dropped");
                return None;
            }
            IngestOutcome::OutOfOrder => {
                self.stats.out_of_order_dropped += 1;
                metrics::counter!("stride_samples_total", "status" => "out_of_order").increment(1);
                trace!("out-of-order reading dropped");
                return None;
            }
        };
        self.stats.samples_accepted += 1;
        metrics::counter!("stride_samples_total", "status" => "accepted").increment(1);

        let step_fired = self.detector.detect(&sample);
        if step_fired {
            self.stats.steps_detected += 1;
            metrics::counter!("stride_steps_total").increment(1);
        }

        let cadence = self.cadence.update(self.detector.history());
        let activity = self.activity.update(self.ingest.window());

        let value = self.intensity.value(&cadence, &activity);
        let evidence = self.intensity.evidence(&cadence, &activity);
        let candidate = self.classifier.classify(value);
        let transition = self
            .classifier
            .commit(candidate.clone(), sample.timestamp_ms, evidence);

        if let Some(transition) = &transition {
            self.stats.transitions += 1;
            metrics::counter!(
                "stride_transitions_total",
                "to" => transition.to.label().to_string()
            )
            .increment(1);
        }

        self.trace.record(&sample);

        Some(PipelineOutput {
            sequence: self.stats.samples_accepted,
            timestamp_ms: sample.timestamp_ms,
            magnitude: sample.magnitude,
            peak_threshold: self.detector.peak_threshold(),
            step_fired,
            cadence,
            activity,
            candidate,
            state: self.classifier.current().clone(),
            transition,
        })
    }

    pub fn current_state(&self) -> &MovementState {
        self.classifier.current()
    }

    pub fn cadence(&self) -> CadenceReading {
        self.cadence.latest()
    }

    pub fn activity(&self) -> ActivityReading {
        self.activity.latest()
    }

    /// Active classification input
    pub fn intensity_mode(&self) -> IntensityMode {
        self.intensity.mode()
    }

    pub fn trace_snapshot(&self) -> Vec<TracePoint> {
        self.trace.snapshot()
    }

    pub fn peak_threshold(&self) -> f64 {
        self.trace.peak_threshold()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the configured cadence strategy
    pub fn cadence_strategy(&self) -> &'static str {
        self.cadence.strategy_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ClassifierConfig, HysteresisConfig, StateTable};

    fn reading(z: f64, ts: i64) -> RawMotion {
        RawMotion::new(0.0, 0.0, z, ts)
    }

    #[test]
    fn test_dropped_readings_do_not_mutate() {
        let mut pipeline = MotionPipeline::new(PipelineConfig::default());
        assert!(pipeline.process_sample(&reading(2.0, 1000)).is_some());

        let malformed = RawMotion {
            x: None,
            y: Some(0.0),
            z: Some(5.0),
            timestamp_ms: 2000,
        };
        assert!(pipeline.process_sample(&malformed).is_none());
        assert!(pipeline.process_sample(&reading(5.0, 500)).is_none());

        let stats = pipeline.stats();
        assert_eq!(stats.samples_accepted, 1);
        assert_eq!(stats.malformed_dropped, 1);
        assert_eq!(stats.out_of_order_dropped, 1);
        assert_eq!(stats.samples_offered(), 3);
        assert_eq!(pipeline.trace_snapshot().len(), 1);
    }

    #[test]
    fn test_output_fields() {
        let mut pipeline = MotionPipeline::new(PipelineConfig::default());
        let out = pipeline.process_sample(&reading(2.0, 0)).unwrap();

        assert_eq!(out.sequence, 1);
        assert!(out.step_fired);
        assert_eq!(out.magnitude, 2.0);
        assert_eq!(out.peak_threshold, 1.2);
        assert_eq!(out.cadence.history_len, 1);
        // one step in a 5 s window -> 12 per minute
        assert_eq!(out.cadence.rounded, 12);
        assert_eq!(out.state, MovementState::from("Still"));
        assert!(out.transition.is_none());
    }

    #[test]
    fn test_walk_commits_with_hysteresis() {
        let mut config = PipelineConfig::six_state_hysteresis();
        config.classifier.hysteresis = Some(HysteresisConfig {
            stability_window_ms: 1000,
            min_evidence: 3,
        });
        let mut pipeline = MotionPipeline::new(config);

        // one step every 750 ms -> 80 per minute
        let mut transitions = Vec::new();
        for i in 0..400 {
            let ts = i * 25;
            let z = if ts % 750 == 0 { 2.0 } else { 0.5 };
            if let Some(t) = pipeline.process_sample(&reading(z, ts)).and_then(|o| o.transition) {
                transitions.push(t);
            }
        }

        assert!(!transitions.is_empty());
        assert_eq!(transitions[0].from, MovementState::from("Still"));
        assert_eq!(pipeline.cadence().rounded, 80);
        assert_eq!(pipeline.current_state(), &MovementState::from("Transition"));
        assert_eq!(pipeline.cadence_strategy(), "interval");
    }

    #[test]
    fn test_activity_mode_uses_level() {
        let mut config = PipelineConfig::activity_levels();
        config.classifier = ClassifierConfig {
            bands: StateTable::activity_levels(),
            hysteresis: None,
        };
        let mut pipeline = MotionPipeline::new(config);
        assert_eq!(pipeline.intensity_mode(), IntensityMode::Activity);

        for i in 0..200 {
            let z = if i % 2 == 0 { 0.0 } else { 4.0 };
            pipeline.process_sample(&reading(z, i * 20));
        }

        let activity = pipeline.activity();
        // std dev close to 2.0 -> (2.0 - 0.1) / 3.0
        assert!((activity.normalized - 0.633).abs() < 0.01);
        assert!(activity.level > 0.35 && activity.level <= activity.normalized);
        assert_eq!(pipeline.current_state(), &MovementState::from("Run"));
    }

    #[test]
    fn test_trace_capacity() {
        let mut config = PipelineConfig::default();
        config.trace.capacity = 10;
        let mut pipeline = MotionPipeline::new(config);
        for i in 0..25 {
            pipeline.process_sample(&reading(1.0, i * 20));
        }
        let trace = pipeline.trace_snapshot();
        assert_eq!(trace.len(), 10);
        assert_eq!(trace[0].timestamp_ms, 300);
        assert_eq!(pipeline.peak_threshold(), 1.2);
    }
}
