//! Per-sample pipeline output - consumed by sinks and UI collaborators.

use serde::{Deserialize, Serialize};

use crate::{IntensityMode, MovementState};

/// Snapshot produced for every accepted sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Accepted-sample counter, starting at 1
    pub sequence: u64,

    /// Device timestamp of the sample (ms)
    pub timestamp_ms: i64,

    /// Sample magnitude, for the rolling plot
    pub magnitude: f64,

    /// Configured step threshold, for the plot's reference line
    pub peak_threshold: f64,

    /// Whether this sample fired the step detector
    pub step_fired: bool,

    /// Cadence path reading
    pub cadence: CadenceReading,

    /// Activity path reading
    pub activity: ActivityReading,

    /// Classification of this sample before hysteresis
    pub candidate: MovementState,

    /// Committed state
    pub state: MovementState,

    /// Set when this sample committed a new state
    #[serde(default)]
    pub transition: Option<StateTransition>,
}

impl PipelineOutput {
    /// Numeric value handed to the classifier, per the active intensity path
    pub fn intensity(&self, mode: IntensityMode) -> f64 {
        match mode {
            IntensityMode::Cadence => f64::from(self.cadence.rounded),
            IntensityMode::Activity => self.activity.level,
        }
    }
}

/// Cadence estimator reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CadenceReading {
    /// Freshly computed steps per minute
    pub raw: f64,

    /// Exponentially smoothed steps per minute
    pub smoothed: f64,

    /// `round(smoothed)`, the displayed cadence
    pub rounded: u32,

    /// Step events currently retained
    pub history_len: usize,
}

/// Activity estimator reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityReading {
    /// Population standard deviation of window magnitudes
    pub raw_std_dev: f64,

    /// Normalized target in [0, 1]
    pub normalized: f64,

    /// Follower value exposed to consumers, in [0, 1]
    pub level: f64,

    /// Samples currently in the window
    pub window_len: usize,
}

/// A committed state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: MovementState,
    pub to: MovementState,
    /// Timestamp of the committing sample (ms)
    pub at_ms: i64,
}

/// One point of the rolling magnitude plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub timestamp_ms: i64,
    pub magnitude: f64,
}

/// Per-instance pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Samples that passed ingest
    pub samples_accepted: u64,
    /// Readings with a missing axis
    pub malformed_dropped: u64,
    /// Readings older than the newest accepted sample
    pub out_of_order_dropped: u64,
    /// Step detector firings
    pub steps_detected: u64,
    /// Committed state changes
    pub transitions: u64,
}

impl PipelineStats {
    /// Total readings offered to the pipeline
    pub fn samples_offered(&self) -> u64 {
        self.samples_accepted + self.malformed_dropped + self.out_of_order_dropped
    }
}
