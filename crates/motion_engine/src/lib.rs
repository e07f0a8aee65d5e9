//! # Motion Engine
//!
//! Signal-to-state pipeline for a single motion sensor stream.
//!
//! Stages, leaf to root:
//! - `SampleIngest`: raw 3-axis reading to magnitude, time-bounded window
//! - `StepDetector`: threshold crossing with a refractory interval
//! - `CadenceEstimator`: count or interval strategy plus smoothing
//! - `ActivityLevelEstimator`: normalized magnitude deviation
//! - `StateClassifier`: band table with optional hysteresis
//!
//! `MotionPipeline` runs every stage on each reading. It never blocks and
//! never fails; bad readings are counted and dropped.
//!
//! ## Usage
//!
//! ```ignore
//! use motion_engine::{MotionPipeline, PipelineConfig};
//!
//! let mut pipeline = MotionPipeline::new(PipelineConfig::six_state_hysteresis());
//!
//! if let Some(output) = pipeline.process_sample(&reading) {
//!     println!("{} at {} spm", output.state, output.cadence.rounded);
//! }
//! ```

mod activity;
mod cadence;
mod classifier;
mod detector;
mod ingest;
mod intensity;
mod pipeline;
mod trace;
mod window;

pub use activity::{normalize, population_std_dev, ActivityLevelEstimator};
pub use cadence::{CadenceEstimator, CadenceSmoother, CadenceSource, CountCadence, IntervalCadence};
pub use classifier::{PendingState, StateClassifier};
pub use detector::StepDetector;
pub use ingest::{magnitude, IngestOutcome, SampleIngest};
pub use intensity::{intensity_source, ActivityIntensity, CadenceIntensity, IntensitySource};
pub use pipeline::MotionPipeline;
pub use trace::MagnitudeTrace;
pub use window::{SampleWindow, StepHistory, TimeWindow, Timestamped};

// Re-export contracts types
pub use contracts::{
    ActivityConfig, ActivityReading, CadenceConfig, CadenceReading, CadenceStrategy,
    ClassifierConfig, HysteresisConfig, IntensityMode, MovementState, PipelineConfig,
    PipelineOutput, PipelineStats, RawMotion, Sample, StateBand, StateTable, StateTransition,
    StepDetectorConfig, StepEvent, TracePoint,
};
