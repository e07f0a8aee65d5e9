//! MotionProfile - Config Loader output
//!
//! Describes a complete run: pipeline tuning, sample source and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::PipelineConfig;

/// Profile format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileVersion {
    #[default]
    V1,
}

/// Complete run profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotionProfile {
    /// Profile version
    #[serde(default)]
    pub version: ProfileVersion,

    /// Signal-to-state pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Where raw samples come from
    #[serde(default)]
    pub source: SourceConfig,

    /// When outputs are forwarded to sinks
    #[serde(default)]
    pub emit: EmitPolicy,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Raw sample source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Generated walking-like signal
    Synthetic(SyntheticGaitConfig),
    /// Recorded JSONL playback
    Replay(ReplayConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Synthetic(SyntheticGaitConfig::default())
    }
}

/// Synthetic gait generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticGaitConfig {
    /// Readings per second
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Steps per second (1.8 Hz is about 108 steps per minute)
    #[serde(default = "default_step_rate_hz")]
    pub step_rate_hz: f64,

    /// Magnitude between impacts
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Magnitude at each impact
    #[serde(default = "default_peak")]
    pub peak: f64,

    /// Uniform noise amplitude added to every axis
    #[serde(default)]
    pub noise: f64,

    /// Stop after this many seconds; `None` runs until stopped
    #[serde(default)]
    pub duration_s: Option<f64>,

    /// Pace readings in real time instead of emitting as fast as possible
    #[serde(default = "default_realtime")]
    pub realtime: bool,
}

impl Default for SyntheticGaitConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate_hz(),
            step_rate_hz: default_step_rate_hz(),
            baseline: default_baseline(),
            peak: default_peak(),
            noise: 0.0,
            duration_s: Some(30.0),
            realtime: default_realtime(),
        }
    }
}

fn default_sample_rate_hz() -> f64 {
    50.0
}

fn default_step_rate_hz() -> f64 {
    1.8
}

fn default_baseline() -> f64 {
    0.3
}

fn default_peak() -> f64 {
    2.0
}

fn default_realtime() -> bool {
    true
}

/// Recorded playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSONL recording, one raw reading per line
    pub path: PathBuf,

    /// Playback speed multiplier (1.0 = original spacing, 0 = no pacing)
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,

    /// Restart from the beginning when the recording ends
    #[serde(default)]
    pub loop_playback: bool,
}

fn default_speed_multiplier() -> f64 {
    1.0
}

/// When pipeline outputs reach the sinks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitPolicy {
    /// Forward every processed sample
    #[default]
    EverySample,
    /// Forward only samples that committed a transition
    TransitionsOnly,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// JSONL file output
    File,
    /// Network output (UDP)
    Network,
}
