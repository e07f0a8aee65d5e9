//! Pipeline configuration contracts shared by the engine, loader and CLI.

use serde::{Deserialize, Serialize};

use crate::StateTable;

/// Complete tuning of one motion pipeline instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sample window configuration
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Step detector configuration
    #[serde(default)]
    pub detector: StepDetectorConfig,

    /// Cadence estimation configuration
    #[serde(default)]
    pub cadence: CadenceConfig,

    /// Activity level configuration
    #[serde(default)]
    pub activity: ActivityConfig,

    /// Which numeric path drives classification
    #[serde(default)]
    pub intensity: IntensityMode,

    /// Classification table and hysteresis
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Chart trace configuration
    #[serde(default)]
    pub trace: TraceConfig,
}

impl PipelineConfig {
    /// Six-state cadence classification with hysteresis.
    pub fn six_state_hysteresis() -> Self {
        Self {
            cadence: CadenceConfig {
                strategy: CadenceStrategy::Interval {
                    max_events: default_interval_events(),
                },
                ..CadenceConfig::default()
            },
            classifier: ClassifierConfig {
                bands: StateTable::six_state_cadence(),
                hysteresis: Some(HysteresisConfig::default()),
            },
            ..Self::default()
        }
    }

    /// Variance-driven activity classification.
    pub fn activity_levels() -> Self {
        Self {
            intensity: IntensityMode::Activity,
            classifier: ClassifierConfig {
                bands: StateTable::activity_levels(),
                hysteresis: None,
            },
            ..Self::default()
        }
    }
}

/// Sample window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Time span retained in the sample window (ms)
    #[serde(default = "default_sample_window_ms")]
    pub window_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            window_ms: default_sample_window_ms(),
        }
    }
}

fn default_sample_window_ms() -> u64 {
    1000
}

/// Threshold-with-refractory step detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDetectorConfig {
    /// Magnitude that must be strictly exceeded to fire
    #[serde(default = "default_peak_threshold")]
    pub peak_threshold: f64,

    /// Minimum spacing between two steps (ms), compared strictly
    #[serde(default = "default_refractory_ms")]
    pub refractory_ms: u64,
}

impl Default for StepDetectorConfig {
    fn default() -> Self {
        Self {
            peak_threshold: default_peak_threshold(),
            refractory_ms: default_refractory_ms(),
        }
    }
}

fn default_peak_threshold() -> f64 {
    1.2
}

fn default_refractory_ms() -> u64 {
    300
}

/// Cadence estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Raw cadence algorithm
    #[serde(default)]
    pub strategy: CadenceStrategy,

    /// Time span retained in the step history (ms)
    #[serde(default = "default_step_window_ms")]
    pub history_window_ms: u64,

    /// EMA weight of the newest raw value, in (0, 1]
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,

    /// Multiplier applied while raw cadence is zero, in (0, 1)
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f64,

    /// Decayed values below this snap to zero
    #[serde(default = "default_snap_floor")]
    pub snap_floor: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            strategy: CadenceStrategy::default(),
            history_window_ms: default_step_window_ms(),
            smoothing_alpha: default_smoothing_alpha(),
            decay_factor: default_decay_factor(),
            snap_floor: default_snap_floor(),
        }
    }
}

fn default_step_window_ms() -> u64 {
    5000
}

fn default_smoothing_alpha() -> f64 {
    0.3
}

fn default_decay_factor() -> f64 {
    0.85
}

fn default_snap_floor() -> f64 {
    1.0
}

fn default_interval_events() -> usize {
    5
}

/// Raw cadence algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CadenceStrategy {
    /// Steps in the history window scaled to one minute
    #[default]
    Count,
    /// Average spacing of the most recent events
    Interval {
        #[serde(default = "default_interval_events")]
        max_events: usize,
    },
}

/// Variance-based activity configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Below this many samples the reading is zero
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Standard deviation treated as sensor noise
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,

    /// Standard deviation above the noise floor that maps to 1.0
    #[serde(default = "default_max_expected")]
    pub max_expected: f64,

    /// Fraction of the gap closed per sample by the exposed level
    #[serde(default = "default_follow_rate")]
    pub follow_rate: f64,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            noise_floor: default_noise_floor(),
            max_expected: default_max_expected(),
            follow_rate: default_follow_rate(),
        }
    }
}

fn default_min_samples() -> usize {
    10
}

fn default_noise_floor() -> f64 {
    0.1
}

fn default_max_expected() -> f64 {
    3.0
}

fn default_follow_rate() -> f64 {
    0.05
}

/// Numeric path feeding the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityMode {
    /// Rounded smoothed cadence (steps per minute)
    #[default]
    Cadence,
    /// Smoothed normalized activity in [0, 1]
    Activity,
}

/// Classification configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered bands, lowest first
    #[serde(default)]
    pub bands: StateTable,

    /// Debounce settings; `None` commits every change immediately
    #[serde(default)]
    pub hysteresis: Option<HysteresisConfig>,
}

/// Hysteresis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HysteresisConfig {
    /// How long a candidate must persist before it commits (ms)
    #[serde(default = "default_stability_window_ms")]
    pub stability_window_ms: u64,

    /// Minimum history length behind a non-rest commit
    #[serde(default = "default_min_evidence")]
    pub min_evidence: usize,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            stability_window_ms: default_stability_window_ms(),
            min_evidence: default_min_evidence(),
        }
    }
}

fn default_stability_window_ms() -> u64 {
    1500
}

fn default_min_evidence() -> usize {
    3
}

/// Rolling chart trace configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Points kept for the rolling plot
    #[serde(default = "default_trace_capacity")]
    pub capacity: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capacity: default_trace_capacity(),
        }
    }
}

fn default_trace_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.detector.peak_threshold, 1.2);
        assert_eq!(config.detector.refractory_ms, 300);
        assert_eq!(config.cadence.history_window_ms, 5000);
        assert_eq!(config.activity.min_samples, 10);
        assert_eq!(config.trace.capacity, 100);
        assert!(config.classifier.hysteresis.is_none());
    }

    #[test]
    fn test_interval_strategy_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            intensity = "cadence"

            [cadence]
            strategy = { kind = "interval", max_events = 4 }
            smoothing_alpha = 0.5

            [classifier.hysteresis]
            stability_window_ms = 800
            "#,
        )
        .unwrap();

        assert_eq!(
            config.cadence.strategy,
            CadenceStrategy::Interval { max_events: 4 }
        );
        assert_eq!(config.cadence.smoothing_alpha, 0.5);
        let hysteresis = config.classifier.hysteresis.unwrap();
        assert_eq!(hysteresis.stability_window_ms, 800);
        assert_eq!(hysteresis.min_evidence, 3);
    }

    #[test]
    fn test_presets() {
        let six = PipelineConfig::six_state_hysteresis();
        assert_eq!(six.classifier.bands.bands().len(), 6);
        assert!(six.classifier.hysteresis.is_some());

        let activity = PipelineConfig::activity_levels();
        assert_eq!(activity.intensity, IntensityMode::Activity);
    }
}
