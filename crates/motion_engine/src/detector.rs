//! Threshold step detector with a refractory interval.
//!
//! Not a local-maximum detector: a sustained excursion above the threshold
//! fires once per refractory period.

use contracts::{Sample, StepDetectorConfig, StepEvent};

use crate::window::StepHistory;

#[derive(Debug, Clone)]
pub struct StepDetector {
    peak_threshold: f64,
    refractory_ms: i64,
    last_step: Option<i64>,
    history: StepHistory,
    total_steps: u64,
}

impl StepDetector {
    /// `history_window_ms` bounds the retained step history
    pub fn new(config: &StepDetectorConfig, history_window_ms: u64) -> Self {
        Self {
            peak_threshold: config.peak_threshold,
            refractory_ms: i64::try_from(config.refractory_ms).unwrap_or(i64::MAX),
            last_step: None,
            history: StepHistory::new(history_window_ms),
            total_steps: 0,
        }
    }

    /// Returns whether `sample` fired a step.
    ///
    /// The history is pruned against the sample timestamp either way.
    pub fn detect(&mut self, sample: &Sample) -> bool {
        let eligible = self
            .last_step
            .map_or(true, |last| sample.timestamp_ms.saturating_sub(last) > self.refractory_ms);

        let fired = sample.magnitude > self.peak_threshold && eligible;
        if fired {
            self.last_step = Some(sample.timestamp_ms);
            self.total_steps += 1;
            self.history.push(StepEvent {
                timestamp_ms: sample.timestamp_ms,
            });
        } else {
            self.history.evict(sample.timestamp_ms);
        }
        fired
    }

    pub fn history(&self) -> &StepHistory {
        &self.history
    }

    pub fn last_step(&self) -> Option<i64> {
        self.last_step
    }

    pub fn peak_threshold(&self) -> f64 {
        self.peak_threshold
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}
