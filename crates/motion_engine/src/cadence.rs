//! Cadence estimation: raw steps-per-minute strategies plus smoothing.

use contracts::{CadenceConfig, CadenceReading, CadenceStrategy};

use crate::window::StepHistory;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Strategy turning the step history into a raw rate per minute
pub trait CadenceSource: Send + std::fmt::Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Raw cadence for the current history, 0 when undefined
    fn raw_cadence(&self, history: &StepHistory) -> f64;
}

/// Steps currently in the history window scaled to one minute
#[derive(Debug, Clone, Copy)]
pub struct CountCadence {
    window_ms: u64,
}

impl CountCadence {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms }
    }
}

impl CadenceSource for CountCadence {
    fn name(&self) -> &'static str {
        "count"
    }

    fn raw_cadence(&self, history: &StepHistory) -> f64 {
        if self.window_ms == 0 {
            return 0.0;
        }
        history.len() as f64 * (MS_PER_MINUTE / self.window_ms as f64)
    }
}

/// Mean spacing of the most recent events
#[derive(Debug, Clone, Copy)]
pub struct IntervalCadence {
    max_events: usize,
}

impl IntervalCadence {
    pub fn new(max_events: usize) -> Self {
        Self { max_events }
    }
}

impl CadenceSource for IntervalCadence {
    fn name(&self) -> &'static str {
        "interval"
    }

    fn raw_cadence(&self, history: &StepHistory) -> f64 {
        let take = self.max_events.min(history.len());
        if take < 2 {
            return 0.0;
        }

        let recent: Vec<i64> = history
            .iter()
            .skip(history.len() - take)
            .map(|e| e.timestamp_ms)
            .collect();
        let total: i64 = recent.windows(2).map(|w| w[1] - w[0]).sum();
        let average = total as f64 / (take - 1) as f64;

        if average <= 0.0 {
            0.0
        } else {
            MS_PER_MINUTE / average
        }
    }
}

/// Exponential smoothing with decay toward zero while the raw rate is zero
#[derive(Debug, Clone)]
pub struct CadenceSmoother {
    alpha: f64,
    decay_factor: f64,
    snap_floor: f64,
    smoothed: f64,
}

impl CadenceSmoother {
    pub fn new(alpha: f64, decay_factor: f64, snap_floor: f64) -> Self {
        Self {
            alpha,
            decay_factor,
            snap_floor,
            smoothed: 0.0,
        }
    }

    /// Seed the accumulator (mainly for tests and warm restarts)
    pub fn with_value(mut self, smoothed: f64) -> Self {
        self.smoothed = smoothed;
        self
    }

    pub fn update(&mut self, raw: f64) -> f64 {
        if raw > 0.0 {
            self.smoothed = if self.smoothed == 0.0 {
                raw
            } else {
                self.alpha * raw + (1.0 - self.alpha) * self.smoothed
            };
        } else if self.smoothed > 0.0 {
            self.smoothed *= self.decay_factor;
            if self.smoothed < self.snap_floor {
                self.smoothed = 0.0;
            }
        }
        self.smoothed
    }

    pub fn value(&self) -> f64 {
        self.smoothed
    }
}

/// Raw strategy plus smoother
#[derive(Debug)]
pub struct CadenceEstimator {
    source: Box<dyn CadenceSource>,
    smoother: CadenceSmoother,
    latest: CadenceReading,
}

impl CadenceEstimator {
    pub fn new(source: Box<dyn CadenceSource>, smoother: CadenceSmoother) -> Self {
        Self {
            source,
            smoother,
            latest: CadenceReading::default(),
        }
    }

    pub fn from_config(config: &CadenceConfig) -> Self {
        let source: Box<dyn CadenceSource> = match config.strategy {
            CadenceStrategy::Count => Box::new(CountCadence::new(config.history_window_ms)),
            CadenceStrategy::Interval { max_events } => {
                Box::new(IntervalCadence::new(max_events))
            }
        };
        let smoother = CadenceSmoother::new(
            config.smoothing_alpha,
            config.decay_factor,
            config.snap_floor,
        );
        Self::new(source, smoother)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn update(&mut self, history: &StepHistory) -> CadenceReading {
        let raw = self.source.raw_cadence(history);
        let smoothed = self.smoother.update(raw);
        self.latest = CadenceReading {
            raw,
            smoothed,
            rounded: smoothed.round() as u32,
            history_len: history.len(),
        };
        self.latest
    }

    pub fn latest(&self) -> CadenceReading {
        self.latest
    }
}
