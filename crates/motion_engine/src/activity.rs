//! Variance-based activity level.

use contracts::{ActivityConfig, ActivityReading};
use nalgebra::DVector;

use crate::window::SampleWindow;

/// Population standard deviation of the window magnitudes
pub fn population_std_dev(window: &SampleWindow) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let magnitudes = DVector::from_iterator(window.len(), window.iter().map(|s| s.magnitude));
    magnitudes.variance().sqrt()
}

/// Map a raw deviation onto [0, 1]
#[inline]
pub fn normalize(raw_std_dev: f64, noise_floor: f64, max_expected: f64) -> f64 {
    if !raw_std_dev.is_finite() || max_expected <= 0.0 {
        return 0.0;
    }
    ((raw_std_dev - noise_floor) / max_expected).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct ActivityLevelEstimator {
    config: ActivityConfig,
    level: f64,
    latest: ActivityReading,
}

impl ActivityLevelEstimator {
    pub fn new(config: ActivityConfig) -> Self {
        Self {
            config,
            level: 0.0,
            latest: ActivityReading::default(),
        }
    }

    /// Recompute from the window and advance the follower one tick
    pub fn update(&mut self, window: &SampleWindow) -> ActivityReading {
        let (raw_std_dev, normalized) = if window.len() < self.config.min_samples {
            (0.0, 0.0)
        } else {
            let raw = population_std_dev(window);
            (
                raw,
                normalize(raw, self.config.noise_floor, self.config.max_expected),
            )
        };

        self.level += (normalized - self.level) * self.config.follow_rate;

        self.latest = ActivityReading {
            raw_std_dev,
            normalized,
            level: self.level,
            window_len: window.len(),
        };
        self.latest
    }

    pub fn latest(&self) -> ActivityReading {
        self.latest
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}
