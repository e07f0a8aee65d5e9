//! Sample ingest: raw reading to magnitude sample.

use contracts::{RawMotion, Sample};
use nalgebra::Vector3;

use crate::window::SampleWindow;

/// Result of offering one raw reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IngestOutcome {
    /// Sample appended to the window
    Accepted(Sample),
    /// An axis was missing or not finite; nothing changed
    Malformed,
    /// Older than the newest accepted sample; nothing changed
    OutOfOrder,
}

/// Euclidean norm of a three-axis reading
#[inline]
pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    Vector3::new(x, y, z).norm()
}

/// Ingest stage owning the sample window
#[derive(Debug, Clone)]
pub struct SampleIngest {
    window: SampleWindow,
    last_timestamp: Option<i64>,
}

impl SampleIngest {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: SampleWindow::new(window_ms),
            last_timestamp: None,
        }
    }

    pub fn ingest(&mut self, raw: &RawMotion) -> IngestOutcome {
        let Some((x, y, z)) = raw.axes() else {
            return IngestOutcome::Malformed;
        };
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return IngestOutcome::Malformed;
        }
        if self.last_timestamp.is_some_and(|last| raw.timestamp_ms < last) {
            return IngestOutcome::OutOfOrder;
        }

        let sample = Sample {
            timestamp_ms: raw.timestamp_ms,
            magnitude: magnitude(x, y, z),
        };
        self.last_timestamp = Some(sample.timestamp_ms);
        self.window.push(sample);
        IngestOutcome::Accepted(sample)
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }
}
