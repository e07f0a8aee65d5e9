//! Rolling magnitude trace for chart collaborators.

use std::fmt;

use contracts::{Sample, TracePoint};
use ringbuf::{traits::*, HeapRb};

/// Fixed-capacity trace; the oldest point is overwritten when full
pub struct MagnitudeTrace {
    points: HeapRb<TracePoint>,
    peak_threshold: f64,
}

impl fmt::Debug for MagnitudeTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagnitudeTrace")
            .field("len", &self.points.occupied_len())
            .field("capacity", &self.points.capacity())
            .field("peak_threshold", &self.peak_threshold)
            .finish()
    }
}

impl MagnitudeTrace {
    pub fn new(capacity: usize, peak_threshold: f64) -> Self {
        Self {
            points: HeapRb::new(capacity.max(1)),
            peak_threshold,
        }
    }

    #[inline]
    pub fn record(&mut self, sample: &Sample) {
        self.points.push_overwrite(TracePoint {
            timestamp_ms: sample.timestamp_ms,
            magnitude: sample.magnitude,
        });
    }

    /// Points oldest first
    pub fn snapshot(&self) -> Vec<TracePoint> {
        self.points.iter().copied().collect()
    }

    /// Reference line drawn alongside the trace
    pub fn peak_threshold(&self) -> f64 {
        self.peak_threshold
    }

    pub fn len(&self) -> usize {
        self.points.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
