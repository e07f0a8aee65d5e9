//! Raw motion input and the derived sample records.

use serde::{Deserialize, Serialize};

/// One raw accelerometer reading as delivered by the device callback.
///
/// Any axis may be missing; such readings are dropped at ingest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawMotion {
    /// X axis acceleration (m/s²)
    #[serde(default)]
    pub x: Option<f64>,

    /// Y axis acceleration (m/s²)
    #[serde(default)]
    pub y: Option<f64>,

    /// Z axis acceleration (m/s²)
    #[serde(default)]
    pub z: Option<f64>,

    /// Device timestamp (milliseconds)
    pub timestamp_ms: i64,
}

impl RawMotion {
    /// Reading with all three axes present
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: i64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            timestamp_ms,
        }
    }

    /// Returns the three axes when all are present
    pub fn axes(&self) -> Option<(f64, f64, f64)> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Some((x, y, z)),
            _ => None,
        }
    }
}

/// Accepted sample: timestamp plus Euclidean magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Device timestamp (milliseconds)
    pub timestamp_ms: i64,

    /// Euclidean norm of the three axes, always >= 0
    pub magnitude: f64,
}

/// A detected step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Timestamp of the sample that fired the detector
    pub timestamp_ms: i64,
}
