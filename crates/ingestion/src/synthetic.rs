//! Synthetic gait source
//!
//! Produces a walking-like accelerometer stream without a device: a flat
//! baseline with one raised-cosine impulse per step.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{MotionCallback, MotionSource, RawMotion, SyntheticGaitConfig};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{IngestionError, Result};

/// Fraction of each step cycle occupied by the impact pulse
const PULSE_WIDTH: f64 = 0.2;

/// Deterministic gait signal (noise is applied by the caller)
#[derive(Debug, Clone)]
pub struct GaitSignal {
    config: SyntheticGaitConfig,
}

impl GaitSignal {
    pub fn new(config: SyntheticGaitConfig) -> Self {
        Self { config }
    }

    /// Milliseconds between readings
    pub fn sample_interval_ms(&self) -> f64 {
        1000.0 / self.config.sample_rate_hz
    }

    /// Number of readings covered by `duration_s`, if bounded
    pub fn sample_count(&self) -> Option<u64> {
        self.config
            .duration_s
            .map(|d| (d * self.config.sample_rate_hz).round() as u64)
    }

    /// Magnitude at reading `index`
    pub fn magnitude_at(&self, index: u64) -> f64 {
        let t_s = index as f64 / self.config.sample_rate_hz;
        let phase = (t_s * self.config.step_rate_hz).fract();
        let pulse = if phase < PULSE_WIDTH {
            0.5 * (1.0 - (2.0 * PI * phase / PULSE_WIDTH).cos())
        } else {
            0.0
        };
        self.config.baseline + (self.config.peak - self.config.baseline) * pulse
    }

    /// Reading at `index`, with the impulse on the z axis
    pub fn reading_at<R: Rng>(&self, index: u64, rng: &mut R) -> RawMotion {
        let timestamp_ms = (index as f64 * self.sample_interval_ms()).round() as i64;
        let mut jitter = || {
            if self.config.noise > 0.0 {
                rng.random_range(-self.config.noise..=self.config.noise)
            } else {
                0.0
            }
        };
        let (x, y) = (jitter(), jitter());
        let z = self.magnitude_at(index) + jitter();
        RawMotion::new(x, y, z, timestamp_ms)
    }

    /// Materialize a bounded run
    pub fn generate(&self) -> Result<Vec<RawMotion>> {
        let count = self.sample_count().ok_or_else(|| IngestionError::InvalidSource {
            source_id: "synthetic".to_string(),
            message: "an unbounded gait cannot be materialized".to_string(),
        })?;
        let mut rng = rand::rng();
        Ok((0..count).map(|i| self.reading_at(i, &mut rng)).collect())
    }
}

/// Synthetic gait source
pub struct SyntheticGaitSource {
    source_id: String,
    signal: GaitSignal,
    realtime: bool,
    listening: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl SyntheticGaitSource {
    pub fn new(source_id: impl Into<String>, config: SyntheticGaitConfig) -> Self {
        Self {
            source_id: source_id.into(),
            realtime: config.realtime,
            signal: GaitSignal::new(config),
            listening: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        }
    }

    pub fn signal(&self) -> &GaitSignal {
        &self.signal
    }
}

impl MotionSource for SyntheticGaitSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn listen(&self, callback: MotionCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = self.listening.clone();
        let source_id = self.source_id.clone();
        let signal = self.signal.clone();
        let realtime = self.realtime;

        let handle = thread::spawn(move || {
            let interval = Duration::from_secs_f64(signal.sample_interval_ms() / 1000.0);
            let limit = signal.sample_count();
            let mut rng = rand::rng();
            let start_time = Instant::now();
            let mut index: u64 = 0;

            debug!(source_id = %source_id, ?limit, realtime, "synthetic gait started");

            while listening.load(Ordering::Relaxed) {
                if limit.is_some_and(|n| index >= n) {
                    info!(source_id = %source_id, readings = index, "synthetic gait completed");
                    break;
                }

                if realtime {
                    let target = interval.mul_f64(index as f64);
                    let elapsed = start_time.elapsed();
                    if target > elapsed {
                        thread::sleep(target - elapsed);
                    }
                }

                callback(signal.reading_at(index, &mut rng));
                index += 1;
            }

            listening.store(false, Ordering::SeqCst);
        });

        if let Ok(mut slot) = self.thread_handle.lock() {
            *slot = Some(handle);
        }
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);

        let handle = self.thread_handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

impl Drop for SyntheticGaitSource {
    fn drop(&mut self) {
        self.stop();
    }
}
