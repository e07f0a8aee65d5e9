//! Replay source - plays back a JSONL recording of raw readings

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{MotionCallback, MotionSource, RawMotion, ReplayConfig};
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};

/// Replay source
///
/// Readings are sorted by timestamp at load time. Each loop pass shifts
/// timestamps forward by the recording period so they keep increasing.
pub struct ReplaySource {
    source_id: String,
    readings: Arc<Vec<RawMotion>>,
    config: ReplayConfig,
    listening: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReplaySource {
    /// Load the recording named by `config.path`
    pub fn load(source_id: impl Into<String>, config: ReplayConfig) -> Result<Self> {
        let source_id = source_id.into();
        let readings = read_recording(&config.path)?;

        info!(
            source_id = %source_id,
            readings = readings.len(),
            path = %config.path.display(),
            "loaded recording"
        );

        Ok(Self::from_readings(source_id, readings, config))
    }

    /// Build from readings already in memory
    pub fn from_readings(
        source_id: impl Into<String>,
        mut readings: Vec<RawMotion>,
        config: ReplayConfig,
    ) -> Self {
        readings.sort_by_key(|r| r.timestamp_ms);
        Self {
            source_id: source_id.into(),
            readings: Arc::new(readings),
            config,
            listening: Arc::new(AtomicBool::new(false)),
            thread_handle: Mutex::new(None),
        }
    }

    /// Number of readings in one pass
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Timestamp shift applied per loop pass (ms)
    fn loop_period(readings: &[RawMotion]) -> i64 {
        match (readings.first(), readings.last()) {
            (Some(first), Some(last)) if readings.len() > 1 => {
                let span = last.timestamp_ms - first.timestamp_ms;
                let gap = (span / (readings.len() as i64 - 1)).max(1);
                span + gap
            }
            _ => 1,
        }
    }
}

/// Parse a JSONL recording; blank lines are skipped
pub fn read_recording(path: &Path) -> Result<Vec<RawMotion>> {
    let io_err = |source| IngestionError::RecordingIo {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let reader = BufReader::new(file);

    let mut readings = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }

        let reading: RawMotion =
            serde_json::from_str(&line).map_err(|e| IngestionError::RecordingParse {
                path: path.display().to_string(),
                line: idx + 1,
                message: e.to_string(),
            })?;
        readings.push(reading);
    }

    Ok(readings)
}

impl MotionSource for ReplaySource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn listen(&self, callback: MotionCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = self.listening.clone();
        let source_id = self.source_id.clone();
        let readings = self.readings.clone();
        let speed = self.config.speed_multiplier;
        let loop_playback = self.config.loop_playback;

        let handle = thread::spawn(move || {
            debug!(source_id = %source_id, "replay thread started");

            let Some(first_timestamp) = readings.first().map(|r| r.timestamp_ms) else {
                warn!(source_id = %source_id, "no readings to replay");
                listening.store(false, Ordering::SeqCst);
                return;
            };
            let period = ReplaySource::loop_period(&readings);
            let mut pass: i64 = 0;

            loop {
                let start_time = Instant::now();
                let shift = pass * period;

                for reading in readings.iter() {
                    if !listening.load(Ordering::Relaxed) {
                        debug!(source_id = %source_id, "replay stopped");
                        return;
                    }

                    if speed > 0.0 {
                        let offset_ms = (reading.timestamp_ms - first_timestamp) as f64;
                        let target = Duration::from_secs_f64(offset_ms / 1000.0 / speed);
                        let elapsed = start_time.elapsed();
                        if target > elapsed {
                            thread::sleep(target - elapsed);
                        }
                    }

                    callback(RawMotion {
                        timestamp_ms: reading.timestamp_ms + shift,
                        ..*reading
                    });
                }

                if !loop_playback {
                    info!(source_id = %source_id, "replay completed");
                    break;
                }

                pass += 1;
                debug!(source_id = %source_id, pass, "looping replay");
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

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}
