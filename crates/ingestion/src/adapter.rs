//! Source adapter
//!
//! Bridges a callback-style `MotionSource` onto the shared bounded channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{MotionCallback, MotionSource, RawMotion};
use tracing::{debug, trace, warn};

use crate::config::IngestionMetrics;

/// Send one reading without blocking the source thread.
///
/// A full channel drops the reading and counts it.
#[inline]
pub fn send_reading(
    tx: &Sender<RawMotion>,
    reading: RawMotion,
    metrics: &IngestionMetrics,
    source_id: &str,
) {
    match tx.try_send(reading) {
        Ok(()) => {
            metrics.update_queue_len(tx.len());
            trace!(source_id = %source_id, "reading queued");
        }
        Err(TrySendError::Full(_)) => {
            metrics.record_dropped();
            trace!(source_id = %source_id, "reading dropped (queue full)");
        }
        Err(TrySendError::Closed(_)) => {
            warn!(source_id = %source_id, "channel closed");
        }
    }
}

/// Adapter owning one registered source
pub struct SourceAdapter {
    source_id: String,
    source: Box<dyn MotionSource>,
    listening: Arc<AtomicBool>,
}

impl SourceAdapter {
    pub fn new(source_id: String, source: Box<dyn MotionSource>) -> Self {
        Self {
            source_id,
            source,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Start forwarding readings into `tx`. Idempotent.
    pub fn start(&self, tx: Sender<RawMotion>, metrics: Arc<IngestionMetrics>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let listening = self.listening.clone();

        debug!(source_id = %source_id, "starting source adapter");

        let callback: MotionCallback = Arc::new(move |reading| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_received();
            send_reading(&tx, reading, &metrics, &source_id);
        });

        self.source.listen(callback);
    }

    pub fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.source_id, "stopping source adapter");
            self.source.stop();
        }
    }

    /// Whether the adapter is started and its source still produces readings
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed) && self.source.is_listening()
    }
}
