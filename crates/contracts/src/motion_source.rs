//! MotionSource trait - accelerometer stream abstraction
//!
//! Sources push readings through a callback, mirroring the way a device
//! motion event handler delivers them.

use std::sync::Arc;

use crate::RawMotion;

/// Motion reading callback type
///
/// Shared across threads; a source may invoke it from its own worker.
pub type MotionCallback = Arc<dyn Fn(RawMotion) + Send + Sync>;

/// Accelerometer data source
///
/// Implemented by recorded replays and synthetic generators alike.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn MotionSource> = build_source(&profile.source)?;
/// source.listen(Arc::new(|raw| println!("t={}", raw.timestamp_ms)));
/// // ... consume readings ...
/// source.stop();
/// ```
pub trait MotionSource: Send + Sync {
    /// Source identifier (used for logging)
    fn source_id(&self) -> &str;

    /// Register the callback and start producing readings.
    ///
    /// Calling it again while already listening is a no-op.
    fn listen(&self, callback: MotionCallback);

    /// Stop producing readings
    fn stop(&self);

    /// Whether the source is currently producing readings
    fn is_listening(&self) -> bool;
}
