//! Source construction from profile configuration

use contracts::{MotionSource, SourceConfig};
use tracing::info;

use crate::error::Result;
use crate::replay::ReplaySource;
use crate::synthetic::SyntheticGaitSource;

/// Build the source described by `config`
pub fn build_source(source_id: &str, config: &SourceConfig) -> Result<Box<dyn MotionSource>> {
    match config {
        SourceConfig::Synthetic(gait) => {
            info!(
                source_id = %source_id,
                step_rate_hz = gait.step_rate_hz,
                sample_rate_hz = gait.sample_rate_hz,
                "using synthetic gait source"
            );
            Ok(Box::new(SyntheticGaitSource::new(source_id, gait.clone())))
        }
        SourceConfig::Replay(replay) => {
            let source = ReplaySource::load(source_id, replay.clone())?;
            Ok(Box::new(source))
        }
    }
}
