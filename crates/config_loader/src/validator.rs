//! Profile validation
//!
//! Rules:
//! - windows and capacities are positive
//! - smoothing factors lie in their open/closed unit intervals
//! - classification bounds ascend and only the final band is unbounded
//! - sink names are unique and non-empty, network sinks carry an address
//! - source rates are positive

use std::collections::HashSet;

use contracts::{
    CadenceStrategy, ContractError, MotionProfile, PipelineConfig, SinkType, SourceConfig,
};

/// Validate a MotionProfile
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(profile: &MotionProfile) -> Result<(), ContractError> {
    validate_pipeline(&profile.pipeline)?;
    validate_source(&profile.source)?;
    validate_sinks(profile)?;
    Ok(())
}

/// Validate pipeline tuning on its own (used by callers that build configs in code)
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), ContractError> {
    validate_windows(config)?;
    validate_detector(config)?;
    validate_cadence(config)?;
    validate_activity(config)?;
    validate_bands(config)?;
    Ok(())
}

fn validate_windows(config: &PipelineConfig) -> Result<(), ContractError> {
    if config.ingest.window_ms == 0 {
        return Err(ContractError::config_validation(
            "pipeline.ingest.window_ms",
            "window_ms must be > 0",
        ));
    }
    if config.cadence.history_window_ms == 0 {
        return Err(ContractError::config_validation(
            "pipeline.cadence.history_window_ms",
            "history_window_ms must be > 0",
        ));
    }
    if config.trace.capacity == 0 {
        return Err(ContractError::config_validation(
            "pipeline.trace.capacity",
            "trace capacity must be > 0",
        ));
    }
    Ok(())
}

fn validate_detector(config: &PipelineConfig) -> Result<(), ContractError> {
    let threshold = config.detector.peak_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ContractError::config_validation(
            "pipeline.detector.peak_threshold",
            format!("peak_threshold must be finite and >= 0, got {threshold}"),
        ));
    }
    Ok(())
}

fn validate_cadence(config: &PipelineConfig) -> Result<(), ContractError> {
    let cadence = &config.cadence;

    if !(cadence.smoothing_alpha > 0.0 && cadence.smoothing_alpha <= 1.0) {
        return Err(ContractError::config_validation(
            "pipeline.cadence.smoothing_alpha",
            format!(
                "smoothing_alpha must be in (0, 1], got {}",
                cadence.smoothing_alpha
            ),
        ));
    }

    if !(cadence.decay_factor > 0.0 && cadence.decay_factor < 1.0) {
        return Err(ContractError::config_validation(
            "pipeline.cadence.decay_factor",
            format!(
                "decay_factor must be in (0, 1), got {}",
                cadence.decay_factor
            ),
        ));
    }

    if !cadence.snap_floor.is_finite() || cadence.snap_floor < 0.0 {
        return Err(ContractError::config_validation(
            "pipeline.cadence.snap_floor",
            format!(
                "snap_floor must be finite and >= 0, got {}",
                cadence.snap_floor
            ),
        ));
    }

    if let CadenceStrategy::Interval { max_events } = cadence.strategy {
        if max_events < 2 {
            return Err(ContractError::config_validation(
                "pipeline.cadence.strategy.max_events",
                format!("interval cadence needs max_events >= 2, got {max_events}"),
            ));
        }
    }

    Ok(())
}

fn validate_activity(config: &PipelineConfig) -> Result<(), ContractError> {
    let activity = &config.activity;

    if activity.min_samples == 0 {
        return Err(ContractError::config_validation(
            "pipeline.activity.min_samples",
            "min_samples must be >= 1",
        ));
    }
    if !activity.noise_floor.is_finite() || activity.noise_floor < 0.0 {
        return Err(ContractError::config_validation(
            "pipeline.activity.noise_floor",
            format!("noise_floor must be >= 0, got {}", activity.noise_floor),
        ));
    }
    if !activity.max_expected.is_finite() || activity.max_expected <= 0.0 {
        return Err(ContractError::config_validation(
            "pipeline.activity.max_expected",
            format!("max_expected must be > 0, got {}", activity.max_expected),
        ));
    }
    if !(activity.follow_rate > 0.0 && activity.follow_rate <= 1.0) {
        return Err(ContractError::config_validation(
            "pipeline.activity.follow_rate",
            format!("follow_rate must be in (0, 1], got {}", activity.follow_rate),
        ));
    }
    Ok(())
}

fn validate_bands(config: &PipelineConfig) -> Result<(), ContractError> {
    let bands = config.classifier.bands.bands();

    if bands.is_empty() {
        return Err(ContractError::config_validation(
            "pipeline.classifier.bands",
            "at least one band is required",
        ));
    }

    let last = bands.len() - 1;
    let mut previous: Option<f64> = None;
    for (idx, band) in bands.iter().enumerate() {
        if band.label.label().trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("pipeline.classifier.bands[{idx}].label"),
                "band label cannot be empty",
            ));
        }

        match band.upper {
            None if idx != last => {
                return Err(ContractError::config_validation(
                    format!("pipeline.classifier.bands[{idx}].upper"),
                    "only the final band may be unbounded",
                ));
            }
            None => {}
            Some(bound) => {
                if !bound.is_finite() {
                    return Err(ContractError::config_validation(
                        format!("pipeline.classifier.bands[{idx}].upper"),
                        format!("bound must be finite, got {bound}"),
                    ));
                }
                if let Some(prev) = previous {
                    if bound <= prev {
                        return Err(ContractError::config_validation(
                            format!("pipeline.classifier.bands[{idx}].upper"),
                            format!("bounds must ascend strictly ({bound} after {prev})"),
                        ));
                    }
                }
                previous = Some(bound);
            }
        }
    }

    Ok(())
}

fn validate_source(source: &SourceConfig) -> Result<(), ContractError> {
    match source {
        SourceConfig::Synthetic(gait) => {
            if !(gait.sample_rate_hz.is_finite() && gait.sample_rate_hz > 0.0) {
                return Err(ContractError::config_validation(
                    "source.sample_rate_hz",
                    format!("sample_rate_hz must be > 0, got {}", gait.sample_rate_hz),
                ));
            }
            if !(gait.step_rate_hz.is_finite() && gait.step_rate_hz > 0.0) {
                return Err(ContractError::config_validation(
                    "source.step_rate_hz",
                    format!("step_rate_hz must be > 0, got {}", gait.step_rate_hz),
                ));
            }
            if !gait.noise.is_finite() || gait.noise < 0.0 {
                return Err(ContractError::config_validation(
                    "source.noise",
                    format!("noise must be >= 0, got {}", gait.noise),
                ));
            }
            if let Some(duration) = gait.duration_s {
                if !(duration.is_finite() && duration > 0.0) {
                    return Err(ContractError::config_validation(
                        "source.duration_s",
                        format!("duration_s must be > 0, got {duration}"),
                    ));
                }
            }
        }
        SourceConfig::Replay(replay) => {
            if replay.path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    "source.path",
                    "replay path cannot be empty",
                ));
            }
            if !replay.speed_multiplier.is_finite() || replay.speed_multiplier < 0.0 {
                return Err(ContractError::config_validation(
                    "source.speed_multiplier",
                    format!(
                        "speed_multiplier must be >= 0, got {}",
                        replay.speed_multiplier
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Validate sink configuration
fn validate_sinks(profile: &MotionProfile) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in profile.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::Network && !sink.params.contains_key("addr") {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.addr", sink.name),
                "network sink requires an 'addr' parameter",
            ));
        }
    }
    Ok(())
}
