//! # Config Loader
//!
//! Profile loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON profiles
//! - Validate tuning and routing
//! - Produce a `MotionProfile`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let profile = ConfigLoader::load_from_path(Path::new("stride.toml")).unwrap();
//! println!("threshold: {}", profile.pipeline.detector.peak_threshold);
//! ```

mod parser;
mod validator;

pub use contracts::MotionProfile;
pub use parser::ConfigFormat;

use contracts::{ContractError, PipelineConfig};
use std::path::Path;

/// Profile loader
///
/// Provides static methods to load profiles from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a profile from a file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<MotionProfile, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a profile from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MotionProfile, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate a profile assembled in code or modified after loading
    pub fn validate(profile: &MotionProfile) -> Result<(), ContractError> {
        validator::validate(profile)
    }

    /// Validate pipeline tuning alone
    pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), ContractError> {
        validator::validate_pipeline(config)
    }

    /// Serialize a profile to a TOML string
    pub fn to_toml(profile: &MotionProfile) -> Result<String, ContractError> {
        toml::to_string_pretty(profile)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a profile to a JSON string
    pub fn to_json(profile: &MotionProfile) -> Result<String, ContractError> {
        serde_json::to_string_pretty(profile)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer profile format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read profile content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate profile content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<MotionProfile, ContractError> {
        let profile = parser::parse(content, format)?;
        validator::validate(&profile)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{HysteresisConfig, IntensityMode};

    const SIX_STATE_TOML: &str = r#"
emit = "transitions_only"

[pipeline]
intensity = "cadence"

[pipeline.cadence]
strategy = { kind = "interval", max_events = 5 }

[[pipeline.classifier.bands]]
upper = 20.0
label = "Still"

[[pipeline.classifier.bands]]
upper = 45.0
label = "Transition"

[[pipeline.classifier.bands]]
upper = 80.0
label = "Walk"

[[pipeline.classifier.bands]]
upper = 115.0
label = "Transition"

[[pipeline.classifier.bands]]
upper = 140.0
inclusive = true
label = "FastWalk"

[[pipeline.classifier.bands]]
label = "Run"

[pipeline.classifier.hysteresis]
stability_window_ms = 1500
min_evidence = 3

[source]
kind = "synthetic"
step_rate_hz = 2.0
duration_s = 10.0

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(SIX_STATE_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let profile = result.unwrap();
        assert_eq!(profile.pipeline.classifier.bands.bands().len(), 6);
        assert_eq!(
            profile.pipeline.classifier.hysteresis,
            Some(HysteresisConfig {
                stability_window_ms: 1500,
                min_evidence: 3,
            })
        );
        assert_eq!(profile.pipeline.intensity, IntensityMode::Cadence);
    }

    #[test]
    fn test_round_trip_toml() {
        let profile = ConfigLoader::load_from_str(SIX_STATE_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&profile).unwrap();
        let profile2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(profile.pipeline, profile2.pipeline);
        assert_eq!(profile.source, profile2.source);
        assert_eq!(profile.emit, profile2.emit);
        assert_eq!(profile.sinks.len(), profile2.sinks.len());
    }

    #[test]
    fn test_round_trip_json() {
        let profile = ConfigLoader::load_from_str(SIX_STATE_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&profile).unwrap();
        let profile2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(profile.pipeline, profile2.pipeline);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[pipeline.cadence]
smoothing_alpha = 1.5
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("smoothing_alpha"));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("profile.toml");
        std::fs::write(&toml_path, SIX_STATE_TOML).unwrap();
        assert!(ConfigLoader::load_from_path(&toml_path).is_ok());

        let yaml_path = dir.path().join("profile.yaml");
        std::fs::write(&yaml_path, "pipeline: {}").unwrap();
        let err = ConfigLoader::load_from_path(&yaml_path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
