//! Profile parsing
//!
//! TOML is the primary format; JSON is accepted as well.

use contracts::{ContractError, MotionProfile};

/// Profile file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (preferred)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML profile
pub fn parse_toml(content: &str) -> Result<MotionProfile, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON profile
pub fn parse_json(content: &str) -> Result<MotionProfile, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to `format`
pub fn parse(content: &str, format: ConfigFormat) -> Result<MotionProfile, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CadenceStrategy, IntensityMode, SinkType, SourceConfig};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[pipeline.detector]
peak_threshold = 1.5

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let profile = result.unwrap();
        assert_eq!(profile.pipeline.detector.peak_threshold, 1.5);
        assert_eq!(profile.pipeline.detector.refractory_ms, 300);
        assert_eq!(profile.sinks.len(), 1);
        assert_eq!(profile.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "pipeline": {
                "intensity": "activity",
                "cadence": { "strategy": { "kind": "interval" } }
            },
            "source": { "kind": "replay", "path": "walk.jsonl", "speed_multiplier": 2.0 },
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let profile = result.unwrap();
        assert_eq!(profile.pipeline.intensity, IntensityMode::Activity);
        assert_eq!(
            profile.pipeline.cadence.strategy,
            CadenceStrategy::Interval { max_events: 5 }
        );
        assert!(matches!(profile.source, SourceConfig::Replay(_)));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_sink_type_is_parse_error() {
        let content = r#"
[[sinks]]
name = "x"
sink_type = "carrier_pigeon"
"#;
        assert!(matches!(
            parse_toml(content),
            Err(ContractError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
