//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{IntensityMode, MotionProfile, SourceConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ProfileSummary>,
}

#[derive(Serialize)]
struct ProfileSummary {
    version: String,
    source: String,
    intensity: String,
    band_count: usize,
    hysteresis: bool,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "validating profile");

    let result = validate_profile(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Profile validation failed")
    }
}

fn validate_profile(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(profile) => {
            let warnings = collect_warnings(&profile);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ProfileSummary {
                    version: format!("{:?}", profile.version),
                    source: match &profile.source {
                        SourceConfig::Synthetic(_) => "synthetic".to_string(),
                        SourceConfig::Replay(r) => format!("replay ({})", r.path.display()),
                    },
                    intensity: format!("{:?}", profile.pipeline.intensity),
                    band_count: profile.pipeline.classifier.bands.bands().len(),
                    hysteresis: profile.pipeline.classifier.hysteresis.is_some(),
                    sink_count: profile.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect non-fatal profile issues
fn collect_warnings(profile: &MotionProfile) -> Vec<String> {
    let mut warnings = Vec::new();
    let pipeline = &profile.pipeline;

    if profile.sinks.is_empty() {
        warnings.push("No sinks configured - outputs only reach the run summary".to_string());
    }

    if let Some(hysteresis) = &pipeline.classifier.hysteresis {
        if pipeline.intensity == IntensityMode::Cadence {
            let refractory = pipeline.detector.refractory_ms.max(1);
            let max_steps = pipeline.cadence.history_window_ms / refractory + 1;
            if hysteresis.min_evidence as u64 > max_steps {
                warnings.push(format!(
                    "hysteresis.min_evidence = {} but at most {} steps fit the history window; \
                     only the rest state can ever commit",
                    hysteresis.min_evidence, max_steps
                ));
            }
        }
    }

    if pipeline.intensity == IntensityMode::Activity {
        let unreachable: Vec<String> = pipeline
            .classifier
            .bands
            .bands()
            .windows(2)
            .filter(|pair| pair[0].upper.is_some_and(|upper| upper > 1.0))
            .map(|pair| pair[1].label.to_string())
            .collect();
        if !unreachable.is_empty() {
            warnings.push(format!(
                "activity values never exceed 1.0; unreachable bands: {}",
                unreachable.join(", ")
            ));
        }
    }

    if let SourceConfig::Synthetic(gait) = &profile.source {
        if gait.duration_s.is_none() && !gait.realtime {
            warnings.push(
                "synthetic source is unbounded and not paced - run with --max-outputs or --timeout"
                    .to_string(),
            );
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Profile is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Source: {}", summary.source);
            println!("  Intensity: {}", summary.intensity);
            println!(
                "  Bands: {}{}",
                summary.band_count,
                if summary.hysteresis { " (hysteresis)" } else { "" }
            );
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Profile is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
