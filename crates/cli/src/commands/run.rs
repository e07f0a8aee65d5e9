//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{EmitPolicy, MotionProfile, ReplayConfig, SourceConfig};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{RunConfig, Runner};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut profile = load_profile(args)?;
    apply_overrides(&mut profile, args);

    config_loader::ConfigLoader::validate(&profile)
        .map_err(|e| CliError::config_validation(e.to_string()))?;

    info!(
        source = source_label(&profile.source),
        sinks = profile.sinks.len(),
        emit = ?profile.emit,
        "profile ready"
    );

    if args.dry_run {
        info!("dry run - profile is valid, exiting");
        print_profile_summary(&profile);
        return Ok(());
    }

    let run_config = RunConfig {
        profile,
        max_outputs: (args.max_outputs > 0).then_some(args.max_outputs),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        buffer_size: args.buffer_size,
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    let stats = Runner::new(run_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        reason = %stats.stop_reason,
        samples_per_sec = format!("{:.1}", stats.samples_per_sec()),
        "stride finished"
    );
    stats.print_summary();

    Ok(())
}

fn load_profile(args: &RunArgs) -> Result<MotionProfile> {
    let Some(path) = &args.config else {
        info!("no profile given, using built-in defaults");
        return Ok(MotionProfile::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    info!(config = %path.display(), "loading profile");
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load profile from {}", path.display()))
}

/// Apply command-line overrides on top of the loaded profile
pub(crate) fn apply_overrides(profile: &mut MotionProfile, args: &RunArgs) {
    if let Some(path) = &args.replay {
        info!(path = %path.display(), "replaying recording from CLI");
        let mut replay = match &profile.source {
            SourceConfig::Replay(existing) => existing.clone(),
            SourceConfig::Synthetic(_) => ReplayConfig {
                path: path.clone(),
                speed_multiplier: 1.0,
                loop_playback: false,
            },
        };
        replay.path = path.clone();
        if let Some(speed) = args.speed {
            replay.speed_multiplier = speed;
        }
        if args.loop_playback {
            replay.loop_playback = true;
        }
        profile.source = SourceConfig::Replay(replay);
    }

    if args.step_rate.is_some() || args.duration.is_some() {
        match &mut profile.source {
            SourceConfig::Synthetic(gait) => {
                if let Some(rate) = args.step_rate {
                    gait.step_rate_hz = rate;
                }
                if let Some(duration) = args.duration {
                    gait.duration_s = (duration > 0.0).then_some(duration);
                }
            }
            SourceConfig::Replay(_) => {
                warn!("--step-rate/--duration ignored for a replay source");
            }
        }
    }

    if args.transitions_only {
        profile.emit = EmitPolicy::TransitionsOnly;
    }
}

fn source_label(source: &SourceConfig) -> &'static str {
    match source {
        SourceConfig::Synthetic(_) => "synthetic",
        SourceConfig::Replay(_) => "replay",
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_profile_summary(profile: &MotionProfile) {
    println!("\n=== Profile Summary ===\n");
    match &profile.source {
        SourceConfig::Synthetic(gait) => println!(
            "Source: synthetic ({} Hz samples, {} steps/s, {})",
            gait.sample_rate_hz,
            gait.step_rate_hz,
            gait.duration_s
                .map(|d| format!("{d} s"))
                .unwrap_or_else(|| "unbounded".to_string())
        ),
        SourceConfig::Replay(replay) => println!(
            "Source: replay {} (x{}{})",
            replay.path.display(),
            replay.speed_multiplier,
            if replay.loop_playback { ", looping" } else { "" }
        ),
    }

    let pipeline = &profile.pipeline;
    println!("Intensity: {:?}", pipeline.intensity);
    println!("Cadence strategy: {:?}", pipeline.cadence.strategy);
    println!(
        "Hysteresis: {}",
        pipeline
            .classifier
            .hysteresis
            .as_ref()
            .map(|h| format!("{} ms, evidence >= {}", h.stability_window_ms, h.min_evidence))
            .unwrap_or_else(|| "off".to_string())
    );
    println!("Emit: {:?}", profile.emit);

    if !profile.sinks.is_empty() {
        println!("\nSinks ({}):", profile.sinks.len());
        for sink in &profile.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }
    println!();
}
