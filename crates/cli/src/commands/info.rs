//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{CadenceStrategy, MotionProfile, SourceConfig, StateBand};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Profile info for JSON output
#[derive(Serialize)]
struct ProfileInfo {
    version: String,
    source: SourceInfo,
    intensity: String,
    cadence: CadenceInfo,
    detector: DetectorInfo,
    bands: Vec<BandInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hysteresis: Option<HysteresisInfo>,
    emit: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SourceInfo {
    Synthetic {
        sample_rate_hz: f64,
        step_rate_hz: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_s: Option<f64>,
        realtime: bool,
    },
    Replay {
        path: String,
        speed_multiplier: f64,
        loop_playback: bool,
    },
}

#[derive(Serialize)]
struct CadenceInfo {
    strategy: String,
    history_window_ms: u64,
    smoothing_alpha: f64,
    decay_factor: f64,
}

#[derive(Serialize)]
struct DetectorInfo {
    peak_threshold: f64,
    refractory_ms: u64,
    window_ms: u64,
}

#[derive(Serialize)]
struct BandInfo {
    label: String,
    range: String,
}

#[derive(Serialize)]
struct HysteresisInfo {
    stability_window_ms: u64,
    min_evidence: usize,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "loading profile info");

    if !args.config.exists() {
        anyhow::bail!("Profile not found: {}", args.config.display());
    }

    let profile = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load profile from {}", args.config.display()))?;
    let info = build_profile_info(&profile, args.sinks);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize profile info")?;
        println!("{}", json);
    } else {
        print_profile_info(&info);
    }

    Ok(())
}

fn build_profile_info(profile: &MotionProfile, with_sinks: bool) -> ProfileInfo {
    let pipeline = &profile.pipeline;

    let source = match &profile.source {
        SourceConfig::Synthetic(gait) => SourceInfo::Synthetic {
            sample_rate_hz: gait.sample_rate_hz,
            step_rate_hz: gait.step_rate_hz,
            duration_s: gait.duration_s,
            realtime: gait.realtime,
        },
        SourceConfig::Replay(replay) => SourceInfo::Replay {
            path: replay.path.display().to_string(),
            speed_multiplier: replay.speed_multiplier,
            loop_playback: replay.loop_playback,
        },
    };

    let strategy = match pipeline.cadence.strategy {
        CadenceStrategy::Count => "count".to_string(),
        CadenceStrategy::Interval { max_events } => format!("interval (last {max_events})"),
    };

    let mut lower: Option<(f64, bool)> = None;
    let bands = pipeline
        .classifier
        .bands
        .bands()
        .iter()
        .map(|band| {
            let info = BandInfo {
                label: band.label.to_string(),
                range: describe_range(lower, band),
            };
            lower = band.upper.map(|upper| (upper, band.inclusive));
            info
        })
        .collect();

    let sinks = if with_sinks {
        profile
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ProfileInfo {
        version: format!("{:?}", profile.version),
        source,
        intensity: format!("{:?}", pipeline.intensity),
        cadence: CadenceInfo {
            strategy,
            history_window_ms: pipeline.cadence.history_window_ms,
            smoothing_alpha: pipeline.cadence.smoothing_alpha,
            decay_factor: pipeline.cadence.decay_factor,
        },
        detector: DetectorInfo {
            peak_threshold: pipeline.detector.peak_threshold,
            refractory_ms: pipeline.detector.refractory_ms,
            window_ms: pipeline.ingest.window_ms,
        },
        bands,
        hysteresis: pipeline
            .classifier
            .hysteresis
            .as_ref()
            .map(|h| HysteresisInfo {
                stability_window_ms: h.stability_window_ms,
                min_evidence: h.min_evidence,
            }),
        emit: format!("{:?}", profile.emit),
        sinks,
    }
}

/// Human-readable interval for a band given the previous band's bound
fn describe_range(lower: Option<(f64, bool)>, band: &StateBand) -> String {
    let low = match lower {
        None => "(-inf".to_string(),
        Some((bound, true)) => format!("({bound}"),
        Some((bound, false)) => format!("[{bound}"),
    };
    let high = match band.upper {
        None => "+inf)".to_string(),
        Some(bound) if band.inclusive => format!("{bound}]"),
        Some(bound) => format!("{bound})"),
    };
    format!("{low}, {high}")
}

fn print_profile_info(info: &ProfileInfo) {
    println!("=== Stride Profile ===\n");
    println!("Version: {}", info.version);

    match &info.source {
        SourceInfo::Synthetic {
            sample_rate_hz,
            step_rate_hz,
            duration_s,
            realtime,
        } => {
            println!("Source: synthetic");
            println!("   ├─ Sample rate: {sample_rate_hz} Hz");
            println!("   ├─ Step rate: {step_rate_hz} steps/s");
            match duration_s {
                Some(d) => println!("   ├─ Duration: {d} s"),
                None => println!("   ├─ Duration: unbounded"),
            }
            println!("   └─ Realtime: {realtime}");
        }
        SourceInfo::Replay {
            path,
            speed_multiplier,
            loop_playback,
        } => {
            println!("Source: replay");
            println!("   ├─ Path: {path}");
            println!("   ├─ Speed: x{speed_multiplier}");
            println!("   └─ Loop: {loop_playback}");
        }
    }

    println!("\nDetector");
    println!("   ├─ Peak threshold: {}", info.detector.peak_threshold);
    println!("   ├─ Refractory: {} ms", info.detector.refractory_ms);
    println!("   └─ Sample window: {} ms", info.detector.window_ms);

    println!("\nCadence");
    println!("   ├─ Strategy: {}", info.cadence.strategy);
    println!("   ├─ History window: {} ms", info.cadence.history_window_ms);
    println!(
        "   └─ Smoothing: alpha {}, decay {}",
        info.cadence.smoothing_alpha, info.cadence.decay_factor
    );

    println!("\nClassifier ({} input)", info.intensity);
    for (i, band) in info.bands.iter().enumerate() {
        let branch = if i + 1 == info.bands.len() { "└─" } else { "├─" };
        println!("   {branch} {:<12} {}", band.label, band.range);
    }
    match &info.hysteresis {
        Some(h) => println!(
            "   Hysteresis: {} ms, evidence >= {}",
            h.stability_window_ms, h.min_evidence
        ),
        None => println!("   Hysteresis: off"),
    }

    println!("\nEmit: {}", info.emit);

    if !info.sinks.is_empty() {
        println!("\nSinks ({})", info.sinks.len());
        for sink in &info.sinks {
            println!(
                "   - {} ({}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }
}
