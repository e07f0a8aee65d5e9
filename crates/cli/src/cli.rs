//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stride - motion sensor signal-to-state pipeline
#[derive(Parser, Debug)]
#[command(
    name = "stride",
    author,
    version,
    about = "Motion sensor signal-to-state pipeline",
    long_about = "Turns a raw accelerometer stream into cadence, activity level and a \n\
                  debounced movement state.\n\n\
                  Samples come from a JSONL recording or a synthetic gait; every \n\
                  pipeline snapshot can be fanned out to log, file and UDP sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STRIDE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STRIDE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed a recording or a synthetic walk through the pipeline
    Run(RunArgs),

    /// Validate a profile without running
    Validate(ValidateArgs),

    /// Display profile information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Profile file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "STRIDE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Replay this JSONL recording instead of the profile's source
    #[arg(long, env = "STRIDE_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (0 = as fast as possible)
    #[arg(long, requires = "replay")]
    pub speed: Option<f64>,

    /// Loop the replay until interrupted
    #[arg(long = "loop", requires = "replay")]
    pub loop_playback: bool,

    /// Synthetic step rate override (steps per second)
    #[arg(long, conflicts_with = "replay")]
    pub step_rate: Option<f64>,

    /// Synthetic run length override in seconds (0 = until interrupted)
    #[arg(long, conflicts_with = "replay")]
    pub duration: Option<f64>,

    /// Forward only snapshots that commit a state change
    #[arg(long)]
    pub transitions_only: bool,

    /// Stop after this many pipeline outputs (0 = unlimited)
    #[arg(long, default_value = "0", env = "STRIDE_MAX_OUTPUTS")]
    pub max_outputs: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "STRIDE_TIMEOUT")]
    pub timeout: u64,

    /// Validate the profile and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Capacity of the internal sample and output queues
    #[arg(long, default_value = "1024", env = "STRIDE_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Prometheus exporter port (0 = disabled)
    #[arg(long, default_value = "0", env = "STRIDE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Profile file to validate
    #[arg(short, long, default_value = "stride.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Profile file
    #[arg(short, long, default_value = "stride.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replay_run() {
        let cli = Cli::parse_from([
            "stride",
            "-v",
            "run",
            "--replay",
            "walk.jsonl",
            "--speed",
            "0",
            "--transitions-only",
        ]);
        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.replay, Some(PathBuf::from("walk.jsonl")));
        assert_eq!(args.speed, Some(0.0));
        assert!(args.transitions_only);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_speed_requires_replay() {
        assert!(Cli::try_parse_from(["stride", "run", "--speed", "2"]).is_err());
        assert!(Cli::try_parse_from(["stride", "run", "--replay", "a", "--step-rate", "2"]).is_err());
    }
}
