//! Run statistics.

use std::fmt;
use std::time::Duration;

use contracts::PipelineStats;
use observability::RunMetricsAggregator;

/// Why the run loop ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// Source finished and every queued sample was processed
    #[default]
    SourceExhausted,
    /// Sample channel closed
    SourceClosed,
    MaxOutputs,
    Timeout,
    Interrupted,
    DispatcherClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SourceExhausted => "source exhausted",
            Self::SourceClosed => "source channel closed",
            Self::MaxOutputs => "output limit reached",
            Self::Timeout => "timeout",
            Self::Interrupted => "interrupted",
            Self::DispatcherClosed => "dispatcher closed",
        };
        f.write_str(text)
    }
}

/// Statistics from one run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Wall-clock duration
    pub duration: Duration,
    pub stop_reason: StopReason,

    /// Readings delivered by the source
    pub readings_received: u64,
    /// Readings lost to a full ingestion queue
    pub readings_dropped: u64,

    /// Counters kept by the motion pipeline
    pub pipeline: PipelineStats,

    /// Aggregated pipeline snapshots
    pub outputs: RunMetricsAggregator,

    /// Final per-sink counters
    pub sinks: Vec<(String, dispatcher::MetricsSnapshot)>,
}

impl RunStats {
    /// Accepted samples per wall-clock second
    pub fn samples_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.pipeline.samples_accepted as f64 / secs
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Run ===");
        println!("   ├─ Stopped: {}", self.stop_reason);
        println!("   ├─ Wall time: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Readings received: {}", self.readings_received);
        println!("   ├─ Readings dropped (queue full): {}", self.readings_dropped);
        println!("   ├─ Samples accepted: {}", self.pipeline.samples_accepted);
        println!("   ├─ Malformed dropped: {}", self.pipeline.malformed_dropped);
        println!("   ├─ Out-of-order dropped: {}", self.pipeline.out_of_order_dropped);
        println!("   └─ Throughput: {:.1} samples/s", self.samples_per_sec());

        print!("\n{}", self.outputs.summary());

        if !self.sinks.is_empty() {
            println!("\n=== Sinks ===");
            for (i, (name, m)) in self.sinks.iter().enumerate() {
                let prefix = if i + 1 == self.sinks.len() { "└─" } else { "├─" };
                println!(
                    "   {} {}: written={}, failed={}, dropped={}",
                    prefix, name, m.write_count, m.failure_count, m.dropped_count
                );
            }
        }

        println!();
    }
}
