//! Pipeline metrics
//!
//! Exported through the `metrics` facade and aggregated in memory for the
//! end-of-run summary.

use std::collections::BTreeMap;

use contracts::{PipelineOutput, PipelineStats};
use metrics::{counter, gauge, histogram};

/// Record one pipeline snapshot.
///
/// # Example
///
/// ```ignore
/// if let Some(output) = pipeline.process_sample(&reading) {
///     observability::record_pipeline_output(&output);
/// }
/// ```
pub fn record_pipeline_output(output: &PipelineOutput) {
    gauge!("stride_last_sequence").set(output.sequence as f64);
    histogram!("stride_magnitude").record(output.magnitude);

    gauge!("stride_cadence_spm").set(f64::from(output.cadence.rounded));
    histogram!("stride_cadence_spm_hist").record(output.cadence.smoothed);

    gauge!("stride_activity_level").set(output.activity.level);
    gauge!("stride_activity_raw_std_dev").set(output.activity.raw_std_dev);

    gauge!("stride_step_history_len").set(output.cadence.history_len as f64);
    gauge!("stride_sample_window_len").set(output.activity.window_len as f64);

    if let Some(transition) = &output.transition {
        counter!(
            "stride_state_entered_total",
            "state" => transition.to.label().to_string()
        )
        .increment(1);
    }
}

/// Publish the pipeline's own counters as gauges
pub fn record_pipeline_stats(stats: &PipelineStats) {
    gauge!("stride_pipeline_samples_accepted").set(stats.samples_accepted as f64);
    gauge!("stride_pipeline_malformed_dropped").set(stats.malformed_dropped as f64);
    gauge!("stride_pipeline_out_of_order_dropped").set(stats.out_of_order_dropped as f64);
    gauge!("stride_pipeline_steps").set(stats.steps_detected as f64);
    gauge!("stride_pipeline_transitions").set(stats.transitions as f64);
}

/// Record final sink counters
pub fn record_sink_totals(sink_name: &str, written: u64, failed: u64, dropped: u64) {
    let sink = sink_name.to_string();
    counter!("stride_sink_outputs_total", "sink" => sink.clone(), "status" => "written")
        .increment(written);
    counter!("stride_sink_outputs_total", "sink" => sink.clone(), "status" => "failed")
        .increment(failed);
    counter!("stride_sink_outputs_total", "sink" => sink, "status" => "dropped")
        .increment(dropped);
}

/// In-memory aggregation of a run's snapshots
#[derive(Debug, Clone, Default)]
pub struct RunMetricsAggregator {
    pub total_outputs: u64,
    pub total_steps: u64,
    pub total_transitions: u64,

    pub magnitude_stats: RunningStats,
    pub cadence_stats: RunningStats,
    pub activity_stats: RunningStats,

    /// Time attributed to each committed state (ms)
    pub state_dwell_ms: BTreeMap<String, i64>,

    first_timestamp: Option<i64>,
    last: Option<(i64, String)>,
}

impl RunMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, output: &PipelineOutput) {
        self.total_outputs += 1;
        if output.step_fired {
            self.total_steps += 1;
        }
        if output.transition.is_some() {
            self.total_transitions += 1;
        }

        self.magnitude_stats.push(output.magnitude);
        self.cadence_stats.push(f64::from(output.cadence.rounded));
        self.activity_stats.push(output.activity.level);

        // the gap since the previous snapshot belongs to the state held during it
        if let Some((last_ts, last_state)) = self.last.take() {
            let gap = output.timestamp_ms.saturating_sub(last_ts).max(0);
            *self.state_dwell_ms.entry(last_state).or_insert(0) += gap;
        }
        self.first_timestamp.get_or_insert(output.timestamp_ms);
        self.last = Some((output.timestamp_ms, output.state.label().to_string()));
    }

    pub fn summary(&self) -> RunSummary {
        let duration_ms = match (self.first_timestamp, &self.last) {
            (Some(first), Some((last, _))) => last.saturating_sub(first),
            _ => 0,
        };

        RunSummary {
            total_outputs: self.total_outputs,
            total_steps: self.total_steps,
            total_transitions: self.total_transitions,
            duration_ms,
            final_state: self.last.as_ref().map(|(_, state)| state.clone()),
            magnitude: StatsSummary::from(&self.magnitude_stats),
            cadence_spm: StatsSummary::from(&self.cadence_stats),
            activity_level: StatsSummary::from(&self.activity_stats),
            state_dwell_ms: self.state_dwell_ms.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// End-of-run report
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_outputs: u64,
    pub total_steps: u64,
    pub total_transitions: u64,
    /// Device-time span covered by the outputs
    pub duration_ms: i64,
    pub final_state: Option<String>,
    pub magnitude: StatsSummary,
    pub cadence_spm: StatsSummary,
    pub activity_level: StatsSummary,
    pub state_dwell_ms: BTreeMap<String, i64>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stride Run Summary ===")?;
        writeln!(f, "Outputs: {}", self.total_outputs)?;
        writeln!(f, "Duration: {:.1} s", self.duration_ms as f64 / 1000.0)?;
        writeln!(f, "Steps: {}", self.total_steps)?;
        writeln!(f, "Transitions: {}", self.total_transitions)?;
        writeln!(
            f,
            "Final state: {}",
            self.final_state.as_deref().unwrap_or("N/A")
        )?;
        writeln!(f, "Magnitude: {}", self.magnitude)?;
        writeln!(f, "Cadence (spm): {}", self.cadence_spm)?;
        writeln!(f, "Activity level: {}", self.activity_level)?;

        if !self.state_dwell_ms.is_empty() {
            writeln!(f, "Time per state:")?;
            for (state, ms) in &self.state_dwell_ms {
                let share = if self.duration_ms > 0 {
                    *ms as f64 / self.duration_ms as f64 * 100.0
                } else {
                    0.0
                };
                writeln!(f, "  {}: {:.1} s ({:.1}%)", state, *ms as f64 / 1000.0, share)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean and variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ActivityReading, CadenceReading, MovementState, StateTransition};

    fn output(ts: i64, state: &str, rounded: u32, step: bool) -> PipelineOutput {
        PipelineOutput {
            sequence: 0,
            timestamp_ms: ts,
            magnitude: 1.0,
            peak_threshold: 1.2,
            step_fired: step,
            cadence: CadenceReading {
                rounded,
                ..CadenceReading::default()
            },
            activity: ActivityReading::default(),
            candidate: MovementState::from(state),
            state: MovementState::from(state),
            transition: None,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_dwell_time() {
        let mut aggregator = RunMetricsAggregator::new();
        aggregator.update(&output(0, "Still", 0, false));
        aggregator.update(&output(1000, "Still", 0, true));

        let mut walk = output(1500, "Walk", 60, true);
        walk.transition = Some(StateTransition {
            from: MovementState::from("Still"),
            to: MovementState::from("Walk"),
            at_ms: 1500,
        });
        aggregator.update(&walk);
        aggregator.update(&output(4000, "Walk", 72, false));

        let summary = aggregator.summary();
        assert_eq!(summary.total_outputs, 4);
        assert_eq!(summary.total_steps, 2);
        assert_eq!(summary.total_transitions, 1);
        assert_eq!(summary.duration_ms, 4000);
        assert_eq!(summary.final_state.as_deref(), Some("Walk"));
        assert_eq!(summary.state_dwell_ms.get("Still"), Some(&1500));
        assert_eq!(summary.state_dwell_ms.get("Walk"), Some(&2500));
        assert_eq!(summary.cadence_spm.max, 72.0);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = RunMetricsAggregator::new();
        aggregator.update(&output(0, "Still", 0, false));
        aggregator.update(&output(2000, "Still", 0, false));

        let text = aggregator.summary().to_string();
        assert!(text.contains("Outputs: 2"));
        assert!(text.contains("Final state: Still"));
        assert!(text.contains("Still: 2.0 s (100.0%)"));

        assert!(RunSummary::default().to_string().contains("Final state: N/A"));
    }
}
