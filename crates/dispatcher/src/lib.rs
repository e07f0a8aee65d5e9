//! # Dispatcher
//!
//! Output fan-out for pipeline snapshots.
//!
//! - Consumes `PipelineOutput` from the pipeline task
//! - Applies the emit policy, then fans out to every sink
//! - Each sink runs behind its own bounded queue, so a slow sink
//!   never stalls the pipeline

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{EmitPolicy, OutputSink, PipelineOutput};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink, NetworkFormat, NetworkSink};

#[cfg(test)]
pub(crate) mod fixtures {
    use contracts::{
        ActivityReading, CadenceReading, MovementState, PipelineOutput, StateTransition,
    };

    pub fn output(sequence: u64) -> PipelineOutput {
        PipelineOutput {
            sequence,
            timestamp_ms: sequence as i64 * 20,
            magnitude: 1.0,
            peak_threshold: 1.2,
            step_fired: false,
            cadence: CadenceReading::default(),
            activity: ActivityReading::default(),
            candidate: MovementState::from("Still"),
            state: MovementState::from("Still"),
            transition: None,
        }
    }

    pub fn transition(sequence: u64) -> PipelineOutput {
        let mut out = output(sequence);
        out.candidate = MovementState::from("Walk");
        out.state = MovementState::from("Walk");
        out.transition = Some(StateTransition {
            from: MovementState::from("Still"),
            to: MovementState::from("Walk"),
            at_ms: out.timestamp_ms,
        });
        out
    }
}
