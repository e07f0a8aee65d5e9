//! LogSink - one tracing event per snapshot

use contracts::{ContractError, OutputSink, PipelineOutput};
use tracing::{debug, info, instrument};

/// Sink that logs snapshots for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_output(&self, output: &PipelineOutput) {
        match &output.transition {
            Some(transition) => info!(
                sink = %self.name,
                sequence = output.sequence,
                from = %transition.from,
                to = %transition.to,
                at_ms = transition.at_ms,
                cadence = output.cadence.rounded,
                activity = output.activity.level,
                "state transition"
            ),
            None => debug!(
                sink = %self.name,
                sequence = output.sequence,
                timestamp_ms = output.timestamp_ms,
                magnitude = output.magnitude,
                step = output.step_fired,
                cadence = output.cadence.rounded,
                activity = output.activity.level,
                state = %output.state,
                "pipeline output"
            ),
        }
    }
}

impl OutputSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, output),
        fields(sink = %self.name, sequence = output.sequence)
    )]
    async fn write(&mut self, output: &PipelineOutput) -> Result<(), ContractError> {
        self.log_output(output);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "log sink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{output, transition};

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        assert!(sink.write(&output(1)).await.is_ok());
        assert!(sink.write(&transition(2)).await.is_ok());
        assert!(sink.close().await.is_ok());
    }

    #[test]
    fn test_log_sink_name() {
        assert_eq!(LogSink::new("my_logger").name(), "my_logger");
    }
}
