//! OutputSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for consumers of pipeline outputs.

use crate::{ContractError, PipelineOutput};

/// Output consumer trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(OutputSink: Send)]
pub trait LocalOutputSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one pipeline output snapshot
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, output: &PipelineOutput) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
