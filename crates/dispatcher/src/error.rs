//! Dispatcher error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink could not be built from its configuration
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Queue full, snapshot dropped
    #[error("queue full for sink '{sink_name}', output {sequence} dropped")]
    QueueFull { sink_name: String, sequence: u64 },

    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
