//! Run orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{RunConfig, Runner, SOURCE_ID};
pub use stats::{RunStats, StopReason};
