//! # Ingestion
//!
//! Motion sample acquisition.
//!
//! Responsibilities:
//! - Provide motion sources (JSONL replay, synthetic gait)
//! - Bridge callback-style sources onto a bounded async channel
//! - Backpressure (drop newest) and ingestion metrics
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{build_source, IngestionPipeline};
//!
//! let mut pipeline = IngestionPipeline::new(256);
//! pipeline.register_source(build_source("walk", &profile.source)?);
//! let rx = pipeline.take_receiver().unwrap();
//! pipeline.start_all();
//! while let Ok(reading) = rx.recv().await {
//!     // feed the motion pipeline
//! }
//! ```

mod adapter;
mod config;
mod error;
mod factory;
mod pipeline;
mod replay;
mod synthetic;

// Re-exports
pub use adapter::{send_reading, SourceAdapter};
pub use config::{BackpressureConfig, IngestionMetrics, MetricsSnapshot};
pub use contracts::RawMotion;
pub use error::{IngestionError, Result};
pub use factory::build_source;
pub use pipeline::IngestionPipeline;
pub use replay::{read_recording, ReplaySource};
pub use synthetic::{GaitSignal, SyntheticGaitSource};
