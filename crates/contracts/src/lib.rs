//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Device timestamps are integer milliseconds (`i64`) and are the only clock
//! - Samples are expected in chronological order; the pipeline drops regressions

mod error;
mod motion_source;
mod output;
mod pipeline_config;
mod profile;
mod sample;
mod sink;
mod state;

pub use error::*;
pub use motion_source::{MotionCallback, MotionSource};
pub use output::*;
pub use pipeline_config::*;
pub use profile::*;
pub use sample::*;
pub use sink::*;
pub use state::*;
