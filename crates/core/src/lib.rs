//! wordcloud-core
//!
//! Core library for rendering word clouds out of compiled binaries.
//!
//! The pipeline is deliberately thin: an external disassembler (or string
//! dumper) produces text, [`extract`] turns that text into tokens, and a
//! statistics engine ([`engine`]) builds the term frequencies and rasterizes
//! the cloud. [`pipeline`] drives the whole thing over a batch of targets.
//!
//! All substantive logic lives here so the CLI stays a thin frontend and the
//! pieces can be tested without the external tools installed.

pub mod config;
pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod render;
pub mod services;

pub use config::{image_path_for, ConfigError, ExtractionMode, RunPlan, WordCloudConfig};
pub use engine::{EngineError, StatsEngine};
pub use pipeline::{run_plan, BatchReport, RunError, TargetFailure, WordCloudRunner};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
