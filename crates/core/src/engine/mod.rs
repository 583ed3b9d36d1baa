//! Statistics/graphics engine bridge.
//!
//! The pipeline only needs two capabilities from the engine: loading a
//! package and evaluating an expression. [`REngine`] provides them on top of
//! a long-lived R session; tests substitute their own implementations.

use std::io;

use thiserror::Error;

pub mod r;

pub use r::{detect_r_home, r_string_literal, resolve_r_home, REngine};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Set R_HOME env-var or pass --r-dir pointing at the R install directory ({0} does not exist)")]
    MissingHome(String),
    #[error("could not determine the R install directory; set R_HOME or pass --r-dir")]
    UnknownHome,
    #[error("R executable not found under {0} or on PATH")]
    MissingExecutable(String),
    #[error("failed to start R: {0}")]
    Spawn(#[source] io::Error),
    #[error("I/O error talking to R: {0}")]
    Io(#[from] io::Error),
    #[error("R session terminated unexpectedly")]
    Terminated,
    /// The engine evaluated the expression and raised an error.
    #[error("{message}")]
    Evaluation { message: String, trace: Vec<String> },
}

impl EngineError {
    /// Frames of the engine-side call trace, if the engine reported any.
    pub fn trace(&self) -> &[String] {
        match self {
            EngineError::Evaluation { trace, .. } => trace,
            _ => &[],
        }
    }
}

/// Narrow capability interface onto the statistics engine.
pub trait StatsEngine {
    /// Make a package's functions available to later expressions.
    fn load_package(&mut self, name: &str) -> Result<(), EngineError>;

    /// Evaluate one expression for its side effects.
    fn evaluate(&mut self, expression: &str) -> Result<(), EngineError>;

    fn name(&self) -> &'static str;
}
