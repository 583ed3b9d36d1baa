//! Batch driver: extract tokens and render a cloud for each target in turn.

use std::path::{Path, PathBuf};

use log::{debug, error, info};
use thiserror::Error;

use crate::config::{ConfigError, RunPlan};
use crate::engine::{EngineError, REngine, StatsEngine};
use crate::extract::join_tokens;
use crate::render::{load_required_packages, render_wordcloud, RenderSettings};
use crate::services::{source_for_mode, TokenSource, ToolError};

/// Number of engine trace frames shown for a failed render.
pub const TRACE_FRAMES_SHOWN: usize = 3;

/// Errors that end the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("failed to initialize statistics engine: {0}")]
    Engine(#[from] EngineError),
}

/// A target whose render raised an engine error.
#[derive(Debug)]
pub struct TargetFailure {
    pub target: PathBuf,
    pub image: PathBuf,
    pub error: EngineError,
}

/// Outcome of a batch. Failed renders do not fail the batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<PathBuf>,
    pub failed: Vec<TargetFailure>,
}

/// Ties a plan, a token source and an engine session together.
pub struct WordCloudRunner<'a> {
    pub plan: &'a RunPlan,
    pub source: &'a dyn TokenSource,
    pub engine: &'a mut dyn StatsEngine,
}

impl<'a> WordCloudRunner<'a> {
    /// Process every target sequentially.
    ///
    /// Tool failures abort the batch; engine failures are logged and recorded
    /// in the report, and the next target is processed.
    pub fn run(&mut self) -> Result<BatchReport, RunError> {
        let settings = RenderSettings::from(&self.plan.config);
        let mut report = BatchReport::default();

        for target in &self.plan.targets {
            let image = self.plan.image_path(target);
            debug!("{}: rendering to {}", target.display(), image.display());

            let tokens = self.source.tokens(target)?;
            debug!(
                "{}: {} {} tokens from {}",
                target.display(),
                tokens.len(),
                self.plan.config.mode.as_str(),
                self.source.name()
            );
            let terms = join_tokens(&tokens);

            match render_wordcloud(&mut *self.engine, &terms, &image, &settings) {
                Ok(()) => {
                    info!("wrote {}", image.display());
                    report.rendered.push(image);
                }
                Err(err) => {
                    log_render_failure(target, &err);
                    report.failed.push(TargetFailure { target: target.clone(), image, error: err });
                }
            }
        }

        Ok(report)
    }
}

/// Lines reported for a failed render: the error, then at most
/// [`TRACE_FRAMES_SHOWN`] innermost trace frames.
pub fn failure_report(target: &Path, err: &EngineError) -> Vec<String> {
    std::iter::once(format!("{}: {}", target.display(), err))
        .chain(err.trace().iter().take(TRACE_FRAMES_SHOWN).map(|frame| format!("    {frame}")))
        .collect()
}

fn log_render_failure(target: &Path, err: &EngineError) {
    for line in failure_report(target, err) {
        error!("{line}");
    }
}

/// Run a plan end to end against the system tools and an R session.
pub fn run_plan(plan: &RunPlan) -> Result<BatchReport, RunError> {
    let source = source_for_mode(plan.config.mode)?;

    let mut engine = REngine::start(plan.config.r_dir.as_deref())?;
    debug!("R session started from {}", engine.home().display());
    load_required_packages(&mut engine)?;

    WordCloudRunner { plan, source: source.as_ref(), engine: &mut engine }.run()
}
