//! The word-cloud render transaction.
//!
//! Rendering one image is a fixed sequence of engine expressions: build a
//! one-document corpus from the token blob, count terms, optionally invert
//! the counts, build the word table, and rasterize it into a PNG device.

use std::path::Path;

use log::debug;

use crate::config::WordCloudConfig;
use crate::engine::{r_string_literal, EngineError, StatsEngine};

/// Packages the render sequence depends on, loaded once per session.
pub const REQUIRED_PACKAGES: [&str; 2] = ["tm", "wordcloud"];

const CLOSE_OPEN_DEVICE: &str = "if (dev.cur() > 1) invisible(dev.off())";

/// The subset of the run configuration that shapes a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub min_freq: u32,
    pub invert: bool,
    pub transparent: bool,
}

impl From<&WordCloudConfig> for RenderSettings {
    fn from(config: &WordCloudConfig) -> Self {
        Self { min_freq: config.min_freq, invert: config.invert, transparent: config.transparent }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { min_freq: 1, invert: false, transparent: false }
    }
}

/// Engine expressions that turn `terms` into a PNG at `image_path`, in order.
pub fn render_steps(terms: &str, image_path: &Path, settings: &RenderSettings) -> Vec<String> {
    let mut steps = vec![
        format!("corpus <- Corpus(VectorSource({}))", r_string_literal(terms)),
        "tdm <- TermDocumentMatrix(corpus)".to_string(),
        "vec <- sort(rowSums(as.matrix(tdm)), decreasing = TRUE)".to_string(),
    ];

    if settings.invert {
        // rare terms get the large weights
        steps.push("vec <- (max(vec) + 1) - vec".to_string());
    }

    steps.push("df <- data.frame(word = names(vec), freq = vec)".to_string());
    steps.push(format!("df <- df[df$freq >= {}, , drop = FALSE]", settings.min_freq));

    let path = r_string_literal(&image_path.to_string_lossy());
    if settings.transparent {
        steps.push(format!("png(filename = {path}, bg = 'transparent')"));
    } else {
        steps.push(format!("png(filename = {path})"));
    }

    steps.push(format!("wordcloud(df$word, df$freq, min.freq = {})", settings.min_freq));
    steps.push("invisible(dev.off())".to_string());
    steps
}

/// Load the packages the render sequence needs.
pub fn load_required_packages(engine: &mut dyn StatsEngine) -> Result<(), EngineError> {
    for package in REQUIRED_PACKAGES {
        debug!("loading {} package {package}", engine.name());
        engine.load_package(package)?;
    }
    Ok(())
}

/// Render `terms` into a word cloud at `image_path`.
///
/// Stops at the first failing step. Any graphics device the failed sequence
/// left open is closed before the error is returned.
pub fn render_wordcloud(
    engine: &mut dyn StatsEngine,
    terms: &str,
    image_path: &Path,
    settings: &RenderSettings,
) -> Result<(), EngineError> {
    for step in render_steps(terms, image_path, settings) {
        if let Err(err) = engine.evaluate(&step) {
            if let Err(cleanup) = engine.evaluate(CLOSE_OPEN_DEVICE) {
                debug!("could not close graphics device after failure: {cleanup}");
            }
            return Err(err);
        }
    }
    Ok(())
}
