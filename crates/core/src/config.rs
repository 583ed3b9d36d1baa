//! Run configuration and output naming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// What kind of token is pulled out of each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Trailing `<name>` / `<name@version>` references in disassembly.
    #[default]
    Symbols,
    /// Instruction mnemonics in disassembly.
    Mnemonics,
    /// Printable strings, one token per cleaned line.
    Strings,
}

impl ExtractionMode {
    /// Resolve the mode from the two CLI switches. Strings wins when both are set.
    pub fn from_flags(mnemonic: bool, strings: bool) -> Self {
        match (mnemonic, strings) {
            (_, true) => ExtractionMode::Strings,
            (true, false) => ExtractionMode::Mnemonics,
            (false, false) => ExtractionMode::Symbols,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Symbols => "symbols",
            ExtractionMode::Mnemonics => "mnemonics",
            ExtractionMode::Strings => "strings",
        }
    }
}

/// Options shared by every target in a run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCloudConfig {
    pub mode: ExtractionMode,
    /// Terms rendered only when their (possibly inverted) frequency reaches this.
    pub min_freq: u32,
    pub invert: bool,
    pub transparent: bool,
    /// Output image path (one target) or prefix (several targets).
    pub output: Option<PathBuf>,
    /// Top-level directory of the R installation.
    pub r_dir: Option<PathBuf>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Symbols,
            min_freq: 1,
            invert: false,
            transparent: false,
            output: None,
            r_dir: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TARGET REQUIRED")]
    NoTargets,
    #[error("minimum frequency must be at least 1 (got {0})")]
    InvalidMinFreq(u32),
}

/// A validated configuration plus the ordered, non-empty list of targets.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub config: WordCloudConfig,
    pub targets: Vec<PathBuf>,
}

impl RunPlan {
    pub fn new(config: WordCloudConfig, targets: Vec<PathBuf>) -> Result<Self, ConfigError> {
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if config.min_freq == 0 {
            return Err(ConfigError::InvalidMinFreq(config.min_freq));
        }
        Ok(Self { config, targets })
    }

    /// Image path for one of this plan's targets.
    pub fn image_path(&self, target: &Path) -> PathBuf {
        image_path_for(target, self.config.output.as_deref(), self.targets.len())
    }
}

/// Derive the PNG path for `target`.
///
/// - no override: `<basename>.png` in the current directory
/// - override, single target: the override verbatim
/// - override, several targets: `<override>.<basename>.png`
pub fn image_path_for(target: &Path, output: Option<&Path>, target_count: usize) -> PathBuf {
    let base = target.file_name().unwrap_or(target.as_os_str());

    match output {
        Some(path) if target_count == 1 => path.to_path_buf(),
        Some(prefix) => {
            let mut name = OsString::from(prefix.as_os_str());
            name.push(".");
            name.push(base);
            name.push(".png");
            PathBuf::from(name)
        }
        None => {
            let mut name = base.to_os_string();
            name.push(".png");
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_flag_takes_precedence_over_mnemonic() {
        assert_eq!(ExtractionMode::from_flags(true, true), ExtractionMode::Strings);
        assert_eq!(ExtractionMode::from_flags(true, false), ExtractionMode::Mnemonics);
        assert_eq!(ExtractionMode::from_flags(false, false), ExtractionMode::Symbols);
    }

    #[test]
    fn run_plan_rejects_empty_target_list() {
        let err = RunPlan::new(WordCloudConfig::default(), vec![]).unwrap_err();
        assert_eq!(err, ConfigError::NoTargets);
    }

    #[test]
    fn run_plan_rejects_zero_min_freq() {
        let config = WordCloudConfig { min_freq: 0, ..WordCloudConfig::default() };
        let err = RunPlan::new(config, vec![PathBuf::from("a.out")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidMinFreq(0));
    }

    #[test]
    fn default_name_uses_basename_only() {
        let path = image_path_for(Path::new("/usr/bin/ls"), None, 3);
        assert_eq!(path, PathBuf::from("ls.png"));
    }
}
