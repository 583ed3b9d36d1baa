use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, warn, LevelFilter, SetLoggerError};
use wordcloud_core::services::ToolError;
use wordcloud_core::{run_plan, ConfigError, ExtractionMode, RunError, RunPlan, WordCloudConfig};

/// Exit status when no targets were given.
pub const EXIT_NO_TARGETS: u8 = 255;
/// Exit status after printing help.
pub const EXIT_HELP: u8 = 1;

/// Render word clouds from the symbols, mnemonics, or strings of binaries.
///
/// Each TARGET is disassembled with objdump (or dumped with strings), the
/// extracted tokens are counted by R's `tm` package, and the cloud is drawn
/// with the `wordcloud` package into `<target>.png`.
#[derive(Parser, Debug)]
#[command(
    name = "disasm-wordcloud",
    version,
    about = "Render word clouds from binary disassembly",
    override_usage = "disasm-wordcloud [OPTIONS] TARGET [TARGET...]"
)]
pub struct Cli {
    /// Minimum frequency of terms to render.
    #[arg(
        short = 'f',
        long = "min-freq",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub min_freq: u32,

    /// Invert frequencies so rare terms are drawn largest.
    #[arg(short, long)]
    pub invert: bool,

    /// Count instruction mnemonics instead of symbol references.
    #[arg(short, long)]
    pub mnemonic: bool,

    /// Count printable strings instead of disassembly tokens (wins over --mnemonic).
    #[arg(short, long)]
    pub strings: bool,

    /// Output image path. With several targets this is used as a prefix.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Render with a transparent background.
    #[arg(short, long)]
    pub trans: bool,

    /// Top-level directory of the R installation.
    #[arg(long = "r-dir", value_name = "DIR")]
    pub r_dir: Option<PathBuf>,

    /// Print debug output.
    #[arg(short, long)]
    pub debug: bool,

    /// Binaries to analyze.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<PathBuf>,
}

impl Cli {
    pub fn config(&self) -> WordCloudConfig {
        WordCloudConfig {
            mode: ExtractionMode::from_flags(self.mnemonic, self.strings),
            min_freq: self.min_freq,
            invert: self.invert,
            transparent: self.trans,
            output: self.output.clone(),
            r_dir: self.r_dir.clone(),
        }
    }

    pub fn into_plan(self) -> Result<RunPlan, ConfigError> {
        let config = self.config();
        RunPlan::new(config, self.targets)
    }
}

/// Install the stderr logger. `--debug` lowers the threshold to debug;
/// `RUST_LOG` directives still apply. Fails if a logger is already installed.
pub fn init_logging(debug: bool) -> Result<(), SetLoggerError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn).format_timestamp(None).parse_default_env();
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.try_init()
}

/// Print the usage screen to stdout.
pub fn print_usage() -> io::Result<()> {
    Cli::command().print_help()?;
    writeln!(io::stdout())
}

/// Run the parsed command line and pick the process exit status.
///
/// Targets that fail to render are logged and skipped; they do not change
/// the exit status.
pub fn execute(cli: Cli) -> Result<ExitCode> {
    if cli.mnemonic && cli.strings {
        warn!("both --mnemonic and --strings given; extracting strings");
    }

    let plan = match cli.into_plan() {
        Ok(plan) => plan,
        Err(ConfigError::NoTargets) => {
            eprintln!("{}", ConfigError::NoTargets);
            print_usage().context("Failed to print usage")?;
            return Ok(ExitCode::from(EXIT_NO_TARGETS));
        }
        Err(err) => return Err(err.into()),
    };

    debug!(
        "configuration: {}",
        serde_json::to_string(&plan.config).context("Failed to serialize configuration")?
    );
    debug!("targets: {:?}", plan.targets);

    let report = match run_plan(&plan) {
        Ok(report) => report,
        Err(RunError::Tool(err @ ToolError::NotFound { .. })) => {
            eprintln!("{err}");
            print_usage().context("Failed to print usage")?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err).context("Word cloud run aborted"),
    };

    if !report.failed.is_empty() {
        warn!("{} of {} targets failed to render", report.failed.len(), plan.targets.len());
    }
    debug!("rendered {} image(s)", report.rendered.len());

    Ok(ExitCode::SUCCESS)
}
