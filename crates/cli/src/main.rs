use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use disasm_wordcloud::{execute, init_logging, Cli, EXIT_HELP};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return parse_failure(err),
    };

    if let Err(err) = init_logging(cli.debug) {
        eprintln!("Error: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Help exits non-zero like the usage screen; malformed options use clap's
/// own reporting and exit status.
fn parse_failure(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp => err.print().map_or(ExitCode::FAILURE, |()| ExitCode::from(EXIT_HELP)),
        ErrorKind::DisplayVersion => err.print().map_or(ExitCode::FAILURE, |()| ExitCode::SUCCESS),
        _ => err.exit(),
    }
}
