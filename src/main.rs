//! Logsim - logic circuit definition checker
//!
//! Reads a definition file, reports every error with the offending source
//! line, and prints a summary of the circuit when the file is valid.
//!
//! # Usage
//!
//! ```bash
//! logsim circuit.def
//! RUST_LOG=logsim_core=trace logsim --color never circuit.def
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use termcolor::{ColorChoice, StandardStream};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use logsim_core::{
    dsl::{self, ParserConfig},
    error::Result,
};

/// When to color diagnostics
#[derive(ValueEnum, Clone, Copy, Debug)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

/// Logic circuit definition checker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit definition file
    #[arg(value_name = "DEFINITION_FILE")]
    definition_file: PathBuf,

    /// Stop after this many errors (at least 1)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_errors: Option<usize>,

    /// Color diagnostics
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Log parser progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Check the definition file, returning whether it was valid.
fn run(args: &Args) -> Result<bool> {
    let mut config = ParserConfig::new();
    if let Some(max) = args.max_errors {
        config = config.with_max_errors(max);
    }

    debug!(path = %args.definition_file.display(), "checking definition");
    let report = dsl::check_file(&args.definition_file, config)?;

    let mut stream = StandardStream::stdout(args.color.into());
    report.print(&mut stream)?;

    if report.success {
        writeln!(
            stream,
            "{} devices, {} connections, {} monitors",
            report.network.devices().len(),
            report.network.connection_count(),
            report.monitors.len()
        )?;
    } else {
        writeln!(stream, "{} error(s) found", report.error_count())?;
    }
    Ok(report.success)
}
