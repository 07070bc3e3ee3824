#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use burrow_core::Config;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(author, version, about = "Install npm packages into node_modules", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON formatted log lines on stderr
    #[arg(long)]
    json: bool,

    /// Override the project directory
    #[arg(long, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Packages to install (e.g. `react`, `lodash@^4.17.0`, `@types/node@latest`)
    #[arg(value_name = "SPEC")]
    specs: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.specs.is_empty() {
        println!("Usage: burrow <package[@version]>...");
        return Ok(());
    }

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    logging::init(cli.verbose, cli.json);

    let config = Config::from_env(cwd)
        .into_diagnostic()?
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    commands::install::run(&config, &cli.specs)
}
