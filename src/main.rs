mod cli;
mod config;
mod error;
mod prompt;
mod registry;
mod report;
mod scanner;
mod stack;
mod telemetry;
mod terragrunt;
mod workflow;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use error::TgError;
use std::process;
use tracing::Level;
use workflow::Environment;

fn main() {
    let cli = Cli::parse();

    telemetry::init_tracing(if cli.verbose { Level::DEBUG } else { Level::WARN });

    let env = Environment::capture();
    match workflow::execute(&cli, &env) {
        Ok(()) => {}
        Err(TgError::ResolutionAborted(reason)) => {
            eprintln!("{} {}", "✗".red().bold(), reason);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(e.exit_code());
        }
    }
}
