mod cli;
mod config;
mod error;
mod execution;
mod locator;
mod logger;
mod setup;


use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::Cli;
use crate::execution::SystemLauncher;

fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            return Ok(1);
        }
    };
    logger::init_cli_logger(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let home_dir = dirs::home_dir();
    cli.execute(&cwd, home_dir.as_deref(), &SystemLauncher)
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    std::process::exit(code);
}
