//! BookBuddy interactive entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the collection database.
//! - Seed an empty database, then hand stdin/stdout to the menu shell.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bookbuddy_core::{init_logging, seed_sample_data, Database};
use clap::Parser;
use log::info;

mod config;
mod render;
mod shell;

use config::{CliArgs, CliConfig};
use shell::Shell;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let config = CliConfig::resolve(args, &cwd);

    // The shell stays usable without file logs.
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let db = Database::open(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok seed={}",
        config.seed
    );

    if config.seed {
        seed_sample_data(&db).context("failed to load sample collection")?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(&db, stdin.lock(), stdout.lock())
        .run()
        .context("terminal I/O failed")?;

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}
