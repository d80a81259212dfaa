//! `lumac` - the external driver around the Luma compilation pipeline.
//!
//! Wires CLI parsing, logging, and configuration around the four pipeline
//! crates (`luma-lex` through `luma-compile`); contains no compiler logic
//! of its own.

mod config;
mod error;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use error::LumacError;

/// Compiler driver for the Luma language.
#[derive(Parser, Debug)]
#[command(name = "lumac")]
#[command(author = "Luma Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles Luma source and prints the resulting bytecode", long_about = None)]
struct Cli {
    /// Luma source file to compile. Omitted: start an interactive REPL.
    source: Option<PathBuf>,

    /// Raise the tracing filter to debug level.
    #[arg(short, long, env = "LUMAC_VERBOSE")]
    verbose: bool,

    /// Path to an optional lumac.toml configuration file.
    #[arg(short, long, env = "LUMAC_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    let ok = match &cli.source {
        Some(path) => pipeline::run_file(path, &config)?,
        None => pipeline::run_repl(&config)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) -> error::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| LumacError::Logging(e.to_string()))
}

fn load_config(path: Option<&std::path::Path>, verbose: bool) -> error::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.verbose |= verbose;
    Ok(config)
}
