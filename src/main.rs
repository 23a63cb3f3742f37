//! Rebundle - an on-demand bundle server with incremental rebuilds.
//!
//! A request for a compiled bundle triggers a freshness check against the
//! dependencies the last build read; only stale or unknown bundles are
//! recompiled before the response goes out.

mod artifact;
mod cli;
mod compiler;
mod config;
mod core;
mod deps;
mod dispatch;
mod freshness;
mod logger;
mod rebuild;
mod route;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{Config, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    let config = init_config(Config::load(cli)?);

    match &cli.command {
        Commands::Serve { .. } => cli::serve::run(&config),
        Commands::Build { path } => cli::build::build_one(path, &config),
    }
}
