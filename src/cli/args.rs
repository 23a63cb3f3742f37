//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::ServeMode;

/// Rebundle on-demand bundle server CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Trace resolve and freshness decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: rebundle.toml)
    #[arg(short = 'C', long, default_value = "rebundle.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the on-demand bundle server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve mode for compiled bundles
        #[arg(short, long, value_enum)]
        mode: Option<ServeMode>,
    },

    /// Compile one bundle and write it to the destination directory
    #[command(visible_alias = "b")]
    Build {
        /// Request path of the bundle (e.g. /js/app.js)
        path: String,
    },
}
