//! CLI commands and argument handling.

mod args;
pub mod build;
pub mod serve;

pub use args::{Cli, Commands};
