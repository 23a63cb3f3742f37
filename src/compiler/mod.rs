//! Compiler collaborator boundary.
//!
//! The server never bundles anything itself: it hands an entry path to a
//! [`Compiler`] and gets back the generated code plus the flat list of files
//! the build read. The one shipped backend shells out to a configured
//! bundler command ([`command::CommandCompiler`]); tests inject fakes.

pub mod command;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A freshly compiled bundle.
///
/// Owned transiently by the rebuild orchestrator until the artifact writer
/// and response dispatcher have consumed it.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Generated bundle code.
    pub code: String,
    /// Companion source map, written next to the code as `<output>.map`.
    pub map: Option<String>,
    /// Absolute paths of every source file this build read.
    pub dependencies: Vec<PathBuf>,
}

/// Why a compile did not produce a bundle.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to launch bundler `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bundler failed{}:\n{stderr}", status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Failed { status: Option<i32>, stderr: String },

    #[error("bundler output did not match the JSON contract")]
    Contract(#[from] serde_json::Error),

    #[error("no bundler command configured")]
    NoCommand,
}

/// Compiles one entry file into a bundle.
///
/// Implementations must fail with a propagatable error on an unresolvable
/// entry or a syntax error; they must not write the artifact themselves.
pub trait Compiler: Send + Sync {
    fn compile(&self, entry: &Path) -> Result<BuildResult, CompileError>;
}
