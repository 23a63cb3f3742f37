//! `[compiler]` section configuration.
//!
//! The compiler is an external bundler command. It receives the entry path
//! (via the `$REBUNDLE_ENTRY` placeholder, or appended as the last argument)
//! and must print a JSON object on stdout:
//!
//! ```json
//! { "code": "...", "map": "...", "dependencies": ["/abs/a.bundle"] }
//! ```
//!
//! # Example
//!
//! ```toml
//! [compiler]
//! command = ["node", "bundler.js", "$REBUNDLE_ENTRY"]
//!
//! [compiler.env]
//! NODE_ENV = "development"
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// External bundler command settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Bundler argv. The first element is the program name.
    pub command: Vec<String>,

    /// Extra environment variables passed to the bundler.
    pub env: FxHashMap<String, String>,
}

impl CompilerConfig {
    /// Program name, if a command is configured.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }
}
