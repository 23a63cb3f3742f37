//! External bundler command backend.
//!
//! Runs the configured argv with `$REBUNDLE_*` placeholders resolved and
//! parses the JSON contract from its stdout. Compiler-reported dependency
//! paths are normalized to absolute form so they can key freshness checks.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::config::Config;
use crate::utils::normalize_path;

use super::{BuildResult, CompileError, Compiler};

/// JSON object the bundler must print on stdout.
#[derive(Debug, Deserialize)]
struct Contract {
    code: String,
    #[serde(default)]
    map: Option<String>,
    #[serde(default)]
    dependencies: Vec<PathBuf>,
}

/// Compiler backend that shells out to a configured bundler command.
pub struct CommandCompiler {
    argv: Vec<String>,
    env: FxHashMap<String, String>,
    root: PathBuf,
}

impl CommandCompiler {
    /// Build from the `[compiler]` config section.
    pub fn from_config(config: &Config) -> Result<Self, CompileError> {
        if config.compiler.command.is_empty() {
            return Err(CompileError::NoCommand);
        }
        Ok(Self {
            argv: config.compiler.command.clone(),
            env: config.compiler.env.clone(),
            root: config.root.clone(),
        })
    }

    fn build_vars(&self, entry: &Path) -> FxHashMap<String, String> {
        let mut vars = FxHashMap::default();
        vars.insert(
            "REBUNDLE_ENTRY".into(),
            entry.display().to_string(),
        );
        vars.insert("REBUNDLE_ROOT".into(), self.root.display().to_string());
        vars
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, entry: &Path) -> Result<BuildResult, CompileError> {
        let vars = self.build_vars(entry);
        let mut resolved = resolve_args(&self.argv[1..], &vars);

        // Bundlers that take the entry positionally get it as the last arg
        if !self.argv.iter().any(|arg| arg.contains("$REBUNDLE_ENTRY")) {
            resolved.push(entry.display().to_string());
        }

        let output = Command::new(&self.argv[0])
            .args(&resolved)
            .envs(&self.env)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CompileError::Spawn {
                command: self.argv[0].clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let contract: Contract = serde_json::from_slice(&output.stdout)?;

        Ok(BuildResult {
            code: contract.code,
            map: contract.map,
            dependencies: contract
                .dependencies
                .iter()
                .map(|dep| normalize_path(dep, &self.root))
                .collect(),
        })
    }
}

/// Resolve `$REBUNDLE_*` variables in command arguments
fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                let pattern = format!("${}", key);
                result = result.replace(&pattern, value);
            }
            result
        })
        .collect()
}
