//! Configuration management for `rebundle.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[bundle]`   | Source/output directories, routing, rebuild policy |
//! | `[compiler]` | External bundler command and environment         |
//! | `[serve]`    | Development server (port, interface, serve mode) |
//!
//! The project root is the config file's parent directory; `bundle.src` and
//! `bundle.dest` are resolved against it at load time, so the rest of the
//! codebase only ever sees absolute paths.

mod bundle;
mod compiler;
mod error;
mod handle;
mod serve;

pub use bundle::{BundleConfig, RebuildPolicy};
pub use compiler::CompilerConfig;
pub use error::ConfigError;
pub use handle::{cfg, init_config};
pub use serve::{ServeConfig, ServeMode};

use crate::cli::{Cli, Commands};
use crate::log;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing rebundle.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Bundle source/routing settings
    #[serde(default)]
    pub bundle: BundleConfig,

    /// External bundler command
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root
    /// is the config file's parent directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let config_path = match find_config_file(&cli.config) {
            Some(path) => path,
            None => bail!(
                "config file '{}' not found in this directory or any parent",
                cli.config.display()
            ),
        };

        let mut config = Self::from_path(&config_path)?;

        config.config_path = config_path;
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Finalize configuration after loading: resolve the project root,
    /// default `dest` to `src`, make paths absolute, apply CLI overrides.
    fn finalize(&mut self, cli: &Cli) {
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.resolve_paths();

        if let Commands::Serve {
            interface,
            port,
            mode,
        } = &cli.command
        {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
            if let Some(mode) = mode {
                self.serve.mode = *mode;
            }
        }
    }

    /// Default `dest` to `src`, resolve both against the project root and
    /// normalize extension spellings.
    fn resolve_paths(&mut self) {
        if self.bundle.dest.as_os_str().is_empty() {
            self.bundle.dest = self.bundle.src.clone();
        }
        self.bundle.src = self.root_join(&self.bundle.src);
        self.bundle.dest = self.root_join(&self.bundle.dest);

        normalize_extension(&mut self.bundle.extension);
        normalize_extension(&mut self.bundle.bundle_extension);
    }

    /// Validate the merged configuration. Called once at load.
    fn validate(&self) -> Result<()> {
        if self.bundle.src.as_os_str().is_empty() {
            bail!(ConfigError::Validation(
                "bundle.src is required (source directory of .bundle entries)".into()
            ));
        }
        if !self.bundle.src.is_dir() {
            bail!(ConfigError::Validation(format!(
                "bundle.src directory does not exist: {}",
                self.bundle.src.display()
            )));
        }
        if self.compiler.command.is_empty() {
            bail!(ConfigError::Validation(
                "compiler.command is required (e.g. [\"node\", \"bundler.js\", \"$REBUNDLE_ENTRY\"])"
                    .into()
            ));
        }

        // Not fatal: the bundler may be installed later or via a wrapper
        if let Some(program) = self.compiler.program()
            && which::which(program).is_err()
        {
            log!("warning"; "compiler command `{}` not found in PATH", program);
        }

        Ok(())
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring:", path.display());
            for field in &ignored {
                eprintln!("- {}", field);
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Join a path with the project root. Absolute paths are kept as-is.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Ensure an extension string carries its leading dot.
fn normalize_extension(ext: &mut String) {
    if !ext.is_empty() && !ext.starts_with('.') {
        ext.insert(0, '.');
    }
}

/// Find config file by searching upward from current directory
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    for dir in cwd.ancestors() {
        let candidate = dir.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Parse a config from a TOML string for section tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    toml::from_str(content).expect("test config should parse")
}
