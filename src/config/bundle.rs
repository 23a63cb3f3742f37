//! `[bundle]` section configuration.
//!
//! Describes where bundle sources live and how request paths map onto them.
//!
//! # Example
//!
//! ```toml
//! [bundle]
//! src = "client/js"           # Source directory (required)
//! dest = "static"             # Output directory (defaults to src)
//! prefix = "/js"              # Route prefix stripped from request paths
//! extension = ".js"           # Request suffix recognized as a bundle route
//! bundle_extension = ".bundle" # On-disk suffix of source entry files
//! rebuild = "deps-change"     # deps-change | never | always
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// When to recompile a requested bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RebuildPolicy {
    /// Rebuild when the output is older than any dependency (default).
    #[default]
    DepsChange,
    /// Never rebuild once a cache entry exists; skip staleness checks.
    Never,
    /// Rebuild on every request, even when provably fresh.
    Always,
}

/// Bundle source and routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Source directory holding `.bundle` entry files (required).
    pub src: PathBuf,

    /// Output directory for compiled artifacts. Defaults to `src`.
    pub dest: PathBuf,

    /// Route prefix stripped from request paths before resolution.
    pub prefix: Option<String>,

    /// Request-path suffix recognized as a compilable route.
    pub extension: String,

    /// On-disk suffix of source entry files.
    pub bundle_extension: String,

    /// Rebuild policy.
    pub rebuild: RebuildPolicy,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::new(),
            dest: PathBuf::new(),
            prefix: None,
            extension: ".js".into(),
            bundle_extension: ".bundle".into(),
            rebuild: RebuildPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::RebuildPolicy;

    #[test]
    fn bundle_defaults() {
        let config = test_parse_config("[bundle]\nsrc = \"client/js\"");

        assert_eq!(config.bundle.extension, ".js");
        assert_eq!(config.bundle.bundle_extension, ".bundle");
        assert_eq!(config.bundle.rebuild, RebuildPolicy::DepsChange);
        assert!(config.bundle.prefix.is_none());
    }

    #[test]
    fn rebuild_policy_variants() {
        let config = test_parse_config("[bundle]\nrebuild = \"never\"");
        assert_eq!(config.bundle.rebuild, RebuildPolicy::Never);

        let config = test_parse_config("[bundle]\nrebuild = \"always\"");
        assert_eq!(config.bundle.rebuild, RebuildPolicy::Always);

        let config = test_parse_config("[bundle]\nrebuild = \"deps-change\"");
        assert_eq!(config.bundle.rebuild, RebuildPolicy::DepsChange);
    }

    #[test]
    fn prefix_parsed() {
        let config = test_parse_config("[bundle]\nprefix = \"/js\"");
        assert_eq!(config.bundle.prefix.as_deref(), Some("/js"));
    }
}
