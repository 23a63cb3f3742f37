//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8090                 # HTTP port number
//! mode = "on-compile"         # never | on-compile | always
//! max_age = 0                 # Cache-Control max-age for direct responses
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// When to answer a bundle request from memory/disk instead of delegating
/// to the static-file fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ServeMode {
    /// Always delegate; the fallback serves the written artifact (default).
    #[default]
    Never,
    /// Respond from memory only when this request triggered a compile.
    OnCompile,
    /// Respond directly, reading fresh artifacts from disk.
    Always,
}

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Serve mode for compiled bundles.
    pub mode: ServeMode,

    /// Cache-Control max-age (seconds) on direct bundle responses.
    pub max_age: u64,

    /// Content-Type for direct bundle responses.
    pub content_type: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8090,
            mode: ServeMode::default(),
            max_age: 0,
            content_type: crate::utils::mime::types::JAVASCRIPT.into(),
        }
    }
}
