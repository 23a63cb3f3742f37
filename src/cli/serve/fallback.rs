//! Downstream static-file handler.
//!
//! Requests the bundle pipeline does not claim (and delegated decisions)
//! land here: serve whatever exists under the destination directory, with
//! 404 when nothing matches.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tiny_http::Request;

use super::response;

/// Serve `clean_path` from `serve_root`, or 404.
pub fn respond(request: Request, clean_path: &str, serve_root: &Path) -> Result<()> {
    match resolve_file(clean_path, serve_root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}

/// Resolve a request path to a file under `serve_root`, handling
/// `index.html` for directories.
///
/// Canonicalizes to keep symlinks and encoded sequences from escaping the
/// serve root.
fn resolve_file(clean_path: &str, serve_root: &Path) -> Option<PathBuf> {
    let rel = clean_path.trim_matches('/');

    if rel.split('/').any(|seg| seg == "..") {
        return None;
    }

    let local = serve_root.join(rel);
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}
