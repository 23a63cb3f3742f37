//! Request path to build target resolution.
//!
//! Pure string/path composition: no filesystem access happens here, so the
//! same request path always resolves to the same target.

use std::path::PathBuf;

use crate::config::BundleConfig;

/// One requested artifact: where it lives on disk and what compiles into it.
///
/// Created per request; only the dependency cache entry it produces outlives
/// the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Absolute path of the compiled artifact under `dest`.
    pub output: PathBuf,
    /// Absolute path of the source entry file under `src`.
    pub entry: PathBuf,
}

/// Resolve a request path (already percent-decoded, query stripped) into a
/// build target.
///
/// Returns `None` when the path is not a bundle route (wrong extension).
/// The configured prefix is stripped when the path carries it; a path
/// without it still resolves, just without the strip. Callers delegate
/// rejected requests downstream unmodified.
pub fn resolve(request_path: &str, bundle: &BundleConfig) -> Option<BuildTarget> {
    let path = match &bundle.prefix {
        Some(prefix) => request_path
            .strip_prefix(prefix.as_str())
            .unwrap_or(request_path),
        None => request_path,
    };

    let stem = path.strip_suffix(bundle.extension.as_str())?;
    let rel = path.trim_start_matches('/');
    let rel_stem = stem.trim_start_matches('/');

    // Reject traversal before composing filesystem paths
    if rel.split('/').any(|seg| seg == "..") {
        return None;
    }

    Some(BuildTarget {
        output: bundle.dest.join(rel),
        entry: bundle
            .src
            .join(format!("{}{}", rel_stem, bundle.bundle_extension)),
    })
}
