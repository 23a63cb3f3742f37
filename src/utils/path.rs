//! Path normalization utilities.
//!
//! Pure helpers for turning compiler-reported paths into absolute form so
//! the dependency cache keys and entries match across requests.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with `base` if relative
#[inline]
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_kept() {
        let normalized = normalize_path(Path::new("/abs/file.js"), Path::new("/base"));
        assert_eq!(normalized, PathBuf::from("/abs/file.js"));
    }

    #[test]
    fn relative_path_joined_with_base() {
        let normalized = normalize_path(Path::new("client/app.bundle"), Path::new("/project"));
        assert_eq!(normalized, PathBuf::from("/project/client/app.bundle"));
    }

    #[test]
    fn existing_path_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "x").unwrap();

        let normalized = normalize_path(&file, Path::new("/unused"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("a.js"));
    }
}
