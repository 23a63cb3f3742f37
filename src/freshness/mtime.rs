//! Modification time helpers.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_has_no_mtime() {
        assert!(get_mtime(Path::new("/nonexistent/file.js")).is_none());
    }

    #[test]
    fn existing_file_has_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "x").unwrap();
        assert!(get_mtime(&file).is_some());
    }
}
