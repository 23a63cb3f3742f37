//! Artifact persistence.
//!
//! Writes a build result to the destination directory: the bundle code at
//! the output path and, when the compiler produced one, the source map at
//! `<output>.map`. Both files are written concurrently and the write only
//! succeeds if both do. The destination directory must already exist; a
//! missing directory is a reported failure, not something we create behind
//! the user's back.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use crate::compiler::BuildResult;
use crate::{debug, log};

/// Why an artifact could not be persisted.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("destination directory does not exist: {0}")]
    MissingDir(PathBuf),

    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write a build result to disk. Blocks until both files are on disk.
pub fn write(output: &Path, result: &BuildResult) -> Result<(), WriteError> {
    let Some(dir) = output.parent() else {
        return Err(WriteError::MissingDir(PathBuf::new()));
    };
    if !dir.is_dir() {
        return Err(WriteError::MissingDir(dir.to_path_buf()));
    }

    match &result.map {
        Some(map) => {
            let map_path = map_path(output);
            let (code_res, map_res) = rayon::join(
                || fs::write(output, &result.code),
                || fs::write(&map_path, map),
            );
            code_res.map_err(|source| WriteError::Io {
                path: output.to_path_buf(),
                source,
            })?;
            map_res.map_err(|source| WriteError::Io {
                path: map_path,
                source,
            })?;
        }
        None => {
            fs::write(output, &result.code).map_err(|source| WriteError::Io {
                path: output.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

/// Companion source-map path: the output path with `.map` appended.
fn map_path(output: &Path) -> PathBuf {
    let mut os = output.as_os_str().to_os_string();
    os.push(".map");
    PathBuf::from(os)
}

// ============================================================================
// Write tickets
// ============================================================================

/// Completion handle for a background artifact write.
///
/// Serve mode `never` blocks on this before delegating, so the downstream
/// static handler never serves a half-written or stale file. Errors are
/// broadcast as display strings since every coalesced waiter gets a copy.
#[derive(Debug, Default)]
pub struct WriteTicket {
    state: Mutex<Option<Result<(), String>>>,
    done: Condvar,
}

impl WriteTicket {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the write finishes, then return its outcome.
    pub fn wait(&self) -> Result<(), String> {
        let mut state = self.state.lock();
        while state.is_none() {
            self.done.wait(&mut state);
        }
        state.clone().expect("ticket state set before notify")
    }

    pub(crate) fn complete(&self, result: Result<(), String>) {
        *self.state.lock() = Some(result);
        self.done.notify_all();
    }
}

/// Start the disk write in the background and return its ticket.
///
/// The write is never cancelled: even if the requesting client disconnects,
/// the artifact lands on disk for the next request.
pub fn spawn_write(output: PathBuf, result: Arc<BuildResult>) -> Arc<WriteTicket> {
    let ticket = Arc::new(WriteTicket::new());
    let handle = Arc::clone(&ticket);

    std::thread::spawn(move || {
        let outcome = write(&output, &result);
        match &outcome {
            Ok(()) => debug!("write"; "{}", output.display()),
            Err(e) => log!("error"; "artifact write failed for {}: {e}", output.display()),
        }
        handle.complete(outcome.map_err(|e| e.to_string()));
    });

    ticket
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(map: Option<&str>) -> BuildResult {
        BuildResult {
            code: "var bundled = true;".into(),
            map: map.map(Into::into),
            dependencies: vec![],
        }
    }

    #[test]
    fn writes_code_only() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("app.js");

        write(&output, &result(None)).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "var bundled = true;");
        assert!(!map_path(&output).exists());
    }

    #[test]
    fn writes_code_and_map() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("app.js");

        write(&output, &result(Some("{\"version\":3}"))).unwrap();

        assert!(output.is_file());
        assert_eq!(
            fs::read_to_string(dir.path().join("app.js.map")).unwrap(),
            "{\"version\":3}"
        );
    }

    #[test]
    fn missing_destination_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nope").join("app.js");

        let err = write(&output, &result(None)).unwrap_err();
        assert!(matches!(err, WriteError::MissingDir(_)));
    }

    #[test]
    fn map_path_appends_suffix() {
        assert_eq!(
            map_path(Path::new("/static/app.js")),
            PathBuf::from("/static/app.js.map")
        );
    }

    #[test]
    fn ticket_reports_background_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("app.js");

        let ticket = spawn_write(output.clone(), Arc::new(result(None)));
        ticket.wait().unwrap();
        assert!(output.is_file());
    }

    #[test]
    fn ticket_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("app.js");

        let ticket = spawn_write(output, Arc::new(result(None)));
        let err = ticket.wait().unwrap_err();
        assert!(err.contains("destination directory"));
    }

    #[test]
    fn wait_is_idempotent() {
        let ticket = WriteTicket::new();
        ticket.complete(Ok(()));
        assert!(ticket.wait().is_ok());
        assert!(ticket.wait().is_ok());
    }
}
