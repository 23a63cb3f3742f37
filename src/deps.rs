//! Dependency cache: output path → flat list of source files read by the
//! last successful build.
//!
//! An explicit component instance injected into the rebuild orchestrator
//! rather than ambient global state, so independent server instances and
//! tests each get their own cache.
//!
//! # Invariants
//! - An entry exists only after a compile targeting that output succeeded
//! - `put` fully replaces the previous list, never merges
//! - Entries live for the process lifetime; no eviction (growth is bounded
//!   by the number of distinct requested artifacts)

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Process-wide mapping from output artifact to its dependency list.
///
/// The lock is held only while reading or writing the map itself, never
/// across stat calls or compiles.
#[derive(Debug, Default)]
pub struct DepCache {
    entries: Mutex<FxHashMap<PathBuf, Vec<PathBuf>>>,
}

impl DepCache {
    /// Create an empty cache (cold on every process start).
    pub fn new() -> Self {
        Self::default()
    }

    /// Dependency list recorded for an output, if any build succeeded yet.
    pub fn get(&self, output: &Path) -> Option<Vec<PathBuf>> {
        self.entries.lock().get(output).cloned()
    }

    /// Whether any build for this output has completed.
    pub fn contains(&self, output: &Path) -> bool {
        self.entries.lock().contains_key(output)
    }

    /// Record the dependency list reported by a successful build.
    ///
    /// Replaces any existing entry: dependency sets legitimately shrink when
    /// imports are removed, so merging would pin stale files forever.
    pub fn put(&self, output: &Path, deps: Vec<PathBuf>) {
        self.entries.lock().insert(output.to_path_buf(), deps);
    }

    /// Number of cached outputs (for debug logging).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
