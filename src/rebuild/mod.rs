//! Rebuild orchestration.
//!
//! [`Rebuilder::decide`] is the single entry point that combines the
//! dependency cache, the freshness check, and the compiler into one rebuild
//! decision per request:
//!
//! - cache miss → compile unconditionally, record reported deps
//! - cache hit + fresh → serve as-is
//! - cache hit + stale → compile, fully replace the cache entry
//!
//! A compile that ran is never thrown away: the decision carries its result
//! so the response can go out from memory while the disk write proceeds in
//! the background.
//!
//! Concurrent requests for the same output path are coalesced through a
//! per-target waiter table: the first request compiles and starts the one
//! artifact write, the rest block on a channel and receive the same outcome.
//! This is a correctness requirement, not an optimization - duplicate
//! compiles would race on the destination file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam::channel::{self, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;

use crate::artifact::{self, WriteTicket};
use crate::compiler::{BuildResult, CompileError, Compiler};
use crate::config::RebuildPolicy;
use crate::debug;
use crate::deps::DepCache;
use crate::freshness::is_fresh;
use crate::route::BuildTarget;

/// Outcome of [`Rebuilder::decide`].
#[derive(Debug)]
pub enum RebuildDecision {
    /// Cached artifact is still valid; nothing was compiled.
    Fresh,
    /// A compile ran for this target (here or in a coalesced request).
    Rebuilt(Built),
}

impl RebuildDecision {
    /// Whether this decision involved a rebuild.
    pub fn needed(&self) -> bool {
        matches!(self, Self::Rebuilt(_))
    }
}

/// A completed compile with its in-flight disk write.
#[derive(Debug, Clone)]
pub struct Built {
    /// The compiled bundle, shared with every coalesced waiter.
    pub result: Arc<BuildResult>,
    /// Ticket for the single background artifact write.
    pub write: Arc<WriteTicket>,
}

/// Rebuild failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The compile this request coalesced onto failed; only the display
    /// message crosses the broadcast channel.
    #[error("{0}")]
    Coalesced(String),
}

type Waiter = Sender<Result<Built, String>>;

/// The rebuild state machine, one instance per server.
pub struct Rebuilder {
    cache: DepCache,
    policy: RebuildPolicy,
    /// Output paths with a compile in flight → waiters for its outcome.
    inflight: DashMap<PathBuf, Vec<Waiter>>,
}

impl Rebuilder {
    pub fn new(policy: RebuildPolicy) -> Self {
        Self {
            cache: DepCache::new(),
            policy,
            inflight: DashMap::new(),
        }
    }

    /// Decide whether `target` needs a rebuild, compiling if it does.
    ///
    /// May block on the compiler, on stat calls, or on another request's
    /// in-flight compile for the same output. The cache lock is never held
    /// across any of those.
    pub fn decide(
        &self,
        target: &BuildTarget,
        compiler: &dyn Compiler,
    ) -> Result<RebuildDecision, RebuildError> {
        match self.policy {
            // `never`: any cached output short-circuits, no staleness check
            RebuildPolicy::Never if self.cache.contains(&target.output) => {
                debug!("rebuild"; "{}: policy never, serving cached", target.output.display());
                return Ok(RebuildDecision::Fresh);
            }
            RebuildPolicy::DepsChange => {
                if let Some(deps) = self.cache.get(&target.output)
                    && is_fresh(&target.output, &deps)
                {
                    return Ok(RebuildDecision::Fresh);
                }
            }
            // `always`, or `never` on a cold miss: fall through to rebuild
            _ => {}
        }

        self.rebuild(target, compiler)
    }

    /// Compile the target, coalescing onto an in-flight build if one exists.
    fn rebuild(
        &self,
        target: &BuildTarget,
        compiler: &dyn Compiler,
    ) -> Result<RebuildDecision, RebuildError> {
        let (tx, rx) = channel::bounded(1);

        // Claim leadership or join the existing compile. The entry guard is
        // dropped before any blocking work.
        let leader = match self.inflight.entry(target.output.clone()) {
            Entry::Occupied(mut e) => {
                e.get_mut().push(tx);
                false
            }
            Entry::Vacant(e) => {
                e.insert(Vec::new());
                true
            }
        };

        if !leader {
            debug!("rebuild"; "{}: coalescing onto in-flight compile", target.output.display());
            return match rx.recv() {
                Ok(Ok(built)) => Ok(RebuildDecision::Rebuilt(built)),
                Ok(Err(message)) => Err(RebuildError::Coalesced(message)),
                Err(_) => Err(RebuildError::Coalesced("compile channel closed".into())),
            };
        }

        let outcome = self.execute(target, compiler);

        // Release waiters whatever the outcome
        let waiters = self
            .inflight
            .remove(&target.output)
            .map(|(_, w)| w)
            .unwrap_or_default();
        let broadcast = match &outcome {
            Ok(built) => Ok(built.clone()),
            Err(e) => Err(e.to_string()),
        };
        for waiter in waiters {
            let _ = waiter.send(broadcast.clone());
        }

        outcome.map(RebuildDecision::Rebuilt)
    }

    /// Run one compile, install its dependency list, start the one write.
    ///
    /// On failure nothing is cached: a failed build must never shadow the
    /// dependency list of the last successful one.
    fn execute(&self, target: &BuildTarget, compiler: &dyn Compiler) -> Result<Built, RebuildError> {
        debug!("compile"; "{}", target.entry.display());

        let result = compiler.compile(&target.entry)?;
        self.cache.put(&target.output, result.dependencies.clone());
        debug!("rebuild"; "{} deps recorded, {} outputs cached",
            result.dependencies.len(), self.cache.len());

        let result = Arc::new(result);
        let write = artifact::spawn_write(target.output.clone(), Arc::clone(&result));

        Ok(Built { result, write })
    }

    /// Cached dependency list for an output (test and log access).
    pub fn cached_deps(&self, output: &Path) -> Option<Vec<PathBuf>> {
        self.cache.get(output)
    }
}
