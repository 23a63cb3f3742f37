//! Response dispatch.
//!
//! Maps a rebuild decision and the configured serve mode onto what the HTTP
//! layer should do: answer with an in-memory payload, or delegate to the
//! static-file fallback. The artifact write only sits on the response's
//! critical path in serve mode `never`, where the fallback is about to read
//! the file we just wrote.

use std::fs;

use thiserror::Error;

use crate::config::ServeConfig;
use crate::config::ServeMode;
use crate::rebuild::RebuildDecision;
use crate::route::BuildTarget;

/// What the HTTP layer should do with a finished decision.
#[derive(Debug)]
pub enum Dispatch {
    /// Respond directly with this payload.
    Respond(Payload),
    /// Hand the request to the downstream static-file handler.
    Delegate,
}

/// A direct response, served from memory or from a fresh artifact on disk.
#[derive(Debug)]
pub struct Payload {
    pub content_type: String,
    pub max_age: u64,
    pub body: Vec<u8>,
}

/// Dispatch failures; only the write path can fail here.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// In serve mode `never` a failed write blocks delegation: downstream
    /// would serve a stale or absent file.
    #[error("artifact write failed: {0}")]
    Write(String),
}

/// Turn a rebuild decision into a response action.
pub fn dispatch(
    decision: RebuildDecision,
    target: &BuildTarget,
    serve: &ServeConfig,
) -> Result<Dispatch, DispatchError> {
    match (decision, serve.mode) {
        // The bundle is already in memory: send it, let the write finish
        // off the critical path (its failure is logged by the writer).
        (RebuildDecision::Rebuilt(built), ServeMode::Always | ServeMode::OnCompile) => {
            Ok(Dispatch::Respond(Payload {
                content_type: serve.content_type.clone(),
                max_age: serve.max_age,
                body: built.result.code.as_bytes().to_vec(),
            }))
        }

        // Downstream serves from disk, so the write must land first.
        (RebuildDecision::Rebuilt(built), ServeMode::Never) => {
            built.write.wait().map_err(DispatchError::Write)?;
            Ok(Dispatch::Delegate)
        }

        // Fresh artifact served directly from disk. If it vanished between
        // the freshness check and this read, downstream produces not-found.
        (RebuildDecision::Fresh, ServeMode::Always) => match fs::read(&target.output) {
            Ok(body) => Ok(Dispatch::Respond(Payload {
                content_type: serve.content_type.clone(),
                max_age: serve.max_age,
                body,
            })),
            Err(_) => Ok(Dispatch::Delegate),
        },

        (RebuildDecision::Fresh, _) => Ok(Dispatch::Delegate),
    }
}
