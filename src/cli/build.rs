//! One-shot build of a single bundle route.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::compiler::command::CommandCompiler;
use crate::config::Config;
use crate::log;
use crate::rebuild::{RebuildDecision, Rebuilder};
use crate::route;

/// Compile the bundle a request path would map to and write it to disk.
pub fn build_one(path: &str, config: &Arc<Config>) -> Result<()> {
    let request_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let Some(target) = route::resolve(&request_path, &config.bundle) else {
        bail!(
            "{request_path} is not a bundle route (prefix {:?}, extension {:?})",
            config.bundle.prefix,
            config.bundle.extension
        );
    };

    if !target.entry.is_file() {
        bail!("entry file not found: {}", target.entry.display());
    }

    let compiler = CommandCompiler::from_config(config)?;
    let rebuilder = Rebuilder::new(config.bundle.rebuild);

    match rebuilder.decide(&target, &compiler)? {
        RebuildDecision::Fresh => {
            log!("build"; "{} is up to date", target.output.display());
        }
        RebuildDecision::Rebuilt(built) => {
            built
                .write
                .wait()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("failed to write {}", target.output.display()))?;
            log!("build"; "wrote {}", target.output.display());
        }
    }

    Ok(())
}
