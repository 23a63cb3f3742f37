//! On-demand bundle server.
//!
//! Each request runs the same pipeline: resolve the path to a build target,
//! let the rebuild orchestrator decide (and compile if stale), then dispatch
//! the response per the configured serve mode. Everything that does not
//! resolve to a bundle route falls through to the static-file fallback.

mod fallback;
mod lifecycle;
mod response;

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;
use percent_encoding::percent_decode_str;
use tiny_http::{Method, Request, Server};

use crate::compiler::Compiler;
use crate::compiler::command::CommandCompiler;
use crate::config::{Config, cfg};
use crate::dispatch::{self, Dispatch};
use crate::rebuild::Rebuilder;
use crate::route;
use crate::{core, debug, log};

/// Per-server state shared across request workers.
struct ServeState {
    rebuilder: Rebuilder,
    compiler: Box<dyn Compiler>,
}

/// Bind the server and run the request loop until shutdown.
pub fn run(config: &Arc<Config>) -> Result<()> {
    let compiler = CommandCompiler::from_config(config)?;
    let state = Arc::new(ServeState {
        rebuilder: Rebuilder::new(config.bundle.rebuild),
        compiler: Box::new(compiler),
    });

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server_for_shutdown(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "src: {}", config.bundle.src.display());
    debug!("serve"; "dest: {}", config.bundle.dest.display());

    run_request_loop(&server, &state);
    Ok(())
}

fn run_request_loop(server: &Server, state: &Arc<ServeState>) {
    // Use thread pool to handle requests concurrently
    // This prevents on-demand compilation from blocking other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = cfg();
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, &state) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
}

/// What the bundle pipeline decided for one request path.
enum Action {
    /// Send this payload directly.
    Respond(dispatch::Payload),
    /// Hand the request to the static-file fallback.
    Delegate,
    /// Compile or write failure; answer with a 500.
    Error(String),
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &Config, state: &ServeState) -> Result<()> {
    if core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    match request.method() {
        Method::Get | Method::Head => {}
        _ => return response::respond_method_not_allowed(request),
    }

    let path = clean_path(request.url());

    match bundle_action(&path, config, state) {
        Action::Respond(payload) => response::respond_payload(request, payload),
        Action::Delegate => fallback::respond(request, &path, &config.bundle.dest),
        Action::Error(message) => response::respond_error(request, &message),
    }
}

/// Run the bundle pipeline for a cleaned request path: resolve, decide,
/// dispatch. Everything the pipeline does not claim becomes a delegation.
fn bundle_action(path: &str, config: &Config, state: &ServeState) -> Action {
    // Not a bundle route at all: static fallback handles it
    let Some(target) = route::resolve(path, &config.bundle) else {
        return Action::Delegate;
    };

    // A static asset living under the bundle route, not a compilable
    // source: silently delegate, the compiler never runs
    if !target.entry.is_file() {
        debug!("route"; "{}: no entry at {}", path, target.entry.display());
        return Action::Delegate;
    }

    let decision = match state.rebuilder.decide(&target, state.compiler.as_ref()) {
        Ok(decision) => decision,
        Err(e) => {
            log!("error"; "compile failed for {}: {e}", target.entry.display());
            return Action::Error(format!("compile failed: {e}"));
        }
    };

    match dispatch::dispatch(decision, &target, &config.serve) {
        Ok(Dispatch::Respond(payload)) => Action::Respond(payload),
        Ok(Dispatch::Delegate) => Action::Delegate,
        Err(e) => {
            log!("error"; "{}: {e}", target.output.display());
            Action::Error(e.to_string())
        }
    }
}

/// Strip the query string, then percent-decode what is left of the URL.
/// The order matters: an encoded `?` in the path must stay in the path.
fn clean_path(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| path.to_string());

    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use crate::compiler::{BuildResult, CompileError, Compiler};
    use crate::config::{BundleConfig, Config, RebuildPolicy, ServeConfig, ServeMode};
    use crate::rebuild::Rebuilder;

    use super::{Action, ServeState, bundle_action, clean_path};

    #[test]
    fn strips_query_string() {
        assert_eq!(clean_path("/app.js?v=123"), "/app.js");
    }

    #[test]
    fn decodes_percent_encoding() {
        assert_eq!(clean_path("/my%20app.js"), "/my app.js");
    }

    #[test]
    fn encoded_question_mark_stays_in_path() {
        assert_eq!(clean_path("/odd%3Fname.js"), "/odd?name.js");
    }

    #[test]
    fn ensures_leading_slash() {
        assert_eq!(clean_path("app.js"), "/app.js");
    }

    // ========================================================================
    // Request pipeline
    // ========================================================================

    /// Counts invocations; fails the build when `fail` is set.
    struct CountingCompiler {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingCompiler {
        fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    fail,
                },
                calls,
            )
        }
    }

    impl Compiler for CountingCompiler {
        fn compile(&self, _entry: &Path) -> Result<BuildResult, CompileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CompileError::Failed {
                    status: Some(1),
                    stderr: "unexpected token".into(),
                });
            }
            Ok(BuildResult {
                code: "var bundled = true;".into(),
                map: None,
                dependencies: vec![],
            })
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: Config,
    }

    /// A project with `client/app.bundle` and an existing dest directory.
    fn fixture(mode: ServeMode) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("client");
        let dest = dir.path().join("static");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("app.bundle"), "import util").unwrap();

        let config = Config {
            root: dir.path().to_path_buf(),
            bundle: BundleConfig {
                src,
                dest,
                ..BundleConfig::default()
            },
            serve: ServeConfig {
                mode,
                ..ServeConfig::default()
            },
            ..Config::default()
        };

        Fixture { _dir: dir, config }
    }

    fn state(compiler: CountingCompiler) -> ServeState {
        ServeState {
            rebuilder: Rebuilder::new(RebuildPolicy::DepsChange),
            compiler: Box::new(compiler),
        }
    }

    #[test]
    fn missing_entry_delegates_without_compiling() {
        let fx = fixture(ServeMode::OnCompile);
        let (compiler, calls) = CountingCompiler::new(false);
        let state = state(compiler);

        // nothing.bundle does not exist under src
        let action = bundle_action("/nothing.js", &fx.config, &state);

        assert!(matches!(action, Action::Delegate));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_bundle_route_delegates_without_compiling() {
        let fx = fixture(ServeMode::OnCompile);
        let (compiler, calls) = CountingCompiler::new(false);
        let state = state(compiler);

        let action = bundle_action("/logo.png", &fx.config, &state);

        assert!(matches!(action, Action::Delegate));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn compiled_bundle_served_from_memory() {
        let fx = fixture(ServeMode::OnCompile);
        let (compiler, calls) = CountingCompiler::new(false);
        let state = state(compiler);

        let action = bundle_action("/app.js", &fx.config, &state);

        match action {
            Action::Respond(payload) => assert_eq!(payload.body, b"var bundled = true;"),
            _ => panic!("expected direct response"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn serve_never_writes_then_delegates() {
        let fx = fixture(ServeMode::Never);
        let (compiler, _) = CountingCompiler::new(false);
        let state = state(compiler);

        let action = bundle_action("/app.js", &fx.config, &state);

        // Delegation only happens after the artifact landed on disk
        assert!(matches!(action, Action::Delegate));
        assert!(fx.config.bundle.dest.join("app.js").is_file());
    }

    #[test]
    fn compile_failure_becomes_error_action() {
        let fx = fixture(ServeMode::OnCompile);
        let (compiler, _) = CountingCompiler::new(true);
        let state = state(compiler);

        let action = bundle_action("/app.js", &fx.config, &state);

        match action {
            Action::Error(message) => assert!(message.contains("unexpected token")),
            _ => panic!("expected an error action"),
        }
    }
}
