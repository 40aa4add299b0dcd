// crates/contextstream-hooks/src/hooks/mod.rs
// Hook process entry points: stdin JSON in, one JSON object out

pub mod pre_tool;
pub mod user_prompt;

use crate::adapter::{self, Editor, HookRequest};
use crate::config::{ConfigPaths, EnvConfig, GatePolicy, HooksConfig};
use anyhow::Result;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

/// Performance threshold in milliseconds - warn if hook exceeds this.
const HOOK_PERF_THRESHOLD_MS: u128 = 100;

/// Largest stdin payload accepted
const MAX_INPUT_BYTES: u64 = 1_048_576;

/// Everything a hook needs besides its stdin payload
#[derive(Debug, Clone)]
pub struct HookContext {
    pub env: EnvConfig,
    pub paths: ConfigPaths,
    pub policy: GatePolicy,
    /// Workspace used when the payload names none
    pub cwd: Option<PathBuf>,
}

impl HookContext {
    /// Context from the process environment
    pub fn from_env(env: EnvConfig) -> Self {
        let paths = ConfigPaths::resolve(&env);
        let policy = HooksConfig::load(&paths.hooks_config).gate;
        Self {
            env,
            paths,
            policy,
            cwd: std::env::current_dir().ok(),
        }
    }

    /// Context over an explicit config directory
    pub fn in_dir(env: EnvConfig, dir: impl Into<PathBuf>) -> Self {
        let paths = ConfigPaths::in_dir(dir.into());
        let policy = HooksConfig::load(&paths.hooks_config).gate;
        Self {
            env,
            paths,
            policy,
            cwd: None,
        }
    }

    /// Parse stdin text into a request, filling the workspace from `cwd`.
    /// `None` when the payload is unusable.
    pub(crate) fn request(&self, input: &str, forced: Option<Editor>) -> Option<HookRequest> {
        match adapter::parse(input, forced) {
            Ok(payload) => {
                tracing::debug!(
                    editor = ?payload.editor(),
                    forced = forced.is_some(),
                    "Parsed hook payload"
                );
                let mut request = payload.into_request();
                if request.workspace.is_none() {
                    request.workspace = self.cwd.clone();
                }
                Some(request)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Unusable hook payload, allowing");
                None
            }
        }
    }
}

/// Read hook input from stdin
pub fn read_hook_input() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .take(MAX_INPUT_BYTES)
        .read_to_string(&mut input)?;
    Ok(input)
}

/// Write hook output to stdout
pub fn write_hook_output(output: &serde_json::Value) {
    use std::io::Write;
    match serde_json::to_string(output) {
        Ok(s) => {
            let _ = writeln!(std::io::stdout(), "{}", s);
        }
        Err(e) => {
            tracing::warn!("Failed to serialize hook output: {}", e);
            let _ = writeln!(std::io::stdout(), "{{}}");
        }
    }
}

/// Logs hook duration when dropped
pub struct HookTimer {
    hook_name: &'static str,
    start: Instant,
}

impl HookTimer {
    /// Start timing a hook
    pub fn start(hook_name: &'static str) -> Self {
        Self {
            hook_name,
            start: Instant::now(),
        }
    }
}

impl Drop for HookTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_millis();
        if elapsed > HOOK_PERF_THRESHOLD_MS {
            tracing::warn!(
                "PERF: {} hook took {}ms (threshold: {}ms)",
                self.hook_name,
                elapsed,
                HOOK_PERF_THRESHOLD_MS
            );
        } else {
            tracing::debug!("{} hook completed in {}ms", self.hook_name, elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_request_fills_workspace_from_cwd() {
        let dir = TempDir::new().unwrap();
        let mut ctx = HookContext::in_dir(EnvConfig::default(), dir.path());
        ctx.cwd = Some(PathBuf::from("/fallback"));

        let req = ctx
            .request(r#"{"tool_name":"Glob","tool_input":{}}"#, None)
            .unwrap();
        assert_eq!(req.workspace, Some(PathBuf::from("/fallback")));

        let req = ctx
            .request(r#"{"tool_name":"Glob","cwd":"/given"}"#, None)
            .unwrap();
        assert_eq!(req.workspace, Some(PathBuf::from("/given")));
    }

    #[test]
    fn test_request_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let ctx = HookContext::in_dir(EnvConfig::default(), dir.path());
        assert!(ctx.request("{{{", None).is_none());
        assert!(ctx.request("", None).is_none());
    }

    #[test]
    fn test_context_loads_policy_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("hooks.toml"),
            "[gate]\ncontext_fresh_window_secs = 45\n",
        )
        .unwrap();
        let ctx = HookContext::in_dir(EnvConfig::default(), dir.path());
        assert_eq!(ctx.policy.context_fresh_window_secs, 45);
    }
}
