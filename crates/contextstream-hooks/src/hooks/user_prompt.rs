// crates/contextstream-hooks/src/hooks/user_prompt.rs
// UserPromptSubmit hook: re-arm protocol obligations, inject the rules reminder

use crate::adapter::{self, Editor, HookEvent, HookRequest};
use crate::config::{ApiConfig, resolve_config};
use crate::decision::{Decision, Diagnostic};
use crate::hooks::{HookContext, HookTimer, read_hook_input, write_hook_output};
use crate::store::StateStore;
use crate::workspace;
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Injected on every prompt so the instruction stays in recent context
pub const REMINDER: &str = "[CONTEXTSTREAM RULES - ALWAYS FOLLOW]
1. BEFORE Glob/Grep/Read/Search: Call mcp__contextstream__search(mode=\"hybrid\", query=\"...\") FIRST
2. Call mcp__contextstream__context at the start of EVERY response
3. Only use local tools if ContextStream returns 0 results
[END RULES]";

/// Re-arm obligations for the request's workspace and decide what to inject.
///
/// `requireContext` is set on every prompt; `requireInit` only when the
/// session differs from the one stored on the workspace record.
pub fn apply(request: &HookRequest, ctx: &HookContext, api: &ApiConfig) -> Decision {
    let mut decision = Decision::allow();

    if !ctx.env.hook_enabled {
        return decision;
    }

    match request.workspace.as_deref() {
        Some(path) if api.is_configured() => {
            let path = workspace::normalize(path);
            let store = StateStore::new(&ctx.paths.prompt_state);
            let session_id = request.session_id.as_deref().filter(|s| !s.is_empty());
            match store.arm_for_prompt(&path, session_id) {
                Ok(require_init) => {
                    debug!(workspace = %path.display(), require_init, "Protocol obligations armed")
                }
                Err(e) => {
                    decision =
                        decision.diagnose(Diagnostic::new("store", format!("arm obligations: {e}")))
                }
            }
        }
        Some(_) => debug!("Remote service not configured, leaving obligations alone"),
        None => {
            decision = decision.diagnose(Diagnostic::new("adapter", "no workspace in payload"))
        }
    }

    if ctx.env.reminder_enabled {
        decision = decision.with_context(REMINDER);
    }
    decision
}

/// Build the reply for one stdin payload
pub fn handle(input: &str, forced: Option<Editor>, ctx: &HookContext) -> Value {
    let Some(request) = ctx.request(input, forced) else {
        return adapter::default_allow(forced);
    };

    let api = match request.workspace.as_deref() {
        Some(path) => resolve_config(path),
        None => resolve_config(std::path::Path::new(".")),
    };
    let decision = apply(&request, ctx, &api);
    for diagnostic in &decision.diagnostics {
        warn!(%diagnostic, "Prompt hook degraded");
    }
    adapter::render(request.editor, &HookEvent::UserPromptSubmit, &decision)
}

/// Run the UserPromptSubmit hook
pub fn run(forced: Option<Editor>, ctx: &HookContext) -> Result<()> {
    let _timer = HookTimer::start("UserPromptSubmit");
    let input = read_hook_input().context("Failed to read hook input from stdin")?;
    write_hook_output(&handle(&input, forced, ctx));
    Ok(())
}
