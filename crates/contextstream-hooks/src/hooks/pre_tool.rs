// crates/contextstream-hooks/src/hooks/pre_tool.rs
// PreToolUse hook: run the gate and answer in the editor's dialect

use crate::adapter::{self, Editor};
use crate::decision::Decision;
use crate::gate::Gate;
use crate::hooks::{HookContext, HookTimer, read_hook_input, write_hook_output};
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Evaluate one stdin payload and build the reply. Never fails: unusable
/// input and internal errors both come back as an allow reply.
pub fn handle(input: &str, forced: Option<Editor>, ctx: &HookContext) -> Value {
    let Some(request) = ctx.request(input, forced) else {
        return adapter::default_allow(forced);
    };

    if !ctx.env.hook_enabled {
        debug!("Gate disabled, allowing");
        return adapter::render(request.editor, &request.event, &Decision::allow());
    }

    let gate = Gate::from_paths(&ctx.paths, ctx.policy.clone());
    let decision = gate.evaluate(&request);
    for diagnostic in &decision.diagnostics {
        warn!(%diagnostic, "Gate fell back to allow");
    }
    if let Some(reason) = decision.block_reason() {
        debug!(?reason, editor = ?request.editor, "Tool call blocked");
    }

    adapter::render(request.editor, &request.event, &decision)
}

/// Run the PreToolUse hook
pub fn run(forced: Option<Editor>, ctx: &HookContext) -> Result<()> {
    let _timer = HookTimer::start("PreToolUse");
    let input = read_hook_input().context("Failed to read hook input from stdin")?;
    write_hook_output(&handle(&input, forced, ctx));
    Ok(())
}
