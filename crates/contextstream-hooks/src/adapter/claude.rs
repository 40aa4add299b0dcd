// crates/contextstream-hooks/src/adapter/claude.rs
// Claude Code hook payloads and replies

use super::{HookEvent, HookRequest, ToolCall, event_from};
use crate::adapter::Editor;
use crate::decision::Decision;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Snake-case payload shared by every Claude Code hook event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudePayload {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl ClaudePayload {
    pub fn into_request(self) -> HookRequest {
        let event = event_from(self.hook_event_name.as_deref());
        let tool = self
            .tool_name
            .filter(|name| !name.is_empty())
            .map(|name| ToolCall::new(name, self.tool_input.unwrap_or(Value::Null)));
        HookRequest {
            editor: Editor::ClaudeCode,
            event,
            tool,
            workspace: self.cwd.filter(|c| !c.is_empty()).map(PathBuf::from),
            session_id: self.session_id,
        }
    }
}

/// Claude Code cannot be hard-denied through this channel: a block becomes
/// advisory context and the tool still runs.
pub fn render(event: &HookEvent, decision: &Decision) -> Value {
    let text = match (decision.message(), decision.context.as_deref()) {
        (Some(message), Some(context)) => Some(format!("{message}\n\n{context}")),
        (Some(message), None) => Some(message.to_string()),
        (None, Some(context)) => Some(context.to_string()),
        (None, None) => None,
    };

    match text {
        Some(text) => json!({
            "hookSpecificOutput": {
                "hookEventName": event.as_str(),
                "additionalContext": text,
            }
        }),
        None => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{BlockReason, Obligation};

    #[test]
    fn test_projects_pre_tool_payload() {
        let payload: ClaudePayload = serde_json::from_value(json!({
            "session_id": "abc",
            "cwd": "/work/app",
            "hook_event_name": "PreToolUse",
            "tool_name": "Glob",
            "tool_input": { "pattern": "**/*.ts" }
        }))
        .unwrap();

        let req = payload.into_request();
        assert_eq!(req.event, HookEvent::PreToolUse);
        assert_eq!(req.workspace, Some(PathBuf::from("/work/app")));
        assert_eq!(req.session_id.as_deref(), Some("abc"));
        let tool = req.tool.unwrap();
        assert_eq!(tool.name, "Glob");
        assert_eq!(tool.pattern().as_deref(), Some("**/*.ts"));
        assert!(tool.remote.is_none());
    }

    #[test]
    fn test_projects_prompt_payload() {
        let payload: ClaudePayload = serde_json::from_value(json!({
            "hook_event_name": "UserPromptSubmit",
            "prompt": "fix the bug"
        }))
        .unwrap();
        let req = payload.into_request();
        assert_eq!(req.event, HookEvent::UserPromptSubmit);
        assert!(req.tool.is_none());
        assert!(req.workspace.is_none());
    }

    #[test]
    fn test_render_allow_is_empty_object() {
        assert_eq!(render(&HookEvent::PreToolUse, &Decision::allow()), json!({}));
    }

    #[test]
    fn test_render_block_is_advisory_context() {
        let d = Decision::block(BlockReason::Obligation(Obligation::Init), "call init first");
        let out = render(&HookEvent::PreToolUse, &d);
        assert_eq!(out["hookSpecificOutput"]["hookEventName"], "PreToolUse");
        assert_eq!(
            out["hookSpecificOutput"]["additionalContext"],
            "call init first"
        );
        assert!(out.get("decision").is_none());
    }

    #[test]
    fn test_render_context_on_allow() {
        let d = Decision::allow().with_context("rules");
        let out = render(&HookEvent::UserPromptSubmit, &d);
        assert_eq!(out["hookSpecificOutput"]["hookEventName"], "UserPromptSubmit");
        assert_eq!(out["hookSpecificOutput"]["additionalContext"], "rules");
    }
}
