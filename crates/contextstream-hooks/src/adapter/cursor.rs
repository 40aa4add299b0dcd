// crates/contextstream-hooks/src/adapter/cursor.rs
// Cursor hook payloads and replies

use super::{HookEvent, HookRequest, ToolCall, event_from, first_root};
use crate::adapter::Editor;
use crate::decision::Decision;
use crate::gate::protocol::{CONTEXT_TOOLS, INIT_TOOLS};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::path::PathBuf;

const MCP_EXECUTION_EVENT: &str = "beforeMCPExecution";

/// Server assumed for protocol calls reported without one
const DEFAULT_SERVER: &str = "contextstream";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CursorPayload {
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub workspace_roots: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Object, or a JSON-encoded string for MCP calls
    #[serde(default)]
    pub tool_input: Option<Value>,
    /// MCP server name, when reported
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl CursorPayload {
    pub fn into_request(self) -> HookRequest {
        let name = self.hook_event_name.as_deref().unwrap_or_default();
        let (event, tool) = match name {
            "beforeSubmitPrompt" => (HookEvent::UserPromptSubmit, None),
            "beforeShellExecution" => (
                HookEvent::PreToolUse,
                Some(ToolCall::new(
                    "Shell",
                    json!({ "command": self.command.clone().unwrap_or_default() }),
                )),
            ),
            "beforeReadFile" => (
                HookEvent::PreToolUse,
                Some(ToolCall::new(
                    "Read",
                    json!({ "file_path": self.file_path.clone().unwrap_or_default() }),
                )),
            ),
            other => {
                let event = if other.starts_with("before") {
                    HookEvent::PreToolUse
                } else {
                    event_from(self.hook_event_name.as_deref())
                };
                (event, self.tool_call())
            }
        };

        let workspace = first_root(&self.workspace_roots)
            .or_else(|| self.cwd.filter(|c| !c.is_empty()).map(PathBuf::from));

        HookRequest {
            editor: Editor::Cursor,
            event,
            tool,
            workspace,
            session_id: self.conversation_id,
        }
    }

    fn tool_call(&self) -> Option<ToolCall> {
        let name = self.tool_name.as_deref().filter(|n| !n.is_empty())?;
        let input = self.tool_input.clone().unwrap_or(Value::Null);
        let call = ToolCall::new(name, input);
        if call.remote.is_some() {
            return Some(call);
        }
        Some(match self.mcp_server(name) {
            Some(server) => call.with_remote(server, name),
            None => call,
        })
    }

    /// Reported server, or ours for a bare protocol tool name on an MCP event
    fn mcp_server(&self, tool: &str) -> Option<&str> {
        if let Some(server) = self.server.as_deref().filter(|s| !s.is_empty()) {
            return Some(server);
        }
        let protocol_tool = INIT_TOOLS
            .iter()
            .chain(CONTEXT_TOOLS)
            .any(|t| t.eq_ignore_ascii_case(tool));
        (self.hook_event_name.as_deref() == Some(MCP_EXECUTION_EVENT) && protocol_tool)
            .then_some(DEFAULT_SERVER)
    }
}

/// A true deny
pub fn render(decision: &Decision) -> Value {
    let mut out = Map::new();
    let verdict = if decision.is_blocked() { "deny" } else { "allow" };
    out.insert("decision".to_string(), json!(verdict));
    if let Some(message) = decision.message() {
        out.insert("reason".to_string(), json!(message));
    }
    Value::Object(out)
}
