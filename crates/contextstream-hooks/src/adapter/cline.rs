// crates/contextstream-hooks/src/adapter/cline.rs
// Cline / Roo Code / Kilo Code hook payloads and replies

use super::{
    HookRequest, ToolCall, event_from, first_root, is_contextstream_server, object_or_empty,
    str_field,
};
use crate::adapter::Editor;
use crate::decision::Decision;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::path::PathBuf;

/// Tool through which Cline-family editors reach MCP servers
pub const USE_MCP_TOOL: &str = "use_mcp_tool";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinePreToolUse {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default, alias = "toolParameters")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinePromptSubmit {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Camel-case payload. Tool fields appear either at the top level or nested
/// under the event object depending on the editor version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinePayload {
    #[serde(default)]
    pub hook_name: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub workspace_roots: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default, alias = "toolParameters")]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub pre_tool_use: Option<ClinePreToolUse>,
    #[serde(default)]
    pub user_prompt_submit: Option<ClinePromptSubmit>,
}

impl ClinePayload {
    pub fn into_request(self) -> HookRequest {
        let event = event_from(self.hook_name.as_deref());
        let nested = self.pre_tool_use.unwrap_or_default();
        let tool_name = self.tool_name.or(nested.tool_name);
        let parameters = self.parameters.or(nested.parameters);

        let tool = tool_name
            .filter(|name| !name.is_empty())
            .map(|name| project_tool(name, parameters.unwrap_or(Value::Null)));

        let workspace = first_root(&self.workspace_roots)
            .or_else(|| self.cwd.filter(|c| !c.is_empty()).map(PathBuf::from));

        HookRequest {
            editor: Editor::Cline,
            event,
            tool,
            workspace,
            session_id: self.task_id,
        }
    }
}

fn project_tool(name: String, parameters: Value) -> ToolCall {
    if name == USE_MCP_TOOL {
        let params = object_or_empty(parameters);
        let server = str_field(&params, "server_name").unwrap_or_default();
        let tool = str_field(&params, "tool_name").unwrap_or_default();
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        return ToolCall::new(name, arguments).with_remote(&server, &tool);
    }

    // `<server>/<tool>` and `<server>__<tool>` spellings
    let split = name
        .split_once('/')
        .or_else(|| name.rsplit_once("__"))
        .filter(|(server, tool)| is_contextstream_server(server) && !tool.is_empty())
        .map(|(server, tool)| (server.to_string(), tool.to_string()));

    match split {
        Some((server, tool)) => ToolCall::new(name, parameters).with_remote(&server, &tool),
        None => ToolCall::new(name, parameters),
    }
}

/// Blocking cancels the call here
pub fn render(decision: &Decision) -> Value {
    let mut out = Map::new();
    out.insert("cancel".to_string(), json!(decision.is_blocked()));
    if let Some(message) = decision.message() {
        out.insert("errorMessage".to_string(), json!(message));
    }
    if let Some(context) = decision.context.as_deref() {
        out.insert("contextModification".to_string(), json!(context));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::HookEvent;
    use crate::classifier::DiscoveryKind;
    use crate::decision::BlockReason;

    fn request(value: Value) -> HookRequest {
        serde_json::from_value::<ClinePayload>(value)
            .unwrap()
            .into_request()
    }

    #[test]
    fn test_projects_top_level_tool() {
        let req = request(json!({
            "hookName": "PreToolUse",
            "taskId": "t-1",
            "workspaceRoots": ["/work/app"],
            "toolName": "search_files",
            "parameters": { "path": ".", "regex": "fn main" }
        }));
        assert_eq!(req.event, HookEvent::PreToolUse);
        assert_eq!(req.workspace, Some(PathBuf::from("/work/app")));
        assert_eq!(req.session_id.as_deref(), Some("t-1"));
        let tool = req.tool.unwrap();
        assert_eq!(tool.name, "search_files");
        assert_eq!(tool.pattern().as_deref(), Some("fn main"));
    }

    #[test]
    fn test_projects_nested_tool_and_tool_parameters_alias() {
        let req = request(json!({
            "hookName": "PreToolUse",
            "cwd": "/work/app",
            "preToolUse": {
                "toolName": "list_files",
                "toolParameters": { "path": ".", "recursive": true }
            }
        }));
        assert_eq!(req.workspace, Some(PathBuf::from("/work/app")));
        let tool = req.tool.unwrap();
        assert_eq!(tool.name, "list_files");
        assert_eq!(tool.bool_arg("recursive"), Some(true));
    }

    #[test]
    fn test_use_mcp_tool_is_remote() {
        let req = request(json!({
            "hookName": "PreToolUse",
            "toolName": "use_mcp_tool",
            "parameters": {
                "server_name": "contextstream",
                "tool_name": "session",
                "arguments": "{\"action\":\"recall\"}"
            }
        }));
        let remote = req.tool.unwrap().remote.unwrap();
        assert_eq!(remote.tool, "session");
        assert_eq!(remote.action.as_deref(), Some("recall"));
    }

    #[test]
    fn test_other_mcp_servers_are_local() {
        let req = request(json!({
            "toolName": "use_mcp_tool",
            "parameters": { "server_name": "github", "tool_name": "search" }
        }));
        assert!(req.tool.unwrap().remote.is_none());
    }

    #[test]
    fn test_slash_spelling_is_remote() {
        let req = request(json!({ "toolName": "contextstream/init" }));
        assert_eq!(req.tool.unwrap().remote.unwrap().tool, "init");
    }

    #[test]
    fn test_render_allow() {
        assert_eq!(render(&Decision::allow()), json!({ "cancel": false }));
    }

    #[test]
    fn test_render_block_cancels() {
        let d = Decision::block(BlockReason::Discovery(DiscoveryKind::Grep), "use search");
        assert_eq!(
            render(&d),
            json!({ "cancel": true, "errorMessage": "use search" })
        );
    }

    #[test]
    fn test_render_context_modification() {
        let d = Decision::allow().with_context("rules");
        assert_eq!(
            render(&d),
            json!({ "cancel": false, "contextModification": "rules" })
        );
    }
}
