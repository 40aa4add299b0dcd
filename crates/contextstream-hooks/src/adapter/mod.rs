// crates/contextstream-hooks/src/adapter/mod.rs
// Editor dialects: payload detection, canonical requests, reply shapes
//
// Each editor sends its own JSON shape on stdin and expects its own reply
// shape on stdout. Blocking strength differs per editor: Claude Code only
// gets context injected (the tool still runs), Cline-family editors cancel
// the call, Cursor gets a hard deny.

pub mod claude;
pub mod cline;
pub mod cursor;

use crate::decision::Decision;
use crate::error::{GateError, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Host editor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Editor {
    /// Claude Code
    #[value(name = "claude")]
    ClaudeCode,
    /// Cline, Roo Code, Kilo Code
    Cline,
    Cursor,
}

/// Hook event, normalized across editors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    PreToolUse,
    UserPromptSubmit,
    Other(String),
}

impl HookEvent {
    /// Claude-style event name used in replies
    pub fn as_str(&self) -> &str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::Other(name) => name,
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "PreToolUse" | "preToolUse" | "pre_tool_use" => HookEvent::PreToolUse,
            "UserPromptSubmit" | "userPromptSubmit" | "user_prompt_submit" => {
                HookEvent::UserPromptSubmit
            }
            other => HookEvent::Other(other.to_string()),
        }
    }
}

/// A call to the remote service's MCP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub server: String,
    /// Tool name without server prefix, e.g. `search`, `init`
    pub tool: String,
    /// `action` argument of consolidated tools
    pub action: Option<String>,
}

/// The tool an assistant is about to run
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Name as the editor reports it (`Glob`, `search_files`, `Shell`, ...)
    pub name: String,
    /// Arguments, always a JSON object
    pub input: Value,
    pub remote: Option<RemoteCall>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: Value) -> Self {
        let input = object_or_empty(input);
        let name = name.into();
        let remote = parse_mcp_name(&name).map(|(server, tool)| RemoteCall {
            server,
            tool,
            action: str_field(&input, "action"),
        });
        Self {
            name,
            input,
            remote,
        }
    }

    /// Attach remote-call identity for editors that report it separately
    pub fn with_remote(mut self, server: &str, tool: &str) -> Self {
        if is_contextstream_server(server) {
            self.remote = Some(RemoteCall {
                server: server.to_string(),
                tool: tool.to_string(),
                action: str_field(&self.input, "action"),
            });
        }
        self
    }

    pub fn str_arg(&self, key: &str) -> Option<String> {
        str_field(&self.input, key)
    }

    pub fn bool_arg(&self, key: &str) -> Option<bool> {
        self.input.get(key).and_then(Value::as_bool)
    }

    /// Search pattern under any of the names editors use for it
    pub fn pattern(&self) -> Option<String> {
        ["pattern", "regex", "query", "file_pattern"]
            .iter()
            .find_map(|k| self.str_arg(k))
    }
}

/// Canonical request after dialect projection
#[derive(Debug, Clone, PartialEq)]
pub struct HookRequest {
    pub editor: Editor,
    pub event: HookEvent,
    pub tool: Option<ToolCall>,
    pub workspace: Option<PathBuf>,
    pub session_id: Option<String>,
}

/// Stdin payload, one variant per dialect
#[derive(Debug, Clone)]
pub enum HookPayload {
    ClaudeCode(claude::ClaudePayload),
    Cline(cline::ClinePayload),
    Cursor(cursor::CursorPayload),
}

impl HookPayload {
    pub fn editor(&self) -> Editor {
        match self {
            HookPayload::ClaudeCode(_) => Editor::ClaudeCode,
            HookPayload::Cline(_) => Editor::Cline,
            HookPayload::Cursor(_) => Editor::Cursor,
        }
    }

    pub fn into_request(self) -> HookRequest {
        match self {
            HookPayload::ClaudeCode(p) => p.into_request(),
            HookPayload::Cline(p) => p.into_request(),
            HookPayload::Cursor(p) => p.into_request(),
        }
    }
}

/// Pick the dialect from structural hints.
///
/// `hookName`/`toolName` mean Cline-family; Cursor marks itself with
/// `workspace_roots`, `conversation_id`, `cursor_version` or a `before*`
/// event name; everything else, including payloads with neither hint, is
/// treated as Claude Code.
pub fn detect(value: &Value) -> Editor {
    let has = |key: &str| value.get(key).is_some();
    let cursor_event = value
        .get("hook_event_name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.starts_with("before"));
    if has("hookName") || has("toolName") {
        Editor::Cline
    } else if cursor_event
        || has("workspace_roots")
        || has("conversation_id")
        || has("cursor_version")
    {
        Editor::Cursor
    } else {
        Editor::ClaudeCode
    }
}

/// Parse stdin text into a payload. `forced` overrides detection.
pub fn parse(input: &str, forced: Option<Editor>) -> Result<HookPayload> {
    let value: Value = serde_json::from_str(input)?;
    if !value.is_object() {
        return Err(GateError::InvalidInput(
            "hook payload is not a JSON object".to_string(),
        ));
    }
    let editor = forced.unwrap_or_else(|| detect(&value));
    Ok(match editor {
        Editor::ClaudeCode => HookPayload::ClaudeCode(serde_json::from_value(value)?),
        Editor::Cline => HookPayload::Cline(serde_json::from_value(value)?),
        Editor::Cursor => HookPayload::Cursor(serde_json::from_value(value)?),
    })
}

/// Serialize a decision in the shape `editor` expects
pub fn render(editor: Editor, event: &HookEvent, decision: &Decision) -> Value {
    match editor {
        Editor::ClaudeCode => claude::render(event, decision),
        Editor::Cline => cline::render(decision),
        Editor::Cursor => cursor::render(decision),
    }
}

/// Reply used when nothing could be parsed or the gate is switched off
pub fn default_allow(editor: Option<Editor>) -> Value {
    render(
        editor.unwrap_or(Editor::ClaudeCode),
        &HookEvent::PreToolUse,
        &Decision::allow(),
    )
}

pub(crate) fn event_from(name: Option<&str>) -> HookEvent {
    name.map(HookEvent::from_name)
        .unwrap_or(HookEvent::PreToolUse)
}

/// Split `mcp__<server>__<tool>`
pub fn parse_mcp_name(name: &str) -> Option<(String, String)> {
    let rest = name.strip_prefix("mcp__")?;
    let (server, tool) = rest.rsplit_once("__")?;
    if server.is_empty() || tool.is_empty() || !is_contextstream_server(server) {
        return None;
    }
    Some((server.to_string(), tool.to_string()))
}

pub fn is_contextstream_server(server: &str) -> bool {
    server.to_lowercase().contains("contextstream")
}

/// Arguments sometimes arrive as a JSON-encoded string
pub(crate) fn object_or_empty(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => Value::Object(Default::default()),
        },
        _ => Value::Object(Default::default()),
    }
}

pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn first_root(roots: &[String]) -> Option<PathBuf> {
    roots
        .iter()
        .find(|r| !r.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_cline_by_camel_case() {
        assert_eq!(detect(&json!({ "hookName": "PreToolUse" })), Editor::Cline);
        assert_eq!(detect(&json!({ "toolName": "list_files" })), Editor::Cline);
    }

    #[test]
    fn test_detect_claude_by_snake_case() {
        assert_eq!(
            detect(&json!({ "hook_event_name": "PreToolUse", "tool_name": "Glob" })),
            Editor::ClaudeCode
        );
    }

    #[test]
    fn test_detect_defaults_to_claude() {
        assert_eq!(detect(&json!({})), Editor::ClaudeCode);
        assert_eq!(detect(&json!({ "something": 1 })), Editor::ClaudeCode);
    }

    #[test]
    fn test_detect_cursor() {
        assert_eq!(
            detect(&json!({ "hook_event_name": "beforeMCPExecution", "workspace_roots": ["/w"] })),
            Editor::Cursor
        );
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(parse("[1, 2]", None).is_err());
        assert!(parse("not json", None).is_err());
        assert!(parse("", None).is_err());
    }

    #[test]
    fn test_parse_forced_dialect() {
        let payload = parse(r#"{"tool_name":"Glob"}"#, Some(Editor::Cursor)).unwrap();
        assert_eq!(payload.editor(), Editor::Cursor);
    }

    #[test]
    fn test_parse_mcp_name() {
        assert_eq!(
            parse_mcp_name("mcp__contextstream__search"),
            Some(("contextstream".to_string(), "search".to_string()))
        );
        assert_eq!(
            parse_mcp_name("mcp__plugin_contextstream_contextstream__init"),
            Some((
                "plugin_contextstream_contextstream".to_string(),
                "init".to_string()
            ))
        );
        assert_eq!(parse_mcp_name("mcp__github__search"), None);
        assert_eq!(parse_mcp_name("Glob"), None);
    }

    #[test]
    fn test_tool_call_reads_action() {
        let call = ToolCall::new(
            "mcp__contextstream__workspace",
            json!({ "action": "list" }),
        );
        let remote = call.remote.unwrap();
        assert_eq!(remote.tool, "workspace");
        assert_eq!(remote.action.as_deref(), Some("list"));
    }

    #[test]
    fn test_tool_call_decodes_string_arguments() {
        let call = ToolCall::new("Glob", json!("{\"pattern\":\"**/*.rs\"}"));
        assert_eq!(call.pattern().as_deref(), Some("**/*.rs"));

        let call = ToolCall::new("Glob", json!(42));
        assert!(call.input.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_default_allow_shapes() {
        assert_eq!(default_allow(None), json!({}));
        assert_eq!(default_allow(Some(Editor::Cline)), json!({ "cancel": false }));
        assert_eq!(
            default_allow(Some(Editor::Cursor)),
            json!({ "decision": "allow" })
        );
    }
}
