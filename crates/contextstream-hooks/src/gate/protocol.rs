// crates/contextstream-hooks/src/gate/protocol.rs
// Recognizing protocol calls and state-changing tools

use crate::adapter::ToolCall;
use crate::config::GatePolicy;
use regex::Regex;
use std::sync::LazyLock;

/// Remote tools that initialize a session
pub const INIT_TOOLS: &[&str] = &["init", "session_init"];

/// Remote tools that retrieve context for the current message
pub const CONTEXT_TOOLS: &[&str] = &["context", "context_smart"];

/// Name fragments of tools that modify the workspace or run commands
pub const STATE_CHANGING_KEYWORDS: &[&str] = &[
    "write", "edit", "create", "delete", "remove", "rename", "move", "bash", "shell", "exec",
    "command", "patch", "apply", "insert", "replace", "notebook",
];

/// Tools whose names match a keyword but leave the workspace alone
pub const NOT_STATE_CHANGING: &[&str] = &[
    "TodoWrite",
    "BashOutput",
    "KillShell",
    "KillBash",
    "NotebookRead",
];

static STATE_CHANGING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!("(?i)(?:{})", STATE_CHANGING_KEYWORDS.join("|"))).ok());

fn remote_tool_in(tool: &ToolCall, names: &[&str]) -> bool {
    tool.remote
        .as_ref()
        .is_some_and(|r| names.iter().any(|n| r.tool.eq_ignore_ascii_case(n)))
}

pub fn is_init_call(tool: &ToolCall) -> bool {
    remote_tool_in(tool, INIT_TOOLS)
}

pub fn is_context_call(tool: &ToolCall) -> bool {
    remote_tool_in(tool, CONTEXT_TOOLS)
}

/// A remote query on the bypass allow-list
pub fn is_read_only_query(tool: &ToolCall, policy: &GatePolicy) -> bool {
    tool.remote
        .as_ref()
        .is_some_and(|r| policy.is_read_only(&r.tool, r.action.as_deref()))
}

/// Heuristic: the tool may have changed files or run something.
/// Remote calls never touch the local workspace.
pub fn is_state_changing(tool: &ToolCall) -> bool {
    if tool.remote.is_some() || NOT_STATE_CHANGING.contains(&tool.name.as_str()) {
        return false;
    }
    STATE_CHANGING
        .as_ref()
        .is_some_and(|re| re.is_match(&tool.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn local(name: &str) -> ToolCall {
        ToolCall::new(name, json!({}))
    }

    fn remote(tool: &str, action: Option<&str>) -> ToolCall {
        let input = match action {
            Some(a) => json!({ "action": a }),
            None => json!({}),
        };
        ToolCall::new(format!("mcp__contextstream__{tool}"), input)
    }

    #[test]
    fn test_init_and_context_calls() {
        assert!(is_init_call(&remote("init", None)));
        assert!(is_init_call(&remote("session_init", None)));
        assert!(is_context_call(&remote("context_smart", None)));
        assert!(is_context_call(&remote("context", None)));
        assert!(!is_context_call(&remote("search", None)));
        // Local tools with the same name are not protocol calls
        assert!(!is_init_call(&local("init")));
    }

    #[test]
    fn test_read_only_query_uses_policy() {
        let policy = GatePolicy::default();
        assert!(is_read_only_query(&remote("workspace", Some("list")), &policy));
        assert!(is_read_only_query(&remote("help", Some("version")), &policy));
        assert!(!is_read_only_query(&remote("session", Some("capture")), &policy));
        assert!(!is_read_only_query(&local("workspace"), &policy));
    }

    #[test]
    fn test_state_changing_tools() {
        for name in [
            "Write",
            "Edit",
            "MultiEdit",
            "NotebookEdit",
            "Bash",
            "Shell",
            "write_to_file",
            "replace_in_file",
            "execute_command",
            "apply_diff",
        ] {
            assert!(is_state_changing(&local(name)), "{name} should change state");
        }
    }

    #[test]
    fn test_read_only_tools() {
        for name in [
            "Read",
            "Glob",
            "Grep",
            "TodoWrite",
            "BashOutput",
            "KillShell",
            "NotebookRead",
            "list_files",
        ] {
            assert!(!is_state_changing(&local(name)), "{name} should not change state");
        }
        assert!(!is_state_changing(&remote("memory", Some("create_event"))));
    }
}
