// crates/contextstream-hooks/src/classifier.rs
// Broad-discovery detection and redirect messages

use crate::adapter::ToolCall;
use crate::utils::truncate;

/// Glob fragments that indicate a project-wide sweep
const DISCOVERY_GLOB_FRAGMENTS: &[&str] = &[
    "**/*",
    "**/",
    "src/**",
    "lib/**",
    "app/**",
    "components/**",
    "pages/**",
    "api/**",
    "services/**",
    "utils/**",
    "hooks/**",
    "types/**",
    "models/**",
    "controllers/**",
    "routes/**",
    "tests/**",
    "__tests__/**",
    "spec/**",
];

/// Grep scopes that mean "everywhere"
const BROAD_SCOPES: &[&str] = &[".", "./", "*", "**"];

/// Longest query echoed back in a redirect
const MAX_QUERY_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryKind {
    Glob,
    /// Grep or Search
    Grep,
    /// Task sub-agent of the explore family
    Explore,
    /// Task sub-agent of the plan family
    PlanAgent,
    /// EnterPlanMode
    PlanMode,
    /// Cline `list_files`
    ListFiles,
    /// Cline `search_files`
    SearchFiles,
}

impl DiscoveryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryKind::Glob => "glob",
            DiscoveryKind::Grep => "grep",
            DiscoveryKind::Explore => "explore",
            DiscoveryKind::PlanAgent => "plan_agent",
            DiscoveryKind::PlanMode => "plan_mode",
            DiscoveryKind::ListFiles => "list_files",
            DiscoveryKind::SearchFiles => "search_files",
        }
    }

    fn is_plan(self) -> bool {
        matches!(self, DiscoveryKind::PlanAgent | DiscoveryKind::PlanMode)
    }
}

/// A positive classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub kind: DiscoveryKind,
    /// What the assistant was looking for, echoed into the suggested call
    pub query: Option<String>,
    /// Directory the local tool would have searched
    pub target: Option<String>,
    /// Tool name as the editor spelled it
    pub tool_name: String,
}

pub fn is_discovery_glob(pattern: &str) -> bool {
    let lower = pattern.to_lowercase();
    DISCOVERY_GLOB_FRAGMENTS.iter().any(|f| lower.contains(f))
        || lower.starts_with("**/*.")
        || lower.starts_with("**/")
        || lower.contains("**")
        || lower.contains("*/")
}

/// `path` is the search scope; no scope at all counts as broad
pub fn is_discovery_grep(path: Option<&str>) -> bool {
    match path.map(str::trim) {
        None | Some("") => true,
        Some(p) => BROAD_SCOPES.contains(&p) || p.contains('*'),
    }
}

/// Task sub-agent types: explore-like agents and plan agents are redirected
pub fn classify_subagent(subagent_type: &str) -> Option<DiscoveryKind> {
    let lower = subagent_type.to_lowercase();
    if lower.contains("explore") {
        Some(DiscoveryKind::Explore)
    } else if lower.contains("plan") {
        Some(DiscoveryKind::PlanAgent)
    } else {
        None
    }
}

/// Classify a local tool call. Calls to the remote service never match.
pub fn classify(tool: &ToolCall) -> Option<Discovery> {
    if tool.remote.is_some() {
        return None;
    }
    let path = tool.str_arg("path");
    let found = |kind, query: Option<String>| Discovery {
        kind,
        query,
        target: path.clone(),
        tool_name: tool.name.clone(),
    };

    match tool.name.as_str() {
        "Glob" => {
            let pattern = tool.pattern().unwrap_or_default();
            is_discovery_glob(&pattern).then(|| found(DiscoveryKind::Glob, Some(pattern)))
        }
        "Grep" | "Search" => is_discovery_grep(path.as_deref())
            .then(|| found(DiscoveryKind::Grep, tool.pattern())),
        "Task" | "Agent" => {
            let subagent = tool.str_arg("subagent_type")?;
            let kind = classify_subagent(&subagent)?;
            let query = tool.str_arg("description").or_else(|| tool.str_arg("prompt"));
            Some(found(kind, query))
        }
        "EnterPlanMode" => Some(found(DiscoveryKind::PlanMode, None)),
        "list_files" => {
            let recursive = tool.bool_arg("recursive").unwrap_or(false);
            (recursive || is_discovery_grep(path.as_deref()))
                .then(|| found(DiscoveryKind::ListFiles, None))
        }
        "search_files" => is_discovery_grep(path.as_deref())
            .then(|| found(DiscoveryKind::SearchFiles, tool.pattern())),
        _ => None,
    }
}

fn quoted(query: Option<&str>) -> String {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => truncate(q, MAX_QUERY_CHARS)
            .replace('\\', "\\\\")
            .replace('"', "\\\""),
        None => "...".to_string(),
    }
}

/// Redirect text naming the remote call to make instead.
/// `stale_days` is set when the index is older than the staleness threshold.
pub fn redirect_message(discovery: &Discovery, stale_days: Option<i64>) -> String {
    let tool = &discovery.tool_name;
    let query = quoted(discovery.query.as_deref());

    let mut message = if discovery.kind.is_plan() {
        format!(
            "STOP: Use mcp__contextstream__session(action=\"capture_plan\", title=\"...\", steps=[...]) \
             instead of {tool}. ContextStream plans persist across sessions and are searchable."
        )
    } else {
        let mode = match discovery.kind {
            DiscoveryKind::Grep | DiscoveryKind::SearchFiles => "keyword",
            _ => "hybrid",
        };
        format!(
            "STOP: Use mcp__contextstream__search(mode=\"{mode}\", query=\"{query}\") \
             instead of {tool}. This project is indexed in ContextStream, which is faster \
             and matches semantically. Only fall back to {tool} if ContextStream returns 0 results."
        )
    };

    if let Some(days) = stale_days {
        message.push_str(&format!(
            " Note: the index is {days} days old and may miss recent changes; \
             re-index with mcp__contextstream__project(action=\"index\") if results look outdated."
        ));
    }
    message
}
