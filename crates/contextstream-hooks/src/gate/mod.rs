// crates/contextstream-hooks/src/gate/mod.rs
// Tool invocation gate: protocol obligations, then discovery redirects
//
// Per workspace the gate moves NeedsInit -> NeedsContext -> unrestricted,
// driven by the flags in the protocol store. The prompt hook re-arms the
// flags on every user message. Evaluation never fails: anything that goes
// wrong resolves to allow with a diagnostic attached.

pub mod protocol;

use crate::adapter::{HookEvent, HookRequest, ToolCall};
use crate::classifier::{self, Discovery};
use crate::config::ignore::{is_path_ignored, load_ignore_patterns};
use crate::config::{ConfigPaths, GatePolicy};
use crate::decision::{BlockReason, Decision, Diagnostic, Obligation};
use crate::index_status::IndexStatusReader;
use crate::store::{StateStore, WorkspaceProtocolState};
use crate::workspace;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Gate {
    store: StateStore,
    index: IndexStatusReader,
    policy: GatePolicy,
}

impl Gate {
    pub fn new(store: StateStore, index: IndexStatusReader, policy: GatePolicy) -> Self {
        Self {
            store,
            index,
            policy,
        }
    }

    /// Gate over the standard files in `paths`
    pub fn from_paths(paths: &ConfigPaths, policy: GatePolicy) -> Self {
        Self::new(
            StateStore::new(&paths.prompt_state),
            IndexStatusReader::new(&paths.index_status),
            policy,
        )
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Decide one tool invocation
    pub fn evaluate(&self, request: &HookRequest) -> Decision {
        if request.event != HookEvent::PreToolUse {
            return Decision::allow();
        }
        let Some(tool) = request.tool.as_ref() else {
            return Decision::allow_with_diagnostic(Diagnostic::new(
                "adapter",
                "no tool in pre-tool payload",
            ));
        };
        let Some(workspace) = request.workspace.as_deref() else {
            return Decision::allow_with_diagnostic(Diagnostic::new(
                "adapter",
                "no workspace in payload",
            ));
        };
        let workspace = workspace::normalize(workspace);

        let mut diagnostics = Vec::new();
        let decision = self.decide(tool, &workspace, &mut diagnostics);

        if decision.is_allowed() && protocol::is_state_changing(tool) {
            let result = self.store.update(&workspace, |s, now| {
                s.last_state_change_at = Some(now);
            });
            if let Err(e) = result {
                diagnostics.push(Diagnostic::new("store", format!("mark state changed: {e}")));
            }
        }

        debug!(
            tool = %tool.name,
            workspace = %workspace.display(),
            verdict = ?decision.verdict,
            "Gate decision"
        );
        diagnostics.into_iter().fold(decision, Decision::diagnose)
    }

    fn decide(&self, tool: &ToolCall, workspace: &Path, diags: &mut Vec<Diagnostic>) -> Decision {
        if let Err(e) = self.store.try_cleanup_stale(self.policy.stale_state_secs) {
            diags.push(Diagnostic::new("store", format!("cleanup: {e}")));
        }

        let record = match self.store.read() {
            Ok(state) => state.get(workspace).cloned(),
            Err(e) => {
                diags.push(Diagnostic::new("store", format!("read: {e}")));
                None
            }
        };

        if let Some(decision) = self.check_protocol(tool, workspace, record.as_ref(), diags) {
            return decision;
        }

        self.check_discovery(tool, workspace, diags)
    }

    /// Steps 2 and 3: outstanding init/context obligations.
    /// `None` means the protocol has nothing to say about this call.
    fn check_protocol(
        &self,
        tool: &ToolCall,
        workspace: &Path,
        record: Option<&WorkspaceProtocolState>,
        diags: &mut Vec<Diagnostic>,
    ) -> Option<Decision> {
        let require_init = record.is_some_and(|r| r.require_init);
        let require_context = record.is_some_and(|r| r.require_context);

        if require_init {
            if protocol::is_init_call(tool) {
                self.persist(workspace, diags, |s| s.require_init = false);
                return Some(Decision::satisfied(Obligation::Init));
            }
            return Some(Decision::block(
                BlockReason::Obligation(Obligation::Init),
                init_required_message(workspace),
            ));
        }

        if require_context {
            if protocol::is_context_call(tool) {
                self.record_context(workspace, diags);
                return Some(Decision::satisfied(Obligation::Context));
            }
            if protocol::is_init_call(tool) {
                return Some(Decision::allow());
            }
            let fresh = record.is_some_and(|r| {
                r.is_context_fresh_and_clean(self.policy.context_fresh_window_secs, Utc::now())
            });
            if fresh && protocol::is_read_only_query(tool, &self.policy) {
                return Some(Decision::bypass());
            }
            return Some(Decision::block(
                BlockReason::Obligation(Obligation::Context),
                context_required_message(),
            ));
        }

        if protocol::is_context_call(tool) {
            self.record_context(workspace, diags);
        }
        None
    }

    /// Steps 4 and 5: redirect broad discovery in indexed projects
    fn check_discovery(
        &self,
        tool: &ToolCall,
        workspace: &Path,
        diags: &mut Vec<Diagnostic>,
    ) -> Decision {
        let Some(discovery) = classifier::classify(tool) else {
            return Decision::allow();
        };

        // Indexed roots match by containment, so an index on the project
        // root above `workspace` is found from `workspace` itself
        let index_match = match self.index.find(workspace) {
            Ok(Some(m)) => m,
            Ok(None) => {
                debug!(workspace = %workspace.display(), "Project not indexed, allowing local discovery");
                return Decision::allow();
            }
            Err(e) => {
                diags.push(Diagnostic::new("index", format!("read: {e}")));
                return Decision::allow();
            }
        };

        let root = workspace::find_project_root(workspace)
            .unwrap_or_else(|| index_match.root.clone());
        if targets_ignored_path(&discovery, workspace, &root) {
            debug!(
                tool = %tool.name,
                kind = discovery.kind.as_str(),
                "Discovery target is ignored, allowing"
            );
            return Decision::allow();
        }

        let stale_days = index_match
            .is_stale(self.policy.index_stale_days)
            .then(|| index_match.age_days())
            .flatten();
        Decision::block(
            BlockReason::Discovery(discovery.kind),
            classifier::redirect_message(&discovery, stale_days),
        )
    }

    fn record_context(&self, workspace: &Path, diags: &mut Vec<Diagnostic>) {
        let result = self.store.update(workspace, |s, now| {
            s.require_context = false;
            s.last_context_at = Some(now);
        });
        if let Err(e) = result {
            diags.push(Diagnostic::new("store", format!("record context: {e}")));
        }
    }

    fn persist(
        &self,
        workspace: &Path,
        diags: &mut Vec<Diagnostic>,
        f: impl FnOnce(&mut WorkspaceProtocolState),
    ) {
        if let Err(e) = self.store.update(workspace, |s, _| f(s)) {
            diags.push(Diagnostic::new("store", format!("write: {e}")));
        }
    }
}

fn targets_ignored_path(discovery: &Discovery, workspace: &Path, project_root: &Path) -> bool {
    let Some(target) = discovery.target.as_deref().filter(|t| !t.trim().is_empty()) else {
        return false;
    };
    let target: PathBuf = workspace::resolve_against(workspace, target);
    let patterns = load_ignore_patterns(project_root);
    is_path_ignored(&target, &patterns, project_root)
}

fn init_required_message(workspace: &Path) -> String {
    format!(
        "STOP: This ContextStream session is not initialized. Call \
         mcp__contextstream__init(folder_path=\"{}\") before any other tool.",
        workspace.display()
    )
}

fn context_required_message() -> String {
    "STOP: Call mcp__contextstream__context(user_message=\"...\") for this message \
     before using other tools."
        .to_string()
}
