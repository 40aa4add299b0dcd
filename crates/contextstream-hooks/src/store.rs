// crates/contextstream-hooks/src/store.rs
// File-backed protocol obligations per workspace (prompt-state.json)
//
// Every hook invocation is a fresh process, so there is no in-memory owner:
// each operation reads the whole file, mutates one record and writes the
// whole file back through an atomic rename. Concurrent processes race with
// last-writer-wins semantics. No cross-process lock is taken.

use crate::error::{GateError, Result};
use crate::utils::write_json_atomic;
use crate::workspace;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Protocol obligations and timestamps for one workspace path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceProtocolState {
    /// The first tool call of the session must be the initialize call
    #[serde(default, alias = "require_init")]
    pub require_init: bool,
    /// The next protocol-relevant call must be the context call
    #[serde(default, alias = "require_context")]
    pub require_context: bool,
    #[serde(default, alias = "last_context_at")]
    pub last_context_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "last_state_change_at")]
    pub last_state_change_at: Option<DateTime<Utc>>,
    /// Missing timestamps read as the epoch, so such records are pruned first
    #[serde(default = "epoch", alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
    /// Editor session that last armed this record
    #[serde(default, alias = "session_id", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl WorkspaceProtocolState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            require_init: false,
            require_context: false,
            last_context_at: None,
            last_state_change_at: None,
            updated_at: now,
            session_id: None,
        }
    }

    /// Context was retrieved within `window_secs` of `now` and nothing has
    /// changed the workspace since.
    pub fn is_context_fresh_and_clean(&self, window_secs: u64, now: DateTime<Utc>) -> bool {
        let Some(context_at) = self.last_context_at else {
            return false;
        };
        if now.signed_duration_since(context_at) > secs(window_secs) {
            return false;
        }
        match self.last_state_change_at {
            Some(changed_at) => changed_at <= context_at,
            None => true,
        }
    }
}

/// On-disk document: `{ "workspaces": { "<path>": { ... } } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptState {
    #[serde(default)]
    pub workspaces: BTreeMap<String, WorkspaceProtocolState>,
}

impl PromptState {
    /// Locate the record governing `path`: an exact key, otherwise the most
    /// specific key that contains `path` or is contained by it.
    pub fn find_key(&self, path: &Path) -> Option<String> {
        let target = workspace::normalize(path);
        let target_str = target.to_string_lossy();
        if self.workspaces.contains_key(target_str.as_ref()) {
            return Some(target_str.into_owned());
        }

        self.workspaces
            .keys()
            .filter(|key| workspace::overlaps(&target, &PathBuf::from(key.as_str())))
            .max_by_key(|key| key.len())
            .cloned()
    }

    /// Record governing `path`, if any
    pub fn get(&self, path: &Path) -> Option<&WorkspaceProtocolState> {
        self.find_key(path).and_then(|k| self.workspaces.get(&k))
    }

    /// Record governing `path`, created with both flags clear when missing
    pub fn entry(&mut self, path: &Path, now: DateTime<Utc>) -> &mut WorkspaceProtocolState {
        let key = self
            .find_key(path)
            .unwrap_or_else(|| workspace::normalize(path).to_string_lossy().into_owned());
        self.workspaces
            .entry(key)
            .or_insert_with(|| WorkspaceProtocolState::new(now))
    }

    /// Drop records idle longer than `max_age_secs`. Returns how many went.
    pub fn prune(&mut self, max_age_secs: u64, now: DateTime<Utc>) -> usize {
        let before = self.workspaces.len();
        let max_age = secs(max_age_secs);
        self.workspaces
            .retain(|_, state| now.signed_duration_since(state.updated_at) <= max_age);
        before - self.workspaces.len()
    }
}

/// Persistent workspace -> obligation map
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state file. A missing file is an empty state; an unparsable
    /// one is reported as `CorruptState`.
    pub fn read(&self) -> Result<PromptState> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PromptState::default());
            }
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(PromptState::default());
        }
        serde_json::from_str(&contents).map_err(|source| GateError::CorruptState {
            path: self.path.clone(),
            source,
        })
    }

    /// Read, substituting an empty state for any failure
    pub fn load(&self) -> PromptState {
        self.read().unwrap_or_else(|e| {
            warn!(error = %e, "Protocol state unreadable, treating as empty");
            PromptState::default()
        })
    }

    pub fn write(&self, state: &PromptState) -> Result<()> {
        write_json_atomic(&self.path, state)
    }

    /// Read-modify-write one workspace record, touching `updatedAt`.
    /// A corrupt file is replaced by a fresh state.
    pub fn update<T>(
        &self,
        path: &Path,
        f: impl FnOnce(&mut WorkspaceProtocolState, DateTime<Utc>) -> T,
    ) -> Result<T> {
        let mut state = self.load();
        let now = Utc::now();
        let record = state.entry(path, now);
        let out = f(record, now);
        record.updated_at = now;
        self.write(&state)?;
        Ok(out)
    }

    /// Snapshot of the record governing `path`
    pub fn lookup(&self, path: &Path) -> Option<WorkspaceProtocolState> {
        self.load().get(path).cloned()
    }

    fn update_quietly(
        &self,
        op: &'static str,
        path: &Path,
        f: impl FnOnce(&mut WorkspaceProtocolState, DateTime<Utc>),
    ) {
        if let Err(e) = self.update(path, f) {
            warn!(op, path = %path.display(), error = %e, "Failed to persist protocol state");
        }
    }

    pub fn mark_init_required(&self, path: &Path) {
        self.update_quietly("mark_init_required", path, |s, _| s.require_init = true);
    }

    pub fn clear_init_required(&self, path: &Path) {
        self.update_quietly("clear_init_required", path, |s, _| s.require_init = false);
    }

    pub fn is_init_required(&self, path: &Path) -> bool {
        self.lookup(path).is_some_and(|s| s.require_init)
    }

    pub fn mark_context_required(&self, path: &Path) {
        self.update_quietly("mark_context_required", path, |s, _| {
            s.require_context = true
        });
    }

    /// Clears the obligation and records the context retrieval time
    pub fn clear_context_required(&self, path: &Path) {
        self.update_quietly("clear_context_required", path, |s, now| {
            s.require_context = false;
            s.last_context_at = Some(now);
        });
    }

    pub fn is_context_required(&self, path: &Path) -> bool {
        self.lookup(path).is_some_and(|s| s.require_context)
    }

    /// Record that a write/execute-class tool ran
    pub fn mark_state_changed(&self, path: &Path) {
        self.update_quietly("mark_state_changed", path, |s, now| {
            s.last_state_change_at = Some(now)
        });
    }

    pub fn is_context_fresh_and_clean(&self, path: &Path, max_age_secs: u64) -> bool {
        self.lookup(path)
            .is_some_and(|s| s.is_context_fresh_and_clean(max_age_secs, Utc::now()))
    }

    /// Arm obligations for a new user message: context always, init when
    /// `session_id` differs from the stored one. Returns whether init is owed.
    pub fn arm_for_prompt(&self, path: &Path, session_id: Option<&str>) -> Result<bool> {
        self.update(path, |s, _| {
            s.require_context = true;
            if let Some(id) = session_id
                && s.session_id.as_deref() != Some(id)
            {
                s.require_init = true;
                s.session_id = Some(id.to_string());
            }
            s.require_init
        })
    }

    /// Remove records idle longer than `max_age_secs`; returns the count
    pub fn try_cleanup_stale(&self, max_age_secs: u64) -> Result<usize> {
        self.cleanup_stale_at(max_age_secs, Utc::now())
    }

    fn cleanup_stale_at(&self, max_age_secs: u64, now: DateTime<Utc>) -> Result<usize> {
        let mut state = match self.read() {
            Ok(state) => state,
            Err(GateError::CorruptState { .. }) => {
                // Nothing salvageable; start over
                self.write(&PromptState::default())?;
                return Ok(0);
            }
            Err(e) => return Err(e),
        };
        let removed = state.prune(max_age_secs, now);
        if removed > 0 {
            debug!(removed, "Pruned stale protocol records");
            self.write(&state)?;
        }
        Ok(removed)
    }

    pub fn cleanup_stale(&self, max_age_secs: u64) {
        if let Err(e) = self.try_cleanup_stale(max_age_secs) {
            warn!(error = %e, "Protocol state cleanup failed");
        }
    }
}

/// Seconds as a duration, saturating at `Duration::MAX`
fn secs(n: u64) -> Duration {
    i64::try_from(n)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
