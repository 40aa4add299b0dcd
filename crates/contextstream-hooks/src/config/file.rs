// crates/contextstream-hooks/src/config/file.rs
// File-based gate policy from <config dir>/hooks.toml

use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Default freshness window for the narrow bypass
pub const DEFAULT_CONTEXT_FRESH_WINDOW_SECS: u64 = 120;

/// Protocol records idle longer than this are dropped by the gate
pub const DEFAULT_STALE_STATE_SECS: u64 = 180;

/// Index entries older than this many days get a re-index hint
pub const DEFAULT_INDEX_STALE_DAYS: u64 = 7;

/// Top-level config structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HooksConfig {
    #[serde(default)]
    pub gate: GatePolicy,
}

/// Tunables of the tool gate
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatePolicy {
    /// How recent a context call must be for the narrow bypass to apply
    pub context_fresh_window_secs: u64,
    /// Inactivity horizon for protocol-state cleanup
    pub stale_state_secs: u64,
    /// Age after which an indexed project is reported as stale
    pub index_stale_days: u64,
    /// Remote tool family -> actions that may run while context is owed.
    /// A `"*"` entry allows every action of that family.
    pub read_only: BTreeMap<String, Vec<String>>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            context_fresh_window_secs: DEFAULT_CONTEXT_FRESH_WINDOW_SECS,
            stale_state_secs: DEFAULT_STALE_STATE_SECS,
            index_stale_days: DEFAULT_INDEX_STALE_DAYS,
            read_only: default_read_only(),
        }
    }
}

fn default_read_only() -> BTreeMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        ("workspace", &["list", "get"]),
        ("session", &["get_lessons", "recall"]),
        ("help", &["version", "tools"]),
        ("project", &["list", "get", "index_status"]),
        ("memory", &["list_events", "get_event"]),
    ];
    entries
        .iter()
        .map(|(tool, actions)| {
            (
                tool.to_string(),
                actions.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

impl GatePolicy {
    /// Whether `tool` with `action` is a read-only query eligible for the
    /// narrow bypass.
    pub fn is_read_only(&self, tool: &str, action: Option<&str>) -> bool {
        let Some(actions) = self.read_only.get(&tool.to_lowercase()) else {
            return false;
        };
        if actions.iter().any(|a| a == "*") {
            return true;
        }
        match action {
            Some(action) => actions.iter().any(|a| a.eq_ignore_ascii_case(action)),
            None => false,
        }
    }
}

impl HooksConfig {
    /// Parse a hooks.toml document
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load config from `path`, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded hooks config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse hooks config");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Hooks config not found, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_policy() {
        let policy = GatePolicy::default();
        assert_eq!(policy.context_fresh_window_secs, 120);
        assert_eq!(policy.stale_state_secs, 180);
        assert_eq!(policy.index_stale_days, 7);
        assert!(policy.is_read_only("workspace", Some("list")));
        assert!(policy.is_read_only("help", Some("version")));
        assert!(policy.is_read_only("session", Some("get_lessons")));
    }

    #[test]
    fn test_read_only_rejects_writes_and_missing_action() {
        let policy = GatePolicy::default();
        assert!(!policy.is_read_only("session", Some("capture")));
        assert!(!policy.is_read_only("workspace", None));
        assert!(!policy.is_read_only("search", Some("list")));
    }

    #[test]
    fn test_read_only_wildcard() {
        let config = HooksConfig::parse(
            r#"
[gate.read_only]
help = ["*"]
"#,
        )
        .unwrap();
        assert!(config.gate.is_read_only("help", None));
        assert!(config.gate.is_read_only("help", Some("anything")));
        // Supplying the table replaces the defaults
        assert!(!config.gate.is_read_only("workspace", Some("list")));
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = HooksConfig::parse(
            r#"
[gate]
context_fresh_window_secs = 30
"#,
        )
        .unwrap();
        assert_eq!(config.gate.context_fresh_window_secs, 30);
        assert_eq!(config.gate.stale_state_secs, 180);
        assert!(config.gate.is_read_only("workspace", Some("list")));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = HooksConfig::parse("").unwrap();
        assert_eq!(config.gate.index_stale_days, 7);
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hooks.toml");
        std::fs::write(&path, "[gate\nbroken").unwrap();

        let config = HooksConfig::load(&path);
        assert_eq!(config.gate.context_fresh_window_secs, 120);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = HooksConfig::load(&temp_dir.path().join("nope.toml"));
        assert_eq!(config.gate.stale_state_secs, 180);
    }
}
