// crates/contextstream-hooks/src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use tracing::{Level, debug, warn};

/// Master switch. `false` makes every hook fail completely open.
pub const HOOK_ENABLED_VAR: &str = "CONTEXTSTREAM_HOOK_ENABLED";
/// Controls the rules reminder injected on UserPromptSubmit.
pub const REMINDER_ENABLED_VAR: &str = "CONTEXTSTREAM_REMINDER_ENABLED";
/// Side debug log verbosity (error|warn|info|debug|trace).
pub const LOG_LEVEL_VAR: &str = "CONTEXTSTREAM_HOOK_LOG";
/// Override of the per-user config directory.
pub const CONFIG_DIR_VAR: &str = "CONTEXTSTREAM_CONFIG_DIR";

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Gate enabled (CONTEXTSTREAM_HOOK_ENABLED, default true)
    pub hook_enabled: bool,
    /// Reminder injection enabled (CONTEXTSTREAM_REMINDER_ENABLED, default true)
    pub reminder_enabled: bool,
    /// Log level for the side debug log (CONTEXTSTREAM_HOOK_LOG, default warn)
    pub log_level: Level,
    /// Config directory override (CONTEXTSTREAM_CONFIG_DIR)
    pub config_dir: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            hook_enabled: true,
            reminder_enabled: true,
            log_level: Level::WARN,
            config_dir: None,
        }
    }
}

impl EnvConfig {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_level = match lookup(LOG_LEVEL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<Level>().unwrap_or_else(|_| {
                warn!(value = %raw, "Unknown {}, using warn", LOG_LEVEL_VAR);
                Level::WARN
            }),
            None => defaults.log_level,
        };

        let config = Self {
            hook_enabled: parse_bool(lookup(HOOK_ENABLED_VAR).as_deref())
                .unwrap_or(defaults.hook_enabled),
            reminder_enabled: parse_bool(lookup(REMINDER_ENABLED_VAR).as_deref())
                .unwrap_or(defaults.reminder_enabled),
            log_level,
            config_dir: lookup(CONFIG_DIR_VAR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };
        debug!(?config, "Environment configuration loaded");
        config
    }
}

/// Parse a boolean flag value: 1/true/yes/on and 0/false/no/off
pub fn parse_bool(value: Option<&str>) -> Option<bool> {
    let value = value?.trim().to_lowercase();
    match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EnvConfig::from_lookup(lookup_from(&[]));
        assert!(config.hook_enabled);
        assert!(config.reminder_enabled);
        assert_eq!(config.log_level, Level::WARN);
        assert!(config.config_dir.is_none());
    }

    #[test]
    fn test_hook_disabled() {
        let config = EnvConfig::from_lookup(lookup_from(&[(HOOK_ENABLED_VAR, "false")]));
        assert!(!config.hook_enabled);
    }

    #[test]
    fn test_unrecognized_bool_keeps_default() {
        let config = EnvConfig::from_lookup(lookup_from(&[(HOOK_ENABLED_VAR, "maybe")]));
        assert!(config.hook_enabled);
    }

    #[test]
    fn test_log_level_parsing() {
        let config = EnvConfig::from_lookup(lookup_from(&[(LOG_LEVEL_VAR, "debug")]));
        assert_eq!(config.log_level, Level::DEBUG);

        let config = EnvConfig::from_lookup(lookup_from(&[(LOG_LEVEL_VAR, "loud")]));
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn test_config_dir_override() {
        let config = EnvConfig::from_lookup(lookup_from(&[(CONFIG_DIR_VAR, "/tmp/cs")]));
        assert_eq!(config.config_dir, Some(PathBuf::from("/tmp/cs")));
    }

    #[test]
    fn test_parse_bool_variants() {
        for v in ["1", "true", "YES", " on "] {
            assert_eq!(parse_bool(Some(v)), Some(true), "{v}");
        }
        for v in ["0", "false", "No", "off"] {
            assert_eq!(parse_bool(Some(v)), Some(false), "{v}");
        }
        assert_eq!(parse_bool(Some("")), None);
        assert_eq!(parse_bool(None), None);
    }
}
