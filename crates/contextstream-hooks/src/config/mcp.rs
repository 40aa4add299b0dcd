// crates/contextstream-hooks/src/config/mcp.rs
// Remote API settings resolved from env vars and .mcp.json files

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const API_URL_VAR: &str = "CONTEXTSTREAM_API_URL";
pub const API_KEY_VAR: &str = "CONTEXTSTREAM_API_KEY";
pub const DEFAULT_API_URL: &str = "https://api.contextstream.io";

const MCP_FILE: &str = ".mcp.json";

/// Where a setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Env,
    ProjectMcp,
    HomeMcp,
    Default,
}

/// Resolved, immutable remote API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// A contextstream entry was found in some `.mcp.json`
    pub server_registered: bool,
    pub url_source: ConfigSource,
    pub key_source: Option<ConfigSource>,
}

impl ApiConfig {
    /// The remote service is set up for this user/project
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() || self.server_registered
    }
}

/// Partial settings produced by one lookup strategy
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Partial {
    api_url: Option<String>,
    api_key: Option<String>,
    server_registered: bool,
}

/// One step in the priority-ordered lookup
#[derive(Debug, Clone)]
pub enum LookupStrategy {
    /// Process environment
    Env,
    /// Nearest `.mcp.json` walking up from the start directory
    NearestMcpJson(PathBuf),
    /// `.mcp.json` in the home directory
    HomeMcpJson(PathBuf),
}

impl LookupStrategy {
    fn source(&self) -> ConfigSource {
        match self {
            LookupStrategy::Env => ConfigSource::Env,
            LookupStrategy::NearestMcpJson(_) => ConfigSource::ProjectMcp,
            LookupStrategy::HomeMcpJson(_) => ConfigSource::HomeMcp,
        }
    }

    fn lookup(&self, env: &dyn Fn(&str) -> Option<String>) -> Partial {
        match self {
            LookupStrategy::Env => Partial {
                api_url: non_empty(env(API_URL_VAR)),
                api_key: non_empty(env(API_KEY_VAR)),
                server_registered: false,
            },
            LookupStrategy::NearestMcpJson(start) => find_nearest_mcp_json(start)
                .map(|path| read_mcp_json(&path))
                .unwrap_or_default(),
            LookupStrategy::HomeMcpJson(home) => {
                let path = home.join(MCP_FILE);
                if path.is_file() {
                    read_mcp_json(&path)
                } else {
                    Partial::default()
                }
            }
        }
    }
}

/// Resolve settings for `start_dir` using the real environment and home dir
pub fn resolve_config(start_dir: &Path) -> ApiConfig {
    let mut strategies = vec![
        LookupStrategy::Env,
        LookupStrategy::NearestMcpJson(start_dir.to_path_buf()),
    ];
    if let Some(home) = dirs::home_dir() {
        strategies.push(LookupStrategy::HomeMcpJson(home));
    }
    resolve_with(&strategies, &|name: &str| std::env::var(name).ok())
}

/// Compose strategies in order; each field comes from the first strategy
/// that provides it.
pub fn resolve_with(
    strategies: &[LookupStrategy],
    env: &dyn Fn(&str) -> Option<String>,
) -> ApiConfig {
    let mut config = ApiConfig {
        api_url: DEFAULT_API_URL.to_string(),
        api_key: None,
        server_registered: false,
        url_source: ConfigSource::Default,
        key_source: None,
    };
    let mut url_found = false;

    for strategy in strategies {
        let partial = strategy.lookup(env);
        if !url_found && let Some(url) = partial.api_url {
            config.api_url = url;
            config.url_source = strategy.source();
            url_found = true;
        }
        if config.api_key.is_none() && let Some(key) = partial.api_key {
            config.api_key = Some(key);
            config.key_source = Some(strategy.source());
        }
        config.server_registered |= partial.server_registered;
    }

    debug!(
        url = %config.api_url,
        url_source = ?config.url_source,
        key_source = ?config.key_source,
        registered = config.server_registered,
        "Resolved API config"
    );
    config
}

#[derive(Debug, Deserialize)]
struct McpFile {
    #[serde(default, rename = "mcpServers")]
    mcp_servers: HashMap<String, McpServerEntry>,
}

#[derive(Debug, Deserialize)]
struct McpServerEntry {
    #[serde(default)]
    env: HashMap<String, String>,
}

fn find_nearest_mcp_json(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MCP_FILE))
        .find(|candidate| candidate.is_file())
}

fn read_mcp_json(path: &Path) -> Partial {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<McpFile>(&s).map_err(|e| e.to_string()));
    let file = match parsed {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable .mcp.json");
            return Partial::default();
        }
    };

    let Some(entry) = file
        .mcp_servers
        .iter()
        .find(|(name, _)| name.to_lowercase().contains("contextstream"))
        .map(|(_, entry)| entry)
    else {
        return Partial::default();
    };

    Partial {
        api_url: non_empty(entry.env.get(API_URL_VAR).cloned()),
        api_key: non_empty(entry.env.get(API_KEY_VAR).cloned()),
        server_registered: true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
