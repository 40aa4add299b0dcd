// crates/contextstream-hooks/src/config/mod.rs
// Configuration and shared file locations

pub mod env;
pub mod file;
pub mod ignore;
pub mod mcp;

pub use env::EnvConfig;
pub use file::{GatePolicy, HooksConfig};
pub use mcp::{ApiConfig, resolve_config};

use std::path::{Path, PathBuf};

/// Per-user config directory name under $HOME
pub const CONFIG_DIR_NAME: &str = ".contextstream";

/// Locations of every file the hooks read or write
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub dir: PathBuf,
    /// Protocol obligations per workspace
    pub prompt_state: PathBuf,
    /// Written by the indexing subsystem, read-only here
    pub index_status: PathBuf,
    /// Optional gate policy overrides
    pub hooks_config: PathBuf,
    /// Side channel for diagnostics
    pub debug_log: PathBuf,
    /// Extra env vars loaded at startup
    pub dotenv: PathBuf,
}

impl ConfigPaths {
    /// All paths rooted at `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            prompt_state: dir.join("prompt-state.json"),
            index_status: dir.join("indexed-projects.json"),
            hooks_config: dir.join("hooks.toml"),
            debug_log: dir.join("hooks-debug.log"),
            dotenv: dir.join(".env"),
            dir,
        }
    }

    /// Resolve from the env override, falling back to `~/.contextstream`
    pub fn resolve(env: &EnvConfig) -> Self {
        if let Some(ref dir) = env.config_dir {
            return Self::in_dir(dir);
        }
        let home = dirs::home_dir().unwrap_or_else(|| {
            tracing::warn!("HOME directory not set, using current directory for hook state");
            PathBuf::from(".")
        });
        Self::in_dir(home.join(CONFIG_DIR_NAME))
    }
}
