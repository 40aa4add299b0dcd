// crates/contextstream-hooks/src/cli/status.rs
// `status` command: what the gate would see for a directory

use crate::config::{ApiConfig, ConfigPaths, EnvConfig, HooksConfig, resolve_config};
use crate::index_status::IndexStatusReader;
use crate::store::StateStore;
use crate::workspace;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Print the resolved configuration, protocol record and index entry
pub fn run_status(path: Option<PathBuf>) -> Result<()> {
    let dir = match path {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let env = EnvConfig::from_env();
    let paths = ConfigPaths::resolve(&env);
    let api = resolve_config(&dir);
    print!("{}", render_status(&dir, &env, &paths, &api)?);
    Ok(())
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}****")
}

pub(crate) fn render_status(
    dir: &Path,
    env: &EnvConfig,
    paths: &ConfigPaths,
    api: &ApiConfig,
) -> Result<String> {
    let workspace = workspace::normalize(dir);
    let policy = HooksConfig::load(&paths.hooks_config).gate;
    let mut out = String::new();

    writeln!(out, "Workspace:      {}", workspace.display())?;
    match workspace::find_project_root(&workspace) {
        Some(root) => writeln!(out, "Project root:   {}", root.display())?,
        None => writeln!(out, "Project root:   (none found)")?,
    }
    writeln!(out, "Gate enabled:   {}", env.hook_enabled)?;
    writeln!(out, "Reminder:       {}", env.reminder_enabled)?;

    writeln!(out, "\nRemote service")?;
    writeln!(out, "  configured:   {}", api.is_configured())?;
    writeln!(out, "  api url:      {} ({:?})", api.api_url, api.url_source)?;
    match (&api.api_key, api.key_source) {
        (Some(key), Some(source)) => {
            writeln!(out, "  api key:      {} ({:?})", mask_key(key), source)?
        }
        _ => writeln!(out, "  api key:      (not set)")?,
    }

    writeln!(out, "\nFiles")?;
    writeln!(out, "  state:        {}", paths.prompt_state.display())?;
    writeln!(out, "  index:        {}", paths.index_status.display())?;
    writeln!(out, "  policy:       {}", paths.hooks_config.display())?;
    writeln!(out, "  debug log:    {}", paths.debug_log.display())?;

    writeln!(out, "\nPolicy")?;
    writeln!(out, "  context window:   {}s", policy.context_fresh_window_secs)?;
    writeln!(out, "  state idle limit: {}s", policy.stale_state_secs)?;
    writeln!(out, "  index stale after: {} days", policy.index_stale_days)?;
    for (tool, actions) in &policy.read_only {
        writeln!(out, "  read-only {}: {}", tool, actions.join(", "))?;
    }

    writeln!(out, "\nProtocol state")?;
    match StateStore::new(&paths.prompt_state).read() {
        Ok(state) => match state.get(&workspace) {
            Some(record) => {
                writeln!(out, "  requireInit:     {}", record.require_init)?;
                writeln!(out, "  requireContext:  {}", record.require_context)?;
                if let Some(at) = record.last_context_at {
                    writeln!(out, "  lastContextAt:   {}", at.to_rfc3339())?;
                }
                if let Some(at) = record.last_state_change_at {
                    writeln!(out, "  lastStateChange: {}", at.to_rfc3339())?;
                }
                writeln!(out, "  updatedAt:       {}", record.updated_at.to_rfc3339())?;
            }
            None => writeln!(out, "  (no record)")?,
        },
        Err(e) => writeln!(out, "  unreadable: {e}")?,
    }

    writeln!(out, "\nIndex")?;
    match IndexStatusReader::new(&paths.index_status).find(&workspace) {
        Ok(Some(m)) => {
            writeln!(out, "  indexed root:  {}", m.root.display())?;
            if let Some(name) = &m.info.project_name {
                writeln!(out, "  project:       {name}")?;
            }
            match m.age_days() {
                Some(days) => writeln!(
                    out,
                    "  age:           {} days{}",
                    days,
                    if m.is_stale(policy.index_stale_days) {
                        " (stale)"
                    } else {
                        ""
                    }
                )?,
                None => writeln!(out, "  age:           unknown")?,
            }
        }
        Ok(None) => writeln!(out, "  not indexed (local discovery allowed)")?,
        Err(e) => writeln!(out, "  unreadable: {e}")?,
    }

    Ok(out)
}
