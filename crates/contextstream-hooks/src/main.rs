// crates/contextstream-hooks/src/main.rs
// ContextStream hooks - tool invocation gate for AI coding assistants

use anyhow::Result;
use clap::Parser;
use contextstream_hooks::adapter;
use contextstream_hooks::cli::{Cli, Commands, HookAction, run_status};
use contextstream_hooks::config::{ConfigPaths, EnvConfig};
use contextstream_hooks::hooks::{self, HookContext, write_hook_output};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::FmtSubscriber;

/// Hooks log to the side debug log only; stdout belongs to the editor.
fn init_hook_logging(env: &EnvConfig, paths: &ConfigPaths) {
    if std::fs::create_dir_all(&paths.dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.debug_log)
    else {
        return;
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(env.log_level)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn init_cli_logging(env: &EnvConfig) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(env.log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run_hook(action: HookAction) {
    let env = EnvConfig::from_env();
    let ctx = HookContext::from_env(env);
    init_hook_logging(&ctx.env, &ctx.paths);

    let editor = action.editor();
    let result = match action {
        HookAction::PreTool { .. } => hooks::pre_tool::run(editor, &ctx),
        HookAction::UserPrompt { .. } => hooks::user_prompt::run(editor, &ctx),
    };
    if let Err(e) = result {
        tracing::warn!("Hook failed, allowing: {:#}", e);
        write_hook_output(&adapter::default_allow(editor));
    }
}

fn main() -> Result<()> {
    // Extra env vars from the config dir; real environment wins
    let pre_env = EnvConfig::from_env();
    let _ = dotenvy::from_path(ConfigPaths::resolve(&pre_env).dotenv);

    let cli = Cli::parse();

    match cli.command {
        Commands::Hook { action } => {
            // Always exit 0 so a broken hook never surfaces in the editor
            run_hook(action);
            Ok(())
        }
        Commands::Status { path } => {
            init_cli_logging(&EnvConfig::from_env())?;
            run_status(path)
        }
    }
}
