// crates/contextstream-hooks/src/cli/mod.rs
// CLI module for contextstream-hooks commands

use crate::adapter::Editor;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod status;

pub use status::run_status;

#[derive(Parser)]
#[command(name = "contextstream-hooks")]
#[command(about = "ContextStream tool gate for AI coding assistant hooks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Editor hook handlers (read JSON on stdin, write JSON on stdout)
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },

    /// Show resolved configuration and protocol state for a directory
    Status {
        /// Directory to inspect (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum HookAction {
    /// Handle PreToolUse hooks - enforce the session protocol, redirect discovery
    PreTool {
        /// Payload dialect (detected from the payload when omitted)
        #[arg(long, value_enum)]
        editor: Option<Editor>,
    },
    /// Handle UserPromptSubmit hooks - re-arm obligations, inject the reminder
    UserPrompt {
        /// Payload dialect (detected from the payload when omitted)
        #[arg(long, value_enum)]
        editor: Option<Editor>,
    },
}

impl HookAction {
    pub fn editor(&self) -> Option<Editor> {
        match self {
            HookAction::PreTool { editor } | HookAction::UserPrompt { editor } => *editor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hook_with_editor() {
        let cli = Cli::try_parse_from(["contextstream-hooks", "hook", "pre-tool", "--editor", "cline"])
            .unwrap();
        match cli.command {
            Commands::Hook { action } => {
                assert!(matches!(action, HookAction::PreTool { .. }));
                assert_eq!(action.editor(), Some(Editor::Cline));
            }
            _ => panic!("expected hook command"),
        }
    }

    #[test]
    fn test_parse_claude_editor_name() {
        let cli = Cli::try_parse_from([
            "contextstream-hooks",
            "hook",
            "user-prompt",
            "--editor",
            "claude",
        ])
        .unwrap();
        match cli.command {
            Commands::Hook { action } => assert_eq!(action.editor(), Some(Editor::ClaudeCode)),
            _ => panic!("expected hook command"),
        }
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["contextstream-hooks", "status", "--path", "/tmp"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { path: Some(_) }));
    }

    #[test]
    fn test_rejects_unknown_editor() {
        assert!(
            Cli::try_parse_from(["contextstream-hooks", "hook", "pre-tool", "--editor", "vim"])
                .is_err()
        );
    }
}
