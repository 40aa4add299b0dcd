// crates/contextstream-hooks/src/config/ignore.rs
// Paths that are never indexed remotely, so local discovery stays allowed

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::{debug, warn};

/// Patterns skipped by the remote indexer for every project, in gitignore
/// syntax. Entries ending in `/` name directories.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git/",
    ".svn/",
    ".hg/",
    // Dependencies
    "node_modules/",
    "vendor/",
    ".pnpm/",
    // Build outputs
    "target/",
    "dist/",
    "build/",
    "out/",
    ".next/",
    ".nuxt/",
    // Python
    "__pycache__/",
    ".pytest_cache/",
    ".mypy_cache/",
    "venv/",
    ".venv/",
    "env/",
    ".env/",
    // IDE
    ".idea/",
    ".vscode/",
    ".vs/",
    // Coverage
    "coverage/",
    ".coverage/",
    // Lock files
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
    "Gemfile.lock",
    "composer.lock",
    // OS files
    ".DS_Store",
    "Thumbs.db",
];

/// Project-specific ignore file, relative to the project root
pub const PROJECT_IGNORE_FILE: &str = ".contextstream/ignore";

/// Default patterns plus the project's `.contextstream/ignore` entries.
/// Empty lines and `#` comments are skipped.
pub fn load_ignore_patterns(project_root: &Path) -> Vec<String> {
    let mut patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect();

    if let Ok(content) = std::fs::read_to_string(project_root.join(PROJECT_IGNORE_FILE)) {
        patterns.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    patterns
}

/// Gitignore matcher over `patterns`, rooted at the project.
/// Lines the matcher rejects are skipped.
pub fn build_matcher(project_root: &Path, patterns: &[String]) -> Gitignore {
    let mut builder = GitignoreBuilder::new(project_root);
    for pattern in patterns {
        if let Err(e) = builder.add_line(None, pattern) {
            debug!(pattern = %pattern, error = %e, "Skipping invalid ignore pattern");
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Ignore patterns unusable, nothing is ignored");
        Gitignore::empty()
    })
}

/// Check if `path`, or any directory above it inside `project_root`, is
/// ignored. Relative paths are taken from `project_root`; paths outside it
/// are never ignored.
///
/// Anything that is not an existing file is matched as a directory, since
/// discovery targets are search scopes.
pub fn is_path_ignored(path: &Path, patterns: &[String], project_root: &Path) -> bool {
    let target = if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    };
    let Ok(rel) = target.strip_prefix(project_root) else {
        return false;
    };
    if rel.as_os_str().is_empty() {
        return false;
    }
    build_matcher(project_root, patterns)
        .matched_path_or_any_parents(rel, !target.is_file())
        .is_ignore()
}
