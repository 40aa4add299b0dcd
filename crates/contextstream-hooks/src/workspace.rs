// crates/contextstream-hooks/src/workspace.rs
// Workspace path normalization and project-root discovery

use std::path::{Path, PathBuf};

/// Marker directory that pins a project root explicitly
pub const PROJECT_MARKER: &str = ".contextstream";

/// Normalize a workspace path for use as a map key.
///
/// Existing paths are canonicalized (resolving symlinks such as macOS
/// `/var` -> `/private/var`). Missing paths keep their spelling with
/// trailing separators removed.
pub fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let raw = path.to_string_lossy();
    let trimmed = raw.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from(&*raw)
    } else {
        PathBuf::from(trimmed)
    }
}

/// Normalize a path given as a string key (as stored in the JSON files)
pub fn normalize_str(path: &str) -> PathBuf {
    normalize(Path::new(path))
}

/// True when `inner` is `outer` or lies beneath it (component-wise).
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    inner.starts_with(outer)
}

/// True when either path contains the other.
pub fn overlaps(a: &Path, b: &Path) -> bool {
    is_within(a, b) || is_within(b, a)
}

/// Find the project root for `start_path` by walking up to the nearest
/// directory that holds a `.contextstream/` directory or a `.git` entry.
///
/// `.contextstream/` wins over `.git` at the same level. Returns `None`
/// when neither marker is found before the filesystem root.
pub fn find_project_root(start_path: &Path) -> Option<PathBuf> {
    let mut current = normalize(start_path);
    if current.is_file() {
        current = current.parent()?.to_path_buf();
    }

    loop {
        if current.join(PROJECT_MARKER).is_dir() || current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Resolve `target` against `base` when it is relative.
pub fn resolve_against(base: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}
