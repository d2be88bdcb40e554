//! Path helpers for config values and request-supplied session ids

use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Expand a user-supplied path to an absolute one.
///
/// `~` and `~/...` resolve against the home directory; relative paths resolve
/// against the current directory. Surrounding whitespace is ignored.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path {
        "" => PathBuf::from("."),
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        },
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Join `relative` onto `root` without touching the filesystem.
///
/// Returns `None` when the result would be `root` itself or lie outside it:
/// absolute paths, drive prefixes and `..` segments that climb past `root`.
/// Segments containing NUL are rejected as well.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) if part.as_encoded_bytes().contains(&0) => return None,
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.into_iter().fold(root.to_path_buf(), |acc, p| acc.join(p)))
}

/// Modification time in milliseconds since the Unix epoch (0 if unavailable)
pub fn modified_millis(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
