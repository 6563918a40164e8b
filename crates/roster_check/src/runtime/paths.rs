//! Path normalization and display helpers.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize `path`, folding `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut has_root = false;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => {
                has_root = true;
                out.push(Path::new("/"));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_parent =
                    matches!(out.components().next_back(), Some(Component::ParentDir));
                if last_is_parent || (!out.pop() && !has_root) {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

/// Render `path` relative to `base` with `/` separators, walking up with `..` when needed.
///
/// Both inputs are normalized first. Paths on different roots fall back to the normalized
/// absolute form.
pub fn display_relative(base: &Path, path: &Path) -> String {
    let base = normalize_path(base);
    let path = normalize_path(path);

    if path.is_absolute() != base.is_absolute() {
        return to_posix(&path);
    }

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let shared = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if base.is_absolute() && shared == 0 {
        return to_posix(&path);
    }

    let mut segments: Vec<String> = base_parts[shared..].iter().map(|_| "..".to_string()).collect();
    segments.extend(path_parts[shared..].iter().filter_map(component_text));
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

fn to_posix(path: &Path) -> String {
    let parts: Vec<String> = path.components().filter_map(|c| component_text(&c)).collect();
    if path.has_root() {
        format!("/{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

fn component_text(component: &Component<'_>) -> Option<String> {
    match component {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        Component::CurDir => Some(".".to_string()),
        Component::ParentDir => Some("..".to_string()),
        Component::RootDir | Component::Prefix(_) => None,
    }
}
