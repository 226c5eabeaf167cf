//! Filesystem path helpers for filename templates.

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` or `~/` to the user's home directory. Other
/// users' homes (`~name`) are not resolved. If the home directory is
/// unknown the input is returned unchanged.
pub(crate) fn expand_tilde(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

/// Lexically normalize a path: collapse `.` components and fold `..`
/// into the preceding component where one exists. No filesystem access;
/// symlinks are not chased.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {
                    // "/.." is "/".
                }
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// The process working directory, or `.` if it cannot be determined.
pub(crate) fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
