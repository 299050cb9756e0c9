//! File utility functions

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Expand a path string to an absolute path.
///
/// - `~` and `~/path` resolve against the home directory
/// - relative paths and bare names resolve against the current directory
/// - absolute paths pass through unchanged
///
/// ```text
/// expand_path("~/.orderfact")   // -> /home/user/.orderfact
/// expand_path("data/processed") // -> /current/dir/data/processed
/// expand_path("/srv/orders")    // -> /srv/orders
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Staging path next to `path` used for write-then-rename replacement.
///
/// Lives in the same directory so the final rename never crosses filesystems.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("table"));
    name.push(".tmp");
    path.with_file_name(name)
}
