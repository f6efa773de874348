//! Runtime configuration
//!
//! Everything is driven by environment variables; there is no config file.

use std::path::{Path, PathBuf};

/// Overrides the SQLite database location
pub const DATABASE_PATH_ENV: &str = "DIETLOG_DATABASE_PATH";

/// Default tracing directive when `RUST_LOG` is unset
pub const DEFAULT_LOG_DIRECTIVE: &str = "dietlog=info";

const DATA_DIR: &str = "data";
const DATABASE_FILE: &str = "dietlog.db";

/// Resolve the database path from the environment, falling back to
/// `<project root>/data/dietlog.db`.
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            default_database_path(&exe_dir)
        })
}

/// Build the default path relative to the directory holding the executable.
///
/// Binaries run out of `target/debug` or `target/release` store their data at
/// the project root rather than inside `target/`.
pub fn default_database_path(exe_dir: &Path) -> PathBuf {
    let mut root = exe_dir.to_path_buf();
    if root.ends_with("release") || root.ends_with("debug") {
        if let Some(project) = root.parent().and_then(Path::parent) {
            root = project.to_path_buf();
        }
    }

    root.join(DATA_DIR).join(DATABASE_FILE)
}
