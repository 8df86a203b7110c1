//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use crate::live_reload::LiveReloadManager;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Documentation source directory.
    pub(crate) source_dir: PathBuf,
    /// Process-wide outline depth, overridden per document by front matter.
    pub(crate) gather_headings_level: Option<i64>,
    /// Live reload manager (if enabled).
    pub(crate) live_reload: Option<LiveReloadManager>,
}
