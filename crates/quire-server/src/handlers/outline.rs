//! Outline API endpoint.
//!
//! Reads a markdown page from the source directory and returns its heading
//! outline, resolved against the page's front matter and the server default.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use quire_outline::{HeadingContent, MarkdownDocument, OutlineNode, Threshold};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::to_url_path;
use crate::state::AppState;

/// Response for GET /api/outline/{path}.
#[derive(Debug, Serialize)]
pub(crate) struct OutlineResponse {
    /// URL path of the page.
    path: String,
    /// Title from front matter, falling back to the first heading.
    title: Option<String>,
    /// Effective heading level threshold.
    level: Threshold,
    /// Nested outline.
    outline: Vec<OutlineNode<HeadingContent>>,
    /// Headings grouped by level, document order within each level.
    flattened: Vec<HeadingContent>,
}

/// Handle GET /api/outline/ (root page).
pub(crate) async fn get_root_outline(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OutlineResponse>, ServerError> {
    build_response("", &state).map(Json)
}

/// Handle GET /api/outline/{path}.
pub(crate) async fn get_outline(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OutlineResponse>, ServerError> {
    build_response(&path, &state).map(Json)
}

fn build_response(path: &str, state: &AppState) -> Result<OutlineResponse, ServerError> {
    let source_path = resolve_source(&state.source_dir, path)
        .ok_or_else(|| ServerError::PageNotFound(path.to_owned()))?;
    let source = std::fs::read_to_string(&source_path)?;

    let document = MarkdownDocument::parse(&source)?;
    let threshold = document.threshold(state.gather_headings_level)?;
    let tree = document.outline(threshold);

    let flattened = tree.flatten().map(|node| node.content.clone()).collect();
    let title = document
        .front_matter
        .title
        .clone()
        .or_else(|| tree.roots().first().map(|node| node.content.text.clone()));

    tracing::debug!(
        path = %source_path.display(),
        level = %threshold,
        headings = tree.node_count(),
        "Built outline"
    );

    Ok(OutlineResponse {
        path: to_url_path(path),
        title,
        level: threshold,
        outline: tree.into_roots(),
        flattened,
    })
}

/// Map a URL path to a markdown file: `<path>.md`, then `<path>/index.md`.
///
/// Paths with `.` or `..` segments never resolve.
fn resolve_source(source_dir: &FsPath, path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_matches('/');
    if trimmed.split('/').any(|segment| segment == ".." || segment == ".") {
        return None;
    }
    let trimmed = trimmed.strip_suffix(".md").unwrap_or(trimmed);

    let candidates = if trimmed.is_empty() {
        vec![source_dir.join("index.md")]
    } else {
        vec![
            source_dir.join(format!("{trimmed}.md")),
            source_dir.join(trimmed).join("index.md"),
        ]
    };

    candidates.into_iter().find(|candidate| candidate.is_file())
}
