//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quire_outline::{FrontMatterError, ThresholdError};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Page not found at the given path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Front matter could not be parsed.
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[from] FrontMatterError),

    /// Heading level setting out of range.
    #[error("{0}")]
    Threshold(#[from] ThresholdError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::FrontMatter(_) | Self::Threshold(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": self.to_string()}),
            ),
            Self::Io(e) => {
                tracing::error!(error = %e, "I/O error while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
