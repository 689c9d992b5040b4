//! Root handler and fallback.

use axum::http::Uri;

use crate::error::ApiError;

/// GET / — plain-text acknowledgement of the served path.
#[tracing::instrument]
pub async fn index(uri: Uri) -> String {
    format!("Processing URL {}...", uri.path())
}

/// Any unmatched route.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
