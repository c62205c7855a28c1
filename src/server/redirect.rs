use crate::db::normalize_path;
use crate::error::CatalogError;
use crate::server::router::AppState;
use crate::server::routes::api_not_found;
use axum::{
    extract::State,
    http::{StatusCode, Uri, header::LOCATION},
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Last stop for anything not served as an asset or by the API.
pub async fn redirect_lookup(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, CatalogError> {
    // The nested API router does not see `/api/` itself.
    if is_api_path(uri.path()) {
        return Ok(api_not_found().await.into_response());
    }

    let raw = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let key = normalize_path(raw);

    match state.db.redirects().get_by_path(key).await? {
        Some(redirect) => {
            debug!(path = %key, target = %redirect.url(), "redirect hit");
            Ok((
                StatusCode::MOVED_PERMANENTLY,
                [(LOCATION, redirect.url().to_string())],
            )
                .into_response())
        }
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
