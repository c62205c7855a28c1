use crate::error::{CatalogError, ErrorBody};
use crate::server::router::AppState;
use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

pub mod extract;
pub mod forms;
pub mod mods;
pub mod redirects;
pub mod versions;

pub const API_NOT_FOUND_MESSAGE: &str = "The specified endpoint could not be found.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mods", get(mods::list_mods).post(mods::create_mod))
        .route(
            "/mods/{id}",
            get(mods::get_mod)
                .patch(mods::update_mod)
                .delete(mods::delete_mod),
        )
        .route(
            "/mods/{id}/versions",
            get(versions::list_versions).post(versions::create_version),
        )
        .route(
            "/mods/{id}/versions/{version}",
            get(versions::get_version)
                .patch(versions::update_version)
                .delete(versions::delete_version),
        )
        .route(
            "/redirects",
            get(redirects::list_redirects).post(redirects::create_redirect),
        )
        .route(
            "/redirects/{*path}",
            axum::routing::patch(redirects::update_redirect).delete(redirects::delete_redirect),
        )
        .route("/forms/{entity}", get(forms::form_definitions))
}

/// Catch-all for unmatched `/api/*` paths.
pub async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::one(API_NOT_FOUND_MESSAGE)),
    )
}

pub(crate) fn mod_not_found(id: &str) -> CatalogError {
    CatalogError::not_found(format!("Mod '{id}' not found."))
}
