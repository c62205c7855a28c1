use super::extract::ValidJson;
use crate::db::{NewRedirect, Redirect, normalize_path};
use crate::error::{CatalogError, Validate, ValidationErrors};
use crate::server::router::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectPatch {
    pub url: String,
}

impl Validate for RedirectPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !self.url.starts_with('/') {
            errors.check_url(&["url"], &self.url);
        }
        errors.into_result()
    }
}

async fn load_redirect(state: &AppState, raw: &str) -> Result<Redirect, CatalogError> {
    let path = normalize_path(raw);
    state
        .db
        .redirects()
        .get_by_path(path)
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("Redirect '{path}' not found.")))
}

pub(crate) async fn list_redirects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Redirect>>, CatalogError> {
    Ok(Json(state.db.redirects().list().await?))
}

pub(crate) async fn create_redirect(
    State(state): State<AppState>,
    ValidJson(new): ValidJson<NewRedirect>,
) -> Result<Response, CatalogError> {
    let store = state.db.redirects();
    let path = normalize_path(&new.path);
    if store.get_by_path(path).await?.is_some() {
        return Err(ValidationErrors::single(
            "duplicate",
            &["path"],
            format!("A redirect for '{path}' already exists."),
        )
        .into());
    }

    let created = store.create(new).await?;
    info!(path = %created.path(), url = %created.url(), "redirect created");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub(crate) async fn update_redirect(
    State(state): State<AppState>,
    Path(path): Path<String>,
    ValidJson(patch): ValidJson<RedirectPatch>,
) -> Result<Json<Redirect>, CatalogError> {
    let mut redirect = load_redirect(&state, &path).await?;
    redirect.set_url(&patch.url).await?;
    Ok(Json(redirect))
}

pub(crate) async fn delete_redirect(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<StatusCode, CatalogError> {
    let redirect = load_redirect(&state, &path).await?;
    redirect.delete().await?;
    info!(path = %redirect.path(), "redirect deleted");
    Ok(StatusCode::NO_CONTENT)
}
