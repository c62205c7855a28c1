use super::extract::ValidJson;
use super::mod_not_found;
use crate::db::{Mod, NewMod};
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

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModPatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Validate for ModPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(id) = &self.id {
            errors.check_slug(&["id"], id);
        }
        if let Some(name) = &self.name {
            errors.check_text(&["name"], name, 128);
        }
        if let Some(url) = &self.url {
            errors.check_url(&["url"], url);
        }
        errors.into_result()
    }
}

fn duplicate_id(id: &str) -> CatalogError {
    ValidationErrors::single("duplicate", &["id"], format!("A mod with id '{id}' already exists."))
        .into()
}

pub(super) async fn load_mod(state: &AppState, id: &str) -> Result<Mod, CatalogError> {
    state
        .db
        .mods()
        .get(id)
        .await?
        .ok_or_else(|| mod_not_found(id))
}

pub(crate) async fn list_mods(State(state): State<AppState>) -> Result<Json<Vec<Mod>>, CatalogError> {
    Ok(Json(state.db.mods().list().await?))
}

pub(crate) async fn create_mod(
    State(state): State<AppState>,
    ValidJson(new): ValidJson<NewMod>,
) -> Result<Response, CatalogError> {
    let store = state.db.mods();
    if store.get(&new.id).await?.is_some() {
        return Err(duplicate_id(&new.id));
    }

    let created = store.create(new).await?;
    info!(id = %created.id(), "mod created");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub(crate) async fn get_mod(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Mod>, CatalogError> {
    Ok(Json(load_mod(&state, &id).await?))
}

pub(crate) async fn update_mod(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<ModPatch>,
) -> Result<Json<Mod>, CatalogError> {
    let mut entry = load_mod(&state, &id).await?;

    if let Some(new_id) = patch.id.as_deref()
        && new_id != entry.id()
        && state.db.mods().get(new_id).await?.is_some()
    {
        return Err(duplicate_id(new_id));
    }

    if let Some(name) = patch.name.as_deref() {
        entry.set_name(name).await?;
    }
    if let Some(url) = patch.url.as_deref() {
        entry.set_url(url).await?;
    }
    if let Some(new_id) = patch.id.as_deref()
        && new_id != entry.id()
    {
        entry.set_id(new_id).await?;
        info!(old_id = %id, new_id = %new_id, "mod renamed");
    }

    Ok(Json(entry))
}

pub(crate) async fn delete_mod(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CatalogError> {
    let entry = load_mod(&state, &id).await?;
    entry.delete().await?;
    info!(id = %id, "mod deleted");
    Ok(StatusCode::NO_CONTENT)
}
