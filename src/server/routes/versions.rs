use super::extract::ValidJson;
use super::mods::load_mod;
use crate::db::{Dependency, NewVersion, Version};
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub dependencies: Option<Vec<Dependency>>,
}

impl Validate for VersionPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check_text(&["name"], name, 128);
        }
        if let Some(url) = &self.url {
            errors.check_url(&["url"], url);
        }
        for (i, dep) in self.dependencies.iter().flatten().enumerate() {
            let mut dep_errors = ValidationErrors::new();
            dep_errors.check_slug(&["id"], &dep.id);
            dep_errors.check_text(&["version"], &dep.version, 64);
            let index = i.to_string();
            errors.nest(&["dependencies", index.as_str()], dep_errors);
        }
        errors.into_result()
    }
}

fn version_not_found(mod_id: &str, version: &str) -> CatalogError {
    CatalogError::not_found(format!("Version '{version}' of mod '{mod_id}' not found."))
}

pub(crate) async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Version>>, CatalogError> {
    let entry = load_mod(&state, &id).await?;
    Ok(Json(entry.versions().await?))
}

pub(crate) async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(new): ValidJson<NewVersion>,
) -> Result<Response, CatalogError> {
    let entry = load_mod(&state, &id).await?;
    if entry.version(&new.id).await?.is_some() {
        return Err(ValidationErrors::single(
            "duplicate",
            &["id"],
            format!("Version '{}' already exists for mod '{id}'.", new.id),
        )
        .into());
    }

    let version = entry.add_version(new).await?;
    info!(mod_id = %id, version = %version.id(), "version created");
    Ok((StatusCode::CREATED, Json(version)).into_response())
}

pub(crate) async fn get_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
) -> Result<Json<Version>, CatalogError> {
    let entry = load_mod(&state, &id).await?;
    entry
        .version(&version)
        .await?
        .map(Json)
        .ok_or_else(|| version_not_found(&id, &version))
}

pub(crate) async fn update_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
    ValidJson(patch): ValidJson<VersionPatch>,
) -> Result<Json<Version>, CatalogError> {
    let entry = load_mod(&state, &id).await?;
    let mut current = entry
        .version(&version)
        .await?
        .ok_or_else(|| version_not_found(&id, &version))?;

    if let Some(name) = patch.name.as_deref() {
        current.set_name(name).await?;
    }
    if let Some(url) = patch.url.as_deref() {
        current.set_url(url).await?;
    }
    if let Some(dependencies) = patch.dependencies {
        current.set_dependencies(dependencies).await?;
    }

    Ok(Json(current))
}

pub(crate) async fn delete_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
) -> Result<StatusCode, CatalogError> {
    let entry = load_mod(&state, &id).await?;
    match entry.delete_version(version.as_str()).await? {
        0 => Err(version_not_found(&id, &version)),
        _ => {
            info!(mod_id = %id, version = %version, "version deleted");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}
