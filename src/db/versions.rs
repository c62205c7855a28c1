use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Database;
use super::models::DbVersion;
use crate::error::{CatalogError, Validate, ValidationErrors};

/// A reference from one version to another mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub version: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// A released version of a mod, backed by one `versions` row.
#[derive(Debug, Clone, Serialize)]
pub struct Version {
    #[serde(rename = "mod")]
    mod_id: String,
    id: String,
    name: String,
    url: String,
    changelog: Option<String>,
    dependencies: Vec<Dependency>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    db: Database,
}

/// Payload for [`super::Mod::add_version`]; the owning mod is implied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVersion {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Validate for NewVersion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_text(&["id"], &self.id, 64);
        errors.check_text(&["name"], &self.name, 128);
        errors.check_url(&["url"], &self.url);
        for (i, dep) in self.dependencies.iter().enumerate() {
            let mut dep_errors = ValidationErrors::new();
            dep_errors.check_slug(&["id"], &dep.id);
            dep_errors.check_text(&["version"], &dep.version, 64);
            let index = i.to_string();
            errors.nest(&["dependencies", index.as_str()], dep_errors);
        }
        errors.into_result()
    }
}

/// Anything that identifies a version within its mod.
pub trait VersionKey {
    fn version_key(&self) -> &str;
}

impl VersionKey for str {
    fn version_key(&self) -> &str {
        self
    }
}

impl VersionKey for String {
    fn version_key(&self) -> &str {
        self.as_str()
    }
}

impl VersionKey for Version {
    fn version_key(&self) -> &str {
        &self.id
    }
}

impl Version {
    /// Builds the wrapper, decoding the stored dependency list.
    pub fn from_row(row: DbVersion, db: Database) -> Result<Self, CatalogError> {
        let dependencies: Vec<Dependency> = serde_json::from_str(&row.dependencies)?;
        Ok(Self {
            mod_id: row.mod_id,
            id: row.id,
            name: row.name,
            url: row.url,
            changelog: row.changelog,
            dependencies,
            created_at: row.created_at,
            db,
        })
    }

    pub fn mod_id(&self) -> &str {
        &self.mod_id
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn changelog(&self) -> Option<&str> {
        self.changelog.as_deref()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn set_name(&mut self, name: &str) -> Result<(), CatalogError> {
        let new_name: String = sqlx::query_scalar(
            r#"UPDATE versions SET name = ? WHERE "mod" = ? AND id = ? AND name = ? RETURNING name"#,
        )
        .bind(name)
        .bind(&self.mod_id)
        .bind(&self.id)
        .bind(&self.name)
        .fetch_one(self.db.pool())
        .await?;

        self.name = new_name;
        Ok(())
    }

    pub async fn set_url(&mut self, url: &str) -> Result<(), CatalogError> {
        let new_url: String = sqlx::query_scalar(
            r#"UPDATE versions SET url = ? WHERE "mod" = ? AND id = ? AND url = ? RETURNING url"#,
        )
        .bind(url)
        .bind(&self.mod_id)
        .bind(&self.id)
        .bind(&self.url)
        .fetch_one(self.db.pool())
        .await?;

        self.url = new_url;
        Ok(())
    }

    pub async fn set_dependencies(
        &mut self,
        dependencies: Vec<Dependency>,
    ) -> Result<(), CatalogError> {
        let encoded = serde_json::to_string(&dependencies)?;
        let stored: String = sqlx::query_scalar(
            r#"UPDATE versions SET dependencies = ? WHERE "mod" = ? AND id = ? RETURNING dependencies"#,
        )
        .bind(encoded)
        .bind(&self.mod_id)
        .bind(&self.id)
        .fetch_one(self.db.pool())
        .await?;

        self.dependencies = serde_json::from_str(&stored)?;
        debug!(
            mod_id = %self.mod_id,
            version = %self.id,
            count = self.dependencies.len(),
            "version dependencies updated"
        );
        Ok(())
    }

    pub async fn delete(&self) -> Result<u64, CatalogError> {
        let res = sqlx::query(r#"DELETE FROM versions WHERE "mod" = ? AND id = ?"#)
            .bind(&self.mod_id)
            .bind(&self.id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected())
    }
}
