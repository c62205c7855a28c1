use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Database;
use super::models::{DbMod, DbVersion};
use super::versions::{NewVersion, Version, VersionKey};
use crate::error::{CatalogError, Validate, ValidationErrors};

const VERSION_COLUMNS: &str = r#""mod", id, name, url, changelog, dependencies, created_at"#;

/// A catalog entry backed by one `mods` row.
///
/// Mutators issue a single-row `UPDATE ... RETURNING` and adopt the returned
/// value. Nothing here is transactional across calls.
#[derive(Debug, Clone, Serialize)]
pub struct Mod {
    id: String,
    name: String,
    url: String,
    #[serde(skip)]
    db: Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMod {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Validate for NewMod {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_slug(&["id"], &self.id);
        errors.check_text(&["name"], &self.name, 128);
        errors.check_url(&["url"], &self.url);
        errors.into_result()
    }
}

impl Mod {
    pub fn from_row(row: DbMod, db: Database) -> Self {
        Self {
            id: row.id,
            name: row.name,
            url: row.url,
            db,
        }
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

    /// Renames the row. Versions follow through `ON UPDATE CASCADE`.
    pub async fn set_id(&mut self, id: &str) -> Result<(), CatalogError> {
        let new_id: String = sqlx::query_scalar("UPDATE mods SET id = ? WHERE id = ? RETURNING id")
            .bind(id)
            .bind(&self.id)
            .fetch_one(self.db.pool())
            .await?;

        debug!(old_id = %self.id, new_id = %new_id, "mod id updated");
        self.id = new_id;
        Ok(())
    }

    pub async fn set_name(&mut self, name: &str) -> Result<(), CatalogError> {
        let new_name: String = sqlx::query_scalar(
            "UPDATE mods SET name = ? WHERE id = ? AND name = ? RETURNING name",
        )
        .bind(name)
        .bind(&self.id)
        .bind(&self.name)
        .fetch_one(self.db.pool())
        .await?;

        debug!(id = %self.id, "mod name updated");
        self.name = new_name;
        Ok(())
    }

    pub async fn set_url(&mut self, url: &str) -> Result<(), CatalogError> {
        let new_url: String = sqlx::query_scalar(
            "UPDATE mods SET url = ? WHERE id = ? AND url = ? RETURNING url",
        )
        .bind(url)
        .bind(&self.id)
        .bind(&self.url)
        .fetch_one(self.db.pool())
        .await?;

        debug!(id = %self.id, "mod url updated");
        self.url = new_url;
        Ok(())
    }

    /// Deletes the row; returns the number of rows removed.
    pub async fn delete(&self) -> Result<u64, CatalogError> {
        let res = sqlx::query("DELETE FROM mods WHERE id = ?")
            .bind(&self.id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn versions(&self) -> Result<Vec<Version>, CatalogError> {
        let rows = sqlx::query_as::<_, DbVersion>(&format!(
            r#"SELECT {VERSION_COLUMNS} FROM versions WHERE "mod" = ? ORDER BY created_at, id"#
        ))
        .bind(&self.id)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter()
            .map(|row| Version::from_row(row, self.db.clone()))
            .collect()
    }

    pub async fn version(&self, id: &str) -> Result<Option<Version>, CatalogError> {
        let row = sqlx::query_as::<_, DbVersion>(&format!(
            r#"SELECT {VERSION_COLUMNS} FROM versions WHERE "mod" = ? AND id = ?"#
        ))
        .bind(&self.id)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|row| Version::from_row(row, self.db.clone()))
            .transpose()
    }

    /// Inserts a version owned by this mod.
    pub async fn add_version(&self, version: NewVersion) -> Result<Version, CatalogError> {
        let dependencies = serde_json::to_string(&version.dependencies)?;
        let row = sqlx::query_as::<_, DbVersion>(&format!(
            r#"
            INSERT INTO versions ("mod", id, name, url, changelog, dependencies, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(&self.id)
        .bind(&version.id)
        .bind(&version.name)
        .bind(&version.url)
        .bind(&version.changelog)
        .bind(dependencies)
        .bind(chrono::Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        debug!(mod_id = %self.id, version = %row.id, "version added");
        Version::from_row(row, self.db.clone())
    }

    /// Deletes one of this mod's versions, by id or by wrapper.
    pub async fn delete_version<V>(&self, version: &V) -> Result<u64, CatalogError>
    where
        V: VersionKey + ?Sized,
    {
        let res = sqlx::query(r#"DELETE FROM versions WHERE "mod" = ? AND id = ?"#)
            .bind(&self.id)
            .bind(version.version_key())
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected())
    }
}

/// Table-level access to `mods`.
#[derive(Debug, Clone)]
pub struct ModStore {
    db: Database,
}

impl ModStore {
    pub(super) fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Mod>, CatalogError> {
        let rows = sqlx::query_as::<_, DbMod>("SELECT id, name, url FROM mods ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Mod::from_row(row, self.db.clone()))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Mod>, CatalogError> {
        let row = sqlx::query_as::<_, DbMod>("SELECT id, name, url FROM mods WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| Mod::from_row(row, self.db.clone())))
    }

    pub async fn ids(&self) -> Result<Vec<String>, CatalogError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT id FROM mods ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;
        Ok(ids)
    }

    pub async fn create(&self, new: NewMod) -> Result<Mod, CatalogError> {
        let row = sqlx::query_as::<_, DbMod>(
            "INSERT INTO mods (id, name, url) VALUES (?, ?, ?) RETURNING id, name, url",
        )
        .bind(new.id)
        .bind(new.name)
        .bind(new.url)
        .fetch_one(self.db.pool())
        .await?;

        debug!(id = %row.id, "mod created");
        Ok(Mod::from_row(row, self.db.clone()))
    }
}
