use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Database;
use super::models::DbRedirect;
use crate::error::{CatalogError, Validate, ValidationErrors};

/// Lookup key for a request target: no query string, no leading or trailing slash.
///
/// `/foo/`, `foo` and `/foo?x=1` all normalize to `foo`.
pub fn normalize_path(raw: &str) -> &str {
    let path = raw.split_once('?').map_or(raw, |(path, _)| path);
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

#[derive(Debug, Clone, Serialize)]
pub struct Redirect {
    path: String,
    url: String,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    db: Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRedirect {
    pub path: String,
    pub url: String,
}

impl Validate for NewRedirect {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if normalize_path(&self.path).is_empty() {
            errors.push("too_small", &["path"], "must not be empty");
        }
        // Site-relative targets are allowed as-is.
        if !self.url.starts_with('/') {
            errors.check_url(&["url"], &self.url);
        }
        errors.into_result()
    }
}

impl Redirect {
    pub fn from_row(row: DbRedirect, db: Database) -> Self {
        Self {
            path: row.path,
            url: row.url,
            created_at: row.created_at,
            db,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn set_url(&mut self, url: &str) -> Result<(), CatalogError> {
        let new_url: String = sqlx::query_scalar(
            "UPDATE redirects SET url = ? WHERE path = ? AND url = ? RETURNING url",
        )
        .bind(url)
        .bind(&self.path)
        .bind(&self.url)
        .fetch_one(self.db.pool())
        .await?;

        self.url = new_url;
        Ok(())
    }

    pub async fn delete(&self) -> Result<u64, CatalogError> {
        let res = sqlx::query("DELETE FROM redirects WHERE path = ?")
            .bind(&self.path)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected())
    }
}

/// Table-level access to `redirects`.
#[derive(Debug, Clone)]
pub struct RedirectStore {
    db: Database,
}

impl RedirectStore {
    pub(super) fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Redirect>, CatalogError> {
        let rows = sqlx::query_as::<_, DbRedirect>(
            "SELECT path, url, created_at FROM redirects ORDER BY path",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Redirect::from_row(row, self.db.clone()))
            .collect())
    }

    /// Exact lookup by an already-normalized path.
    pub async fn get_by_path(&self, path: &str) -> Result<Option<Redirect>, CatalogError> {
        let row = sqlx::query_as::<_, DbRedirect>(
            "SELECT path, url, created_at FROM redirects WHERE path = ?",
        )
        .bind(path)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| Redirect::from_row(row, self.db.clone())))
    }

    /// Stores a redirect under the normalized form of `new.path`.
    pub async fn create(&self, new: NewRedirect) -> Result<Redirect, CatalogError> {
        let path = normalize_path(&new.path).to_string();
        let row = sqlx::query_as::<_, DbRedirect>(
            "INSERT INTO redirects (path, url, created_at) VALUES (?, ?, ?) RETURNING path, url, created_at",
        )
        .bind(path)
        .bind(new.url)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        debug!(path = %row.path, url = %row.url, "redirect created");
        Ok(Redirect::from_row(row, self.db.clone()))
    }
}
