//! Database module: connection handle, schema and entity wrappers.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `mods.rs`, `versions.rs`, `redirects.rs`: row-backed wrappers and their stores

pub mod models;
pub mod mods;
pub mod redirects;
pub mod schema;
pub mod versions;

pub use models::{DbMod, DbRedirect, DbVersion};
pub use mods::{Mod, ModStore, NewMod};
pub use redirects::{NewRedirect, Redirect, RedirectStore, normalize_path};
pub use schema::SQLITE_INIT;
pub use versions::{Dependency, NewVersion, Version, VersionKey};

use crate::error::CatalogError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

/// Shared handle to the relational store. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if missing) the SQLite database and applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self, CatalogError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;

        apply_schema(&pool).await?;

        info!(database_url, "database initialized");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn mods(&self) -> ModStore {
        ModStore::new(self.clone())
    }

    pub fn redirects(&self) -> RedirectStore {
        RedirectStore::new(self.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CatalogError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
