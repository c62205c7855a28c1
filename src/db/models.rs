//! Rust structs mirroring DB rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbMod {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbVersion {
    #[sqlx(rename = "mod")]
    pub mod_id: String,
    pub id: String,
    pub name: String,
    pub url: String,
    pub changelog: Option<String>,
    /// JSON-encoded `Vec<Dependency>`.
    pub dependencies: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbRedirect {
    pub path: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
