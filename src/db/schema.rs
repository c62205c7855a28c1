//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `mods` table (one catalog entry per row, keyed by slug id)
/// - `versions` table (one (mod, id) per row, dependencies as JSON text)
/// - `redirects` table (normalized request path -> target URL)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Mods
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS mods (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL
);

-- ---------------------------------------------------------------------------
-- Versions (one (mod, id) per row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS versions (
    "mod" TEXT NOT NULL REFERENCES mods(id) ON UPDATE CASCADE ON DELETE CASCADE,
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    changelog TEXT NULL,
    dependencies TEXT NOT NULL DEFAULT '[]', -- JSON array
    created_at TEXT NOT NULL, -- RFC3339
    PRIMARY KEY ("mod", id)
);

CREATE INDEX IF NOT EXISTS idx_versions_mod ON versions("mod");

-- ---------------------------------------------------------------------------
-- Redirects (path stored without leading/trailing slash or query)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS redirects (
    path TEXT PRIMARY KEY NOT NULL,
    url TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);
"#;
