//! SQLite DDL for the search result cache.

use rusqlite::Connection;

/// Bump when the table layout changes.
pub(crate) const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
-- Readers never block on the writer.
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS search_cache (
    fingerprint TEXT PRIMARY KEY,
    results     TEXT NOT NULL,      -- JSON array of SearchResult
    providers   TEXT NOT NULL,      -- comma-joined provider slugs
    created_at  INTEGER NOT NULL    -- unix millis
);

CREATE INDEX IF NOT EXISTS idx_search_cache_created_at ON search_cache(created_at);
"#;

/// Apply the schema and seed the version stamp on a fresh database.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

/// `None` if the version row is missing or unparseable.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_meta WHERE key = 'schema_version'")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().ok())
        }
        None => Ok(None),
    }
}
