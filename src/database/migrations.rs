//! Schema migrations for the popup bookmarks SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Top-level folders seeded under the store root, as `(id, title)`.
pub const SEEDED_ROOT_FOLDERS: [(&str, &str); 2] = [("1", "Bookmarks bar"), ("2", "Other bookmarks")];

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Bookmark tree and last used trees")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Seed store root and top-level folders")?;
    }

    Ok(())
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now(), description],
    )?;
    Ok(())
}

/// V1: bookmark tree (folders, bookmarks and separators share one table)
/// plus the persisted chain of last used folder ids.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            parent_id TEXT,
            title TEXT NOT NULL DEFAULT '',
            url TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            date_added INTEGER NOT NULL,
            date_group_modified INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_parent ON bookmarks(parent_id, position);

        CREATE TABLE IF NOT EXISTS last_used_trees (
            position INTEGER PRIMARY KEY,
            folder_id TEXT NOT NULL
        );
        ",
    )
}

/// V2: the store root and the top-level folders every profile has.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    let now = now();
    conn.execute(
        "INSERT OR IGNORE INTO bookmarks (id, parent_id, title, url, position, date_added, date_group_modified)
         VALUES ('0', NULL, '', NULL, 0, ?1, ?1)",
        rusqlite::params![now],
    )?;
    for (position, (id, title)) in SEEDED_ROOT_FOLDERS.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO bookmarks (id, parent_id, title, url, position, date_added, date_group_modified)
             VALUES (?1, '0', ?2, NULL, ?3, ?4, ?4)",
            rusqlite::params![id, title, position as i64, now],
        )?;
    }
    Ok(())
}
