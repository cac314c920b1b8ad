//! Database schema migrations for the harvester store.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);
    debug!(current_version, target = SCHEMA_VERSION, "checking schema version");

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: one table per local record kind.
///
/// Dates are RFC 3339 text; booleans are 0/1.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS alerts (
            remote_id     INTEGER PRIMARY KEY,
            content       TEXT NOT NULL DEFAULT '',
            countries     TEXT NOT NULL DEFAULT '',
            date_received TEXT,
            ignored       INTEGER NOT NULL DEFAULT 0,
            subject       TEXT NOT NULL DEFAULT '',
            uuid          TEXT NOT NULL DEFAULT '',
            source_id     INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS experts (
            remote_id    INTEGER PRIMARY KEY,
            name         TEXT NOT NULL DEFAULT '',
            title        TEXT NOT NULL DEFAULT '',
            country      TEXT NOT NULL DEFAULT '',
            country_code TEXT NOT NULL DEFAULT '',
            email        TEXT NOT NULL DEFAULT '',
            ministry     TEXT NOT NULL DEFAULT '',
            country_id   TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS news (
            remote_id    INTEGER PRIMARY KEY,
            source_id    INTEGER NOT NULL DEFAULT 0,
            title        TEXT NOT NULL DEFAULT '',
            url          TEXT NOT NULL DEFAULT '',
            country      TEXT NOT NULL DEFAULT '',
            country_code TEXT NOT NULL DEFAULT '',
            date         TEXT,
            source       TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS projects (
            remote_id   INTEGER PRIMARY KEY,
            name        TEXT NOT NULL DEFAULT '',
            acronym     TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            logo_url    TEXT NOT NULL DEFAULT '',
            url         TEXT NOT NULL DEFAULT '',
            active      INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_alerts_date_received ON alerts(date_received);
        CREATE INDEX IF NOT EXISTS idx_news_date ON news(date);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: document catalog entries.
///
/// The full descriptor is kept as JSON next to the columns the catalog
/// looks up directly.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS document_catalog (
            remote_id           INTEGER PRIMARY KEY,
            uuid                TEXT NOT NULL UNIQUE,
            title               TEXT,
            thumbnail_url       TEXT,
            original_format_url TEXT,
            descriptor          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        for table in ["alerts", "experts", "news", "projects", "document_catalog"] {
            assert!(table_exists(&conn, table), "missing table {table}");
        }
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn v1_database_is_upgraded() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 1);
        assert!(!table_exists(&conn, "document_catalog"));

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
        assert!(table_exists(&conn, "document_catalog"));
    }
}
