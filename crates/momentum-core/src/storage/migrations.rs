//! Database schema migrations for momentum.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{info, warn};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "migrated database schema");
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

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
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

/// Migration v1: tasks, time blocks and the key-value store.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id             TEXT PRIMARY KEY,
            title          TEXT NOT NULL,
            deadline       TEXT NOT NULL,
            achievement    INTEGER NOT NULL,
            resistance     INTEGER NOT NULL,
            status         TEXT NOT NULL DEFAULT 'pending',
            created_at     TEXT,
            started_at     TEXT,
            completed_at   TEXT,
            rescheduled_to TEXT
        );

        CREATE TABLE IF NOT EXISTS time_blocks (
            id         TEXT PRIMARY KEY,
            date       TEXT NOT NULL,
            start_min  INTEGER NOT NULL,
            end_min    INTEGER NOT NULL,
            label      TEXT NOT NULL,
            block_type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: recurring flag on time blocks, lookup indexes.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "ALTER TABLE time_blocks ADD COLUMN recurring INTEGER NOT NULL DEFAULT 0;
         CREATE INDEX IF NOT EXISTS idx_time_blocks_date ON time_blocks(date, start_min);
         CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
         CREATE INDEX IF NOT EXISTS idx_tasks_completed_at ON tasks(completed_at);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        conn.execute(
            "INSERT INTO time_blocks (id, date, start_min, end_min, label, block_type)
             VALUES ('b1', '2026-03-02', 540, 660, 'Lecture', 'class')",
            [],
        )
        .unwrap();
        let recurring: i64 = conn
            .query_row("SELECT recurring FROM time_blocks WHERE id = 'b1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(recurring, 0);
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO time_blocks (id, date, start_min, end_min, label, block_type)
             VALUES ('old', '2026-03-02', 0, 60, 'x', 'class')",
            [],
        )
        .unwrap();
        assert_eq!(get_schema_version(&conn), 1);

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM time_blocks WHERE recurring = 0", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
