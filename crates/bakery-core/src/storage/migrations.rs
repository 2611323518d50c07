//! Database schema migrations for the bakery store.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

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

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    tracing::debug!(version, "schema migrated");
    Ok(())
}

/// Migration v1: ingredients, recipes and bake history.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS ingredients (
            position            INTEGER NOT NULL,
            name                TEXT PRIMARY KEY,
            quantity            REAL NOT NULL,
            unit                TEXT NOT NULL,
            low_stock_threshold REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipes (
            position INTEGER NOT NULL,
            name     TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            recipe     TEXT NOT NULL REFERENCES recipes(name) ON DELETE CASCADE,
            position   INTEGER NOT NULL,
            ingredient TEXT NOT NULL,
            amount     REAL NOT NULL,
            unit       TEXT NOT NULL,
            PRIMARY KEY (recipe, ingredient)
        );

        CREATE TABLE IF NOT EXISTS history (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            item      TEXT NOT NULL,
            timestamp TEXT NOT NULL
        );",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: index history by timestamp for dashboard windows.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(timestamp);
         CREATE INDEX IF NOT EXISTS idx_history_item ON history(item);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
