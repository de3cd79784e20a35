/// Database migration management
///
/// This module creates and upgrades the SQLite schema. Each schema version
/// is reached through an explicit migration step that runs when the stored
/// version is older than `CURRENT_VERSION`.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
pub const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist and
/// records the schema version. Running it on an up-to-date database is a
/// no-op.
pub fn initialize_database(conn: &mut Connection) -> Result<(), StorageError> {
    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current_version, CURRENT_VERSION
        )));
    }

    if current_version < CURRENT_VERSION {
        let tx = conn.transaction()?;
        run_migrations(&tx, current_version)?;
        set_version(&tx, CURRENT_VERSION)?;
        tx.commit()?;
    }

    Ok(())
}

/// Get the current database schema version
pub fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })?
        .unwrap_or(0);

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    Ok(())
}

/// Migration to version 1: Create initial tables
///
/// Entries deliberately carry no foreign key to habits; deleting a habit
/// removes its entries through an explicit transaction instead.
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            target REAL,
            unit TEXT,
            frequency TEXT NOT NULL,
            created_at TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS habit_entries (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL,
            date TEXT NOT NULL,
            completed BOOLEAN NOT NULL,
            value REAL,
            completed_at TEXT
        )",
        [],
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    // Index for filtering active habits
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_active
         ON habits (is_active)",
        [],
    )?;

    // One-to-many lookup of a habit's history
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habit_entries_habit
         ON habit_entries (habit_id)",
        [],
    )?;

    // Cross-habit lookup by day
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habit_entries_date
         ON habit_entries (date)",
        [],
    )?;

    // At most one entry per habit and day
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_habit_entries_habit_date
         ON habit_entries (habit_id, date)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}
