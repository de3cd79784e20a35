/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits and entries. It handles all SQL queries and data
/// conversion.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{format_date, EntryId, Habit, HabitEntry, HabitId, HabitKind, DATE_FORMAT};
use crate::storage::{migrations, Collection, HabitStorage, StorageError, StorageOp};

const HABIT_COLUMNS: &str = "id, name, kind, target, unit, frequency, created_at, is_active";
const ENTRY_COLUMNS: &str = "id, habit_id, date, completed, value, completed_at";

/// SQLite-based storage implementation
///
/// The connection is opened lazily by `initialize`. Until then the slot is
/// empty and every data operation reports `NotInitialized`.
pub struct SqliteStorage {
    db_path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStorage {
    /// Create a storage backed by the database file at `db_path`
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Some(db_path),
            conn: Mutex::new(None),
        }
    }

    /// Create a storage backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            db_path: None,
            conn: Mutex::new(None),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))
    }

    /// Run `f` against the open connection
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut guard = self.lock()?;
        let conn = guard.as_mut().ok_or(StorageError::NotInitialized)?;
        f(conn)
    }

    /// Open the database and make sure the engine can actually read it
    fn open(&self) -> Result<Connection, StorageError> {
        let conn = match &self.db_path {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        }
        .map_err(|e| StorageError::Unavailable(format!("Failed to open database: {}", e)))?;

        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StorageError::Unavailable(format!("Failed to read database: {}", e)))?;

        Ok(conn)
    }

    fn initialize_blocking(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.as_mut() {
            Some(conn) => migrations::initialize_database(conn)?,
            None => {
                // Only a fully migrated connection is installed
                let mut conn = self.open()?;
                migrations::initialize_database(&mut conn)?;
                *guard = Some(conn);
            }
        }

        match &self.db_path {
            Some(path) => tracing::info!("SQLite storage initialized at: {:?}", path),
            None => tracing::info!("SQLite storage initialized in memory"),
        }
        Ok(())
    }
}

fn invalid_column(index: usize, message: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, message.to_string(), Type::Text)
}

fn parse_timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_column(index, "Invalid datetime"))
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id: String = row.get(0)?;

    let kind_str: String = row.get(2)?;
    let kind = match kind_str.as_str() {
        "boolean" => HabitKind::Boolean,
        "numerical" => {
            let target: Option<f64> = row.get(3)?;
            let unit: Option<String> = row.get(4)?;
            match (target, unit) {
                (Some(target), Some(unit)) => HabitKind::Numerical { target, unit },
                _ => return Err(invalid_column(3, "Numerical habit without target and unit")),
            }
        }
        _ => return Err(invalid_column(2, "Invalid habit kind")),
    };

    let frequency_json: String = row.get(5)?;
    let frequency = serde_json::from_str(&frequency_json)
        .map_err(|_| invalid_column(5, "Invalid frequency"))?;

    let created_at_str: String = row.get(6)?;
    let created_at = parse_timestamp(6, &created_at_str)?;

    Ok(Habit::from_existing(
        HabitId::from(id),
        row.get(1)?, // name
        kind,
        frequency,
        created_at,
        row.get(7)?, // is_active
    ))
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<HabitEntry> {
    let id: String = row.get(0)?;
    let habit_id: String = row.get(1)?;

    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|_| invalid_column(2, "Invalid date"))?;

    let completed_at = match row.get::<_, Option<String>>(5)? {
        Some(value) => Some(parse_timestamp(5, &value)?),
        None => None,
    };

    Ok(HabitEntry::from_existing(
        EntryId::from(id),
        HabitId::from(habit_id),
        date,
        row.get(3)?, // completed
        row.get(4)?, // value
        completed_at,
    ))
}

/// Translate a uniqueness violation into `DuplicateKey`
fn map_write_error(err: rusqlite::Error, collection: Collection, key: String) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StorageError::DuplicateKey { collection, key }
        }
        other => StorageError::Query(other),
    }
}

fn write_habit(conn: &Connection, sql: &str, habit: &Habit) -> Result<(), StorageError> {
    let frequency_json = serde_json::to_string(&habit.frequency)?;

    conn.execute(
        sql,
        params![
            habit.id.as_str(),
            habit.name,
            habit.kind.as_str(),
            habit.target(),
            habit.unit(),
            frequency_json,
            habit.created_at.to_rfc3339(),
            habit.is_active
        ],
    )
    .map_err(|e| map_write_error(e, Collection::Habits, habit.id.to_string()))?;

    Ok(())
}

/// Apply one write inside an open transaction
fn apply_op(conn: &Connection, op: &StorageOp) -> Result<(), StorageError> {
    match op {
        StorageOp::InsertHabit(habit) => {
            write_habit(
                conn,
                "INSERT INTO habits (
                    id, name, kind, target, unit, frequency, created_at, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                habit,
            )?;
            tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        }
        StorageOp::PutHabit(habit) => {
            write_habit(
                conn,
                "INSERT INTO habits (
                    id, name, kind, target, unit, frequency, created_at, is_active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    kind = excluded.kind,
                    target = excluded.target,
                    unit = excluded.unit,
                    frequency = excluded.frequency,
                    created_at = excluded.created_at,
                    is_active = excluded.is_active",
                habit,
            )?;
            tracing::debug!("Stored habit: {} ({})", habit.name, habit.id);
        }
        StorageOp::DeleteHabit(habit_id) => {
            conn.execute("DELETE FROM habits WHERE id = ?1", params![habit_id.as_str()])?;
            tracing::debug!("Deleted habit: {}", habit_id);
        }
        StorageOp::PutEntry(entry) => {
            conn.execute(
                "INSERT INTO habit_entries (
                    id, habit_id, date, completed, value, completed_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    habit_id = excluded.habit_id,
                    date = excluded.date,
                    completed = excluded.completed,
                    value = excluded.value,
                    completed_at = excluded.completed_at",
                params![
                    entry.id.as_str(),
                    entry.habit_id.as_str(),
                    format_date(entry.date),
                    entry.completed,
                    entry.value,
                    entry.completed_at.map(|at| at.to_rfc3339())
                ],
            )
            .map_err(|e| {
                map_write_error(
                    e,
                    Collection::Entries,
                    format!("{}@{}", entry.habit_id, format_date(entry.date)),
                )
            })?;
            tracing::debug!("Stored habit entry: {} for habit {}", entry.id, entry.habit_id);
        }
        StorageOp::DeleteEntriesForHabit(habit_id) => {
            let removed = conn.execute(
                "DELETE FROM habit_entries WHERE habit_id = ?1",
                params![habit_id.as_str()],
            )?;
            tracing::debug!("Deleted {} entries of habit {}", removed, habit_id);
        }
    }
    Ok(())
}

#[async_trait]
impl HabitStorage for SqliteStorage {
    async fn initialize(&self) -> Result<(), StorageError> {
        self.initialize_blocking()
    }

    async fn transact(&self, ops: Vec<StorageOp>) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for op in &ops {
                apply_op(&tx, op)?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    async fn get_active_habits(&self) -> Result<Vec<Habit>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM habits WHERE is_active = 1",
                HABIT_COLUMNS
            ))?;
            let habits = stmt
                .query_map([], habit_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(habits)
        })
    }

    async fn get_habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, StorageError> {
        self.with_conn(|conn| {
            let habit = conn
                .query_row(
                    &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
                    params![habit_id.as_str()],
                    habit_from_row,
                )
                .optional()?;
            Ok(habit)
        })
    }

    async fn get_entry(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<HabitEntry>, StorageError> {
        self.with_conn(|conn| {
            let entry = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
                        ENTRY_COLUMNS
                    ),
                    params![habit_id.as_str(), format_date(date)],
                    entry_from_row,
                )
                .optional()?;
            Ok(entry)
        })
    }

    async fn get_entries_for_habit(&self, habit_id: &HabitId) -> Result<Vec<HabitEntry>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM habit_entries WHERE habit_id = ?1",
                ENTRY_COLUMNS
            ))?;
            let entries = stmt
                .query_map(params![habit_id.as_str()], entry_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
    }

    async fn get_entries_for_date(&self, date: NaiveDate) -> Result<Vec<HabitEntry>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM habit_entries WHERE date = ?1",
                ENTRY_COLUMNS
            ))?;
            let entries = stmt
                .query_map(params![format_date(date)], entry_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
    }
}
