/// Storage layer for persisting habit data
///
/// This module defines the storage interface for habits and their daily
/// entries, the error type every backend reports, and the atomic write
/// batch (`StorageOp`) that multi-collection changes go through.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Habit, HabitEntry, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage used before initialization")]
    NotInitialized,

    #[error("Duplicate key in {collection}: {key}")]
    DuplicateKey { collection: Collection, key: String },

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// The two logical collections the store keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Habits,
    Entries,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Habits => "habits",
            Collection::Entries => "habit_entries",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A single write against one collection
///
/// A batch of these is applied by `HabitStorage::transact`, which either
/// applies all of them or none.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageOp {
    /// Insert a habit; fails with `DuplicateKey` if the id exists
    InsertHabit(Habit),
    /// Insert or fully replace a habit by id
    PutHabit(Habit),
    /// Remove a habit by id (no-op when absent)
    DeleteHabit(HabitId),
    /// Insert or fully replace an entry by id
    PutEntry(HabitEntry),
    /// Remove every entry that references the habit
    DeleteEntriesForHabit(HabitId),
}

impl StorageOp {
    /// The collection this operation writes to
    pub fn collection(&self) -> Collection {
        match self {
            StorageOp::InsertHabit(_) | StorageOp::PutHabit(_) | StorageOp::DeleteHabit(_) => {
                Collection::Habits
            }
            StorageOp::PutEntry(_) | StorageOp::DeleteEntriesForHabit(_) => Collection::Entries,
        }
    }
}

/// Trait defining the storage interface for habits
///
/// Every operation other than `initialize` fails with
/// `StorageError::NotInitialized` until `initialize` has succeeded. Point
/// lookups report a miss as `None`, never as an error.
#[async_trait]
pub trait HabitStorage: Send + Sync {
    /// Open the underlying engine and create collections and indexes
    ///
    /// Safe to call more than once.
    async fn initialize(&self) -> Result<(), StorageError>;

    /// Apply a batch of writes as one all-or-nothing transaction
    async fn transact(&self, ops: Vec<StorageOp>) -> Result<(), StorageError>;

    /// Get every habit with `is_active == true`, in no particular order
    async fn get_active_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Get a habit by ID
    async fn get_habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, StorageError>;

    /// Get the entry for a (habit, day) pair
    async fn get_entry(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<HabitEntry>, StorageError>;

    /// Get every entry of a habit, in no particular order
    async fn get_entries_for_habit(&self, habit_id: &HabitId) -> Result<Vec<HabitEntry>, StorageError>;

    /// Get every entry for a day across all habits, in no particular order
    async fn get_entries_for_date(&self, date: NaiveDate) -> Result<Vec<HabitEntry>, StorageError>;

    /// Create a new habit; fails with `DuplicateKey` if the id is taken
    async fn add_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.transact(vec![StorageOp::InsertHabit(habit.clone())]).await
    }

    /// Replace a habit by id, inserting it if it does not exist yet
    async fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.transact(vec![StorageOp::PutHabit(habit.clone())]).await
    }

    /// Remove a habit together with all of its entries
    async fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        self.transact(vec![
            StorageOp::DeleteEntriesForHabit(habit_id.clone()),
            StorageOp::DeleteHabit(habit_id.clone()),
        ])
        .await
    }

    /// Insert or replace an entry keyed by its id
    ///
    /// This does not look the entry up by (habit, day). Callers updating a
    /// day that already has an entry must reuse that entry's id, otherwise
    /// the (habit, day) uniqueness check rejects the write.
    async fn add_entry(&self, entry: &HabitEntry) -> Result<(), StorageError> {
        self.transact(vec![StorageOp::PutEntry(entry.clone())]).await
    }
}
