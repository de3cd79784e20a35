/// Public library interface for the habit tracker
///
/// This module exports the domain types, the storage layer and the habit
/// service that produces the list of habits needing attention today.

use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod service;

// Re-export public modules and types
pub use domain::*;
pub use storage::{Collection, HabitStorage, SqliteStorage, StorageError, StorageOp};
pub use storage::migrations::CURRENT_VERSION as SCHEMA_VERSION;
pub use service::{Clock, FixedClock, HabitService, HabitWithEntries, Observable, SystemClock};

/// Errors that can occur while driving the habit tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
