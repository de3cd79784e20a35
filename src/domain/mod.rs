/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitEntry), the calendar
/// and recurrence helpers, and the status engine that turns a habit plus its
/// entry history into due/overdue/streak facts.

pub mod habit;
pub mod entry;
pub mod dates;
pub mod status;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use entry::*;
pub use dates::*;
pub use status::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
