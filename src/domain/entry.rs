/// HabitEntry entity for tracking habit completions
///
/// This module defines the HabitEntry struct that records a habit's
/// completion status for one calendar day.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, EntryId, HabitId};

/// The record of a habit's completion status for one calendar day
///
/// At most one entry exists per (habit, day); the storage layer enforces
/// this with a unique index. An entry can exist with `completed == false`
/// after the user took a completion back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Which habit this entry is for
    pub habit_id: HabitId,
    /// Which calendar day this entry covers
    pub date: NaiveDate,
    /// Whether the habit was done on that day
    pub completed: bool,
    /// Amount achieved, for numerical habits
    pub value: Option<f64>,
    /// When the completion was recorded
    pub completed_at: Option<DateTime<Utc>>,
}

impl HabitEntry {
    /// Create a new completed entry with a fresh id
    pub fn completed(
        habit_id: HabitId,
        date: NaiveDate,
        value: Option<f64>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::validate_value(&value)?;

        Ok(Self {
            id: EntryId::new(),
            habit_id,
            date,
            completed: true,
            value,
            completed_at: Some(completed_at),
        })
    }

    /// Create an entry from existing data (used when loading from database)
    pub fn from_existing(
        id: EntryId,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        value: Option<f64>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            habit_id,
            date,
            completed,
            value,
            completed_at,
        }
    }

    /// Mark the entry as done, replacing any previous value
    pub fn mark_completed(
        &mut self,
        value: Option<f64>,
        completed_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        Self::validate_value(&value)?;

        self.completed = true;
        self.value = value;
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Take a completion back; the id and day stay the same
    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.value = None;
        self.completed_at = None;
    }

    /// Validate the optional value field
    fn validate_value(value: &Option<f64>) -> Result<(), DomainError> {
        if let Some(val) = value {
            if !val.is_finite() || *val < 0.0 {
                return Err(DomainError::InvalidValue {
                    message: format!("Value must be a non-negative number, got {}", val)
                });
            }
        }
        Ok(())
    }
}
