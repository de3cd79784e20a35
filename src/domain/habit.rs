/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a recurring
/// task the user wants to track, along with its validation rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, Frequency, HabitId, HabitKind};

/// A habit represents something the user wants to do regularly
///
/// Each habit has a name, a kind (boolean or numerical with a target), a
/// recurrence rule, and a creation timestamp before which it is never due.
/// Inactive habits keep their history but drop out of every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Drink water")
    pub name: String,
    /// Boolean, or numerical with a target and unit
    pub kind: HabitKind,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Whether this habit is currently active
    pub is_active: bool,
}

impl Habit {
    /// Create a new active habit with validation
    ///
    /// A fresh id is generated and the creation time is set to now.
    pub fn new(name: String, kind: HabitKind, frequency: Frequency) -> Result<Self, DomainError> {
        let habit = Self {
            id: HabitId::new(),
            name,
            kind,
            frequency,
            created_at: Utc::now(),
            is_active: true,
        };
        habit.validate()?;
        Ok(habit)
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    pub fn from_existing(
        id: HabitId,
        name: String,
        kind: HabitKind,
        frequency: Frequency,
        created_at: DateTime<Utc>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            frequency,
            created_at,
            is_active,
        }
    }

    /// Override the creation timestamp, e.g. when importing older habits
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Apply a partial update, validating before anything changes
    pub fn update(
        &mut self,
        name: Option<String>,
        frequency: Option<Frequency>,
        is_active: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_freq) = frequency {
            new_freq.validate()?;
        }

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_frequency) = frequency {
            self.frequency = new_frequency;
        }
        if let Some(new_is_active) = is_active {
            self.is_active = new_is_active;
        }

        Ok(())
    }

    /// Check every field against the business rules
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Habit id cannot be empty".to_string(),
            });
        }
        Self::validate_name(&self.name)?;
        self.kind.validate()?;
        self.frequency.validate()?;
        Ok(())
    }

    /// The calendar day the habit was created on
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Target quantity for numerical habits
    pub fn target(&self) -> Option<f64> {
        match &self.kind {
            HabitKind::Numerical { target, .. } => Some(*target),
            HabitKind::Boolean => None,
        }
    }

    /// Unit label for numerical habits
    pub fn unit(&self) -> Option<&str> {
        match &self.kind {
            HabitKind::Numerical { unit, .. } => Some(unit),
            HabitKind::Boolean => None,
        }
    }

    /// Get a display string for the target (e.g., "8 glasses")
    pub fn target_display(&self) -> Option<String> {
        match &self.kind {
            HabitKind::Numerical { target, unit } => Some(format!("{} {}", target, unit)),
            HabitKind::Boolean => None,
        }
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }
}
