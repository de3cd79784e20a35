/// Core types and enums used throughout the domain layer
///
/// This module defines the identifier types, the habit kind (boolean or
/// numerical) and the recurrence rule that decides on which days a habit
/// is due.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::dates::weekday_index;
use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// Identifiers are opaque strings. New ones are random UUIDs, but anything
/// loaded from storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a habit entry
///
/// Similar to HabitId but for the per-day completion records. Keeping the
/// two apart means an entry id can never be passed where a habit id is
/// expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a new random entry ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of completion a habit records
///
/// Boolean habits are simply done or not done. Numerical habits carry a
/// target quantity and the unit it is measured in (e.g. 8 "glasses").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitKind {
    Boolean,
    Numerical { target: f64, unit: String },
}

impl HabitKind {
    /// Name used for the `kind` column in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitKind::Boolean => "boolean",
            HabitKind::Numerical { .. } => "numerical",
        }
    }

    /// Validate the target and unit of a numerical habit
    pub fn validate(&self) -> Result<(), DomainError> {
        if let HabitKind::Numerical { target, unit } = self {
            if !target.is_finite() || *target <= 0.0 {
                return Err(DomainError::InvalidValue {
                    message: format!("Target must be a positive number, got {}", target),
                });
            }

            let trimmed = unit.trim();
            if trimmed.is_empty() {
                return Err(DomainError::InvalidValue {
                    message: "Unit cannot be empty for a numerical habit".to_string(),
                });
            }
            if trimmed.len() > 20 {
                return Err(DomainError::InvalidValue {
                    message: "Unit cannot be longer than 20 characters".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// How often a habit should be performed
///
/// Weekday indices use Monday=0 through Sunday=6. Interval habits count
/// days from the creation day, which is itself day 0 and therefore due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    /// Every single day
    Daily,
    /// Specific days of the week (e.g., Monday, Wednesday, Friday)
    SpecificDays { days: Vec<u8> },
    /// Every N days counting from the creation day
    Interval {
        #[serde(rename = "value")]
        every: u32,
    },
    /// A number of times per week
    Weekly {
        #[serde(rename = "value")]
        times: u32,
    },
    /// A number of times per month
    Monthly {
        #[serde(rename = "value")]
        times: u32,
    },
}

impl Frequency {
    /// Validate that a frequency value is reasonable
    ///
    /// An empty day list is allowed: such a habit is simply never due.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Frequency::SpecificDays { days } => {
                if let Some(day) = days.iter().find(|day| **day > 6) {
                    return Err(DomainError::InvalidFrequency(format!(
                        "Weekday index must be 0 (Monday) to 6 (Sunday), got {}",
                        day
                    )));
                }
            }
            Frequency::Interval { every } => {
                if *every == 0 {
                    return Err(DomainError::InvalidFrequency(
                        "Interval must be at least 1 day".to_string(),
                    ));
                }
            }
            Frequency::Weekly { times } => {
                if *times == 0 || *times > 7 {
                    return Err(DomainError::InvalidFrequency(format!(
                        "Weekly frequency must be 1-7, got {}",
                        times
                    )));
                }
            }
            Frequency::Monthly { times } => {
                if *times == 0 || *times > 31 {
                    return Err(DomainError::InvalidFrequency(format!(
                        "Monthly frequency must be 1-31, got {}",
                        times
                    )));
                }
            }
            Frequency::Daily => {}
        }
        Ok(())
    }

    /// Check whether the rule asks for the habit on `date`
    ///
    /// `created_on` anchors interval counting. Callers are responsible for
    /// rejecting dates before creation.
    pub fn is_due(&self, created_on: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Frequency::Daily => true,
            Frequency::SpecificDays { days } => days.contains(&weekday_index(date)),
            Frequency::Interval { every } => {
                let days_since_created = (date - created_on).num_days();
                days_since_created.rem_euclid(i64::from((*every).max(1))) == 0
            }
            // Per-period counts are not tracked, so these are due every day.
            Frequency::Weekly { .. } | Frequency::Monthly { .. } => true,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => f.write_str("daily"),
            Frequency::SpecificDays { days } => {
                let list: Vec<String> = days.iter().map(|d| d.to_string()).collect();
                write!(f, "days:{}", list.join(","))
            }
            Frequency::Interval { every } => write!(f, "interval:{}", every),
            Frequency::Weekly { times } => write!(f, "weekly:{}", times),
            Frequency::Monthly { times } => write!(f, "monthly:{}", times),
        }
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    /// Parse the text form used on the command line
    ///
    /// Accepts `daily`, `weekdays`, `weekends`, `days:0,2,4`, `interval:N`,
    /// `weekly:N` and `monthly:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let (kind, arg) = match normalized.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim())),
            None => (normalized.as_str(), None),
        };

        let frequency = match (kind, arg) {
            ("daily", None) => Frequency::Daily,
            ("weekdays", None) => Frequency::SpecificDays { days: vec![0, 1, 2, 3, 4] },
            ("weekends", None) => Frequency::SpecificDays { days: vec![5, 6] },
            ("days", Some(list)) => {
                let days = list
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| parse_weekday(part, s))
                    .collect::<Result<Vec<u8>, _>>()?;
                Frequency::SpecificDays { days }
            }
            ("interval", Some(n)) => Frequency::Interval { every: parse_count(n, s)? },
            ("weekly", Some(n)) => Frequency::Weekly { times: parse_count(n, s)? },
            ("monthly", Some(n)) => Frequency::Monthly { times: parse_count(n, s)? },
            _ => {
                return Err(DomainError::InvalidFrequency(format!(
                    "Invalid frequency '{}'. Valid options: daily, weekdays, weekends, days:0,2,4, interval:N, weekly:N, monthly:N",
                    s
                )))
            }
        };

        frequency.validate()?;
        Ok(frequency)
    }
}

fn parse_weekday(value: &str, original: &str) -> Result<u8, DomainError> {
    let day = parse_count(value, original)?;
    u8::try_from(day).map_err(|_| {
        DomainError::InvalidFrequency(format!(
            "Weekday index must be 0 (Monday) to 6 (Sunday), got {}",
            day
        ))
    })
}

fn parse_count(value: &str, original: &str) -> Result<u32, DomainError> {
    value.parse::<u32>().map_err(|_| {
        DomainError::InvalidFrequency(format!("'{}' is not a valid number in '{}'", value, original))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_frequencies() {
        assert_eq!("daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!(
            " Days:0, 2,4 ".parse::<Frequency>().unwrap(),
            Frequency::SpecificDays { days: vec![0, 2, 4] }
        );
        assert_eq!(
            "weekends".parse::<Frequency>().unwrap(),
            Frequency::SpecificDays { days: vec![5, 6] }
        );
        assert_eq!("interval:3".parse::<Frequency>().unwrap(), Frequency::Interval { every: 3 });
        assert_eq!("weekly:2".parse::<Frequency>().unwrap(), Frequency::Weekly { times: 2 });
        assert_eq!("monthly:4".parse::<Frequency>().unwrap(), Frequency::Monthly { times: 4 });
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("hourly".parse::<Frequency>().is_err());
        assert!("interval:0".parse::<Frequency>().is_err());
        assert!("interval:x".parse::<Frequency>().is_err());
        assert!("days:7".parse::<Frequency>().is_err());
        assert!("weekly:8".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_out_of_range_weekday_reports_typed_value() {
        match "days:0,256".parse::<Frequency>() {
            Err(DomainError::InvalidFrequency(message)) => assert!(message.contains("got 256")),
            other => panic!("expected InvalidFrequency, got {:?}", other),
        }
    }

    #[test]
    fn test_display_parses_back() {
        let frequency = Frequency::SpecificDays { days: vec![1, 3] };
        assert_eq!(frequency.to_string(), "days:1,3");
        assert_eq!(frequency.to_string().parse::<Frequency>().unwrap(), frequency);
    }

    #[test]
    fn test_frequency_json_shape() {
        let json = serde_json::to_value(Frequency::Interval { every: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "interval", "value": 3 }));

        let parsed: Frequency =
            serde_json::from_str(r#"{"type":"specific_days","days":[0,2,4]}"#).unwrap();
        assert_eq!(parsed, Frequency::SpecificDays { days: vec![0, 2, 4] });
    }

    #[test]
    fn test_empty_specific_days_is_valid_but_never_due() {
        let frequency = Frequency::SpecificDays { days: vec![] };
        assert!(frequency.validate().is_ok());

        let created = date("2024-01-01");
        for offset in 0..7 {
            let day = created + chrono::Duration::days(offset);
            assert!(!frequency.is_due(created, day));
        }
    }

    #[test]
    fn test_interval_due_every_nth_day() {
        let created = date("2024-01-30");
        for every in 1..=10u32 {
            let frequency = Frequency::Interval { every };
            for offset in 0..60i64 {
                let day = created + chrono::Duration::days(offset);
                assert_eq!(
                    frequency.is_due(created, day),
                    offset % i64::from(every) == 0,
                    "every {} offset {}",
                    every,
                    offset
                );
            }
        }
    }

    #[test]
    fn test_weekly_and_monthly_always_due() {
        let created = date("2024-01-01");
        let weekly = Frequency::Weekly { times: 3 };
        let monthly = Frequency::Monthly { times: 1 };
        for offset in 0..40 {
            let day = created + chrono::Duration::days(offset);
            assert!(weekly.is_due(created, day));
            assert!(monthly.is_due(created, day));
        }
    }

    #[test]
    fn test_numerical_kind_validation() {
        assert!(HabitKind::Boolean.validate().is_ok());
        assert!(HabitKind::Numerical { target: 8.0, unit: "glasses".to_string() }
            .validate()
            .is_ok());
        assert!(HabitKind::Numerical { target: 0.0, unit: "glasses".to_string() }
            .validate()
            .is_err());
        assert!(HabitKind::Numerical { target: 8.0, unit: "  ".to_string() }
            .validate()
            .is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(HabitId::new(), HabitId::new());
        assert_ne!(EntryId::new(), EntryId::new());
        assert_eq!(HabitId::from("abc").as_str(), "abc");
    }
}
