/// Calendar-day helpers and recurrence evaluation
///
/// Dates cross component boundaries as `YYYY-MM-DD` strings. Inside the
/// crate they are `NaiveDate` values, so comparing two days never involves
/// a timezone.

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::{DomainError, Habit};

/// Wire format for calendar days
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a calendar day as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` string back into a calendar day
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| DomainError::InvalidDate(format!("'{}': {}", value, e)))
}

/// Move a date by `days` calendar days, saturating at the calendar limits
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Weekday index with Monday=0 through Sunday=6
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// The Monday on or before `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(weekday_index(date)))
}

/// The first day of the month containing `date`
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Check whether a habit is due on the given day
///
/// A habit is never due before the calendar day it was created on. After
/// that the habit's frequency decides.
pub fn is_due_on(habit: &Habit, date: NaiveDate) -> bool {
    let created_on = habit.created_on();
    if date < created_on {
        return false;
    }
    habit.frequency.is_due(created_on, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, HabitKind};
    use chrono::{TimeZone, Utc};

    fn habit_created(day: &str, frequency: Frequency) -> Habit {
        let created = parse_date(day).unwrap().and_hms_opt(9, 30, 0).unwrap();
        Habit::new("Test Habit".to_string(), HabitKind::Boolean, frequency)
            .unwrap()
            .with_created_at(Utc.from_utc_datetime(&created))
    }

    #[test]
    fn test_format_and_parse() {
        let date = parse_date("2024-03-09").unwrap();
        assert_eq!(format_date(date), "2024-03-09");
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("09/03/2024").is_err());
    }

    #[test]
    fn test_add_days_rolls_over_months_and_years() {
        assert_eq!(add_days(parse_date("2024-01-31").unwrap(), 1), parse_date("2024-02-01").unwrap());
        assert_eq!(add_days(parse_date("2024-02-28").unwrap(), 1), parse_date("2024-02-29").unwrap());
        assert_eq!(add_days(parse_date("2024-12-31").unwrap(), 1), parse_date("2025-01-01").unwrap());
        assert_eq!(add_days(parse_date("2024-01-01").unwrap(), -1), parse_date("2023-12-31").unwrap());
    }

    #[test]
    fn test_weekday_index_monday_first() {
        // 2024-01-01 was a Monday
        assert_eq!(weekday_index(parse_date("2024-01-01").unwrap()), 0);
        assert_eq!(weekday_index(parse_date("2024-01-03").unwrap()), 2);
        assert_eq!(weekday_index(parse_date("2024-01-07").unwrap()), 6);
    }

    #[test]
    fn test_start_of_week_and_month() {
        let sunday = parse_date("2024-01-07").unwrap();
        assert_eq!(start_of_week(sunday), parse_date("2024-01-01").unwrap());
        let monday = parse_date("2024-01-08").unwrap();
        assert_eq!(start_of_week(monday), monday);
        assert_eq!(start_of_month(parse_date("2024-02-29").unwrap()), parse_date("2024-02-01").unwrap());
    }

    #[test]
    fn test_not_due_before_creation_day() {
        let habit = habit_created("2024-01-10", Frequency::Daily);
        assert!(!is_due_on(&habit, parse_date("2024-01-09").unwrap()));
        assert!(is_due_on(&habit, parse_date("2024-01-10").unwrap()));
        assert!(is_due_on(&habit, parse_date("2024-01-11").unwrap()));
    }

    #[test]
    fn test_specific_days() {
        let habit = habit_created("2024-01-01", Frequency::SpecificDays { days: vec![0, 2, 4] });
        // Mon, Tue, Wed, Thu, Fri, Sat, Sun
        let expected = [true, false, true, false, true, false, false];
        for (offset, due) in expected.iter().enumerate() {
            let day = add_days(parse_date("2024-01-08").unwrap(), offset as i64);
            assert_eq!(is_due_on(&habit, day), *due, "day {}", format_date(day));
        }
    }

    #[test]
    fn test_interval_counts_from_creation_day() {
        let habit = habit_created("2024-01-30", Frequency::Interval { every: 3 });
        assert!(is_due_on(&habit, parse_date("2024-01-30").unwrap()));
        assert!(!is_due_on(&habit, parse_date("2024-01-31").unwrap()));
        assert!(!is_due_on(&habit, parse_date("2024-02-01").unwrap()));
        assert!(is_due_on(&habit, parse_date("2024-02-02").unwrap()));
        assert!(is_due_on(&habit, parse_date("2024-03-03").unwrap()));
    }
}
