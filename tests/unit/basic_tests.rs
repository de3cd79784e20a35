/// Basic unit tests against the public API
use chrono::{NaiveDate, TimeZone, Utc};
use habit_tracker::*;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new(
            "Test Habit".to_string(),
            HabitKind::Numerical { target: 30.0, unit: "minutes".to_string() },
            "interval:2".parse().unwrap(),
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
        assert_eq!(habit.frequency, Frequency::Interval { every: 2 });
    }

    #[test]
    fn test_daily_scenario_from_history() {
        let habit = Habit::new("Daily".to_string(), HabitKind::Boolean, Frequency::Daily)
            .unwrap()
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let entries: Vec<HabitEntry> = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-07"]
            .iter()
            .map(|d| HabitEntry::completed(habit.id.clone(), day(d), None, Utc::now()).unwrap())
            .collect();

        let status = compute_status(&habit, &entries, day("2024-01-07"));
        assert_eq!(status.current_streak, 1);
        assert!(!status.is_overdue);
        assert_eq!(status.missed_days, 0);
    }

    #[test]
    fn test_tuesday_not_due_for_mon_wed_fri() {
        let habit = Habit::new(
            "Gym".to_string(),
            HabitKind::Boolean,
            Frequency::SpecificDays { days: vec![0, 2, 4] },
        )
        .unwrap()
        .with_created_at(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());

        let tuesday = day("2024-01-09");
        assert_eq!(weekday_index(tuesday), 1);
        assert!(!is_due_on(&habit, tuesday));
        assert!(!compute_status(&habit, &[], tuesday).is_overdue);
    }

    #[test]
    fn test_date_helpers() {
        assert_eq!(format_date(add_days(day("2023-12-31"), 1)), "2024-01-01");
        assert_eq!(start_of_week(day("2024-01-10")), day("2024-01-08"));
        assert_eq!(start_of_month(day("2024-01-10")), day("2024-01-01"));
    }
}
