/// Integration tests against an on-disk database
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use habit_tracker::*;
use tempfile::tempdir;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_habits_and_entries_survive_reopen() {
        let dir = tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("habits.db");
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap()));

        let habit = Habit::new("Morning run".to_string(), HabitKind::Boolean, Frequency::Daily)
            .unwrap()
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, 8, 7, 0, 0).unwrap());

        {
            let service = HabitService::with_clock(SqliteStorage::new(db_path.clone()), clock.clone());
            service.init().await.expect("Failed to initialize first service");
            service.add_habit(habit.clone()).await.unwrap();
            service.complete_habit(&habit.id, None).await.unwrap();
        }

        let service = HabitService::with_clock(SqliteStorage::new(db_path), clock);
        service.init().await.expect("Failed to initialize second service");

        let list = service.habits();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].habit, habit);
        assert!(list[0].is_completed_today());
        assert!(!list[0].is_overdue);
        assert_eq!(list[0].streak, 1);
    }

    #[tokio::test]
    async fn test_week_of_tracking() {
        let dir = tempdir().expect("Failed to create temp dir");
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let service = HabitService::with_clock(SqliteStorage::new(dir.path().join("habits.db")), clock.clone());
        service.init().await.unwrap();

        let daily = Habit::new("Journal".to_string(), HabitKind::Boolean, Frequency::Daily)
            .unwrap()
            .with_created_at(start);
        let mwf = Habit::new(
            "Gym".to_string(),
            HabitKind::Boolean,
            Frequency::SpecificDays { days: vec![0, 2, 4] },
        )
        .unwrap()
        .with_created_at(start);
        service.add_habit(daily.clone()).await.unwrap();
        service.add_habit(mwf.clone()).await.unwrap();

        // Complete everything Jan 1-5, skip Jan 6, come back Jan 7
        for day in [1, 2, 3, 4, 5, 7] {
            clock.set(Utc.with_ymd_and_hms(2024, 1, day, 20, 0, 0).unwrap());
            service.complete_habit(&daily.id, None).await.unwrap();
            if [1, 3, 5].contains(&day) {
                service.complete_habit(&mwf.id, None).await.unwrap();
            }
        }

        // Sunday: only the daily habit is due
        service.refresh().await;
        let list = service.habits();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].habit.id, daily.id);
        assert_eq!(list[0].streak, 1);
        assert!(!list[0].is_overdue);

        // Monday morning: both due, both overdue, gym streak intact
        clock.set(Utc.with_ymd_and_hms(2024, 1, 8, 7, 0, 0).unwrap());
        service.refresh().await;
        let list = service.habits();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|h| h.is_overdue));
        let gym = list.iter().find(|h| h.habit.id == mwf.id).unwrap();
        assert_eq!(gym.streak, 0);

        service.complete_habit(&mwf.id, None).await.unwrap();
        let gym = service.habits().into_iter().find(|h| h.habit.id == mwf.id).unwrap();
        assert_eq!(gym.streak, 4);
        assert!(!gym.is_overdue);
        // Overdue habits sort before completed ones
        assert_eq!(service.habits()[0].habit.id, daily.id);
    }

    #[tokio::test]
    async fn test_storage_interface() {
        let dir = tempdir().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(dir.path().join("habits.db"));
        storage.initialize().await.unwrap();

        // SqliteStorage is usable behind the trait object
        let storage: &dyn HabitStorage = &storage;
        assert!(storage.get_active_habits().await.unwrap().is_empty());
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
