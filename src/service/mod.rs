/// Aggregation service producing today's habit list
///
/// The service reads habits and entries from storage, derives their status
/// for the current day, and publishes the list of habits that need
/// attention. Every mutation goes to storage first and then rebuilds the
/// whole list.

pub mod clock;
pub mod observable;

pub use clock::{Clock, FixedClock, SystemClock};
pub use observable::Observable;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::domain::{compute_status, is_due_on, Habit, HabitEntry, HabitId};
use crate::storage::{HabitStorage, StorageError};
use crate::TrackerError;

/// A habit together with its status for the current day
///
/// Never stored; rebuilt on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitWithEntries {
    #[serde(flatten)]
    pub habit: Habit,
    pub today_entry: Option<HabitEntry>,
    pub is_overdue: bool,
    pub streak: u32,
}

impl HabitWithEntries {
    /// Whether today's entry marks the habit as done
    pub fn is_completed_today(&self) -> bool {
        self.today_entry.as_ref().is_some_and(|e| e.completed)
    }
}

/// Orchestrates storage and status derivation for the current day
pub struct HabitService<S: HabitStorage> {
    storage: S,
    clock: Arc<dyn Clock>,
    habits: Observable<Vec<HabitWithEntries>>,
    loading: Observable<bool>,
    initialized: AtomicBool,
}

impl<S: HabitStorage> HabitService<S> {
    /// Create a service that reads the system clock
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            habits: Observable::new(Vec::new()),
            loading: Observable::new(true),
            initialized: AtomicBool::new(false),
        }
    }

    /// Initialize storage once and load the first list
    pub async fn init(&self) -> Result<(), TrackerError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        self.storage.initialize().await?;
        self.initialized.store(true, Ordering::Release);
        info!("Habit service initialized");

        self.refresh().await;
        Ok(())
    }

    /// Rebuild and publish today's habit list
    ///
    /// Failures are logged, not returned; the previously published list
    /// stays in place. The loading flag is cleared either way.
    pub async fn refresh(&self) {
        self.loading.publish(true);

        match self.load_todays_habits().await {
            Ok(habits) => {
                debug!("Loaded {} habits for today", habits.len());
                self.habits.publish(habits);
            }
            Err(e) => error!(error = %e, "Failed to load habits"),
        }

        self.loading.publish(false);
    }

    async fn load_todays_habits(&self) -> Result<Vec<HabitWithEntries>, StorageError> {
        // One reading of the clock for the whole pass.
        let today = self.clock.today();

        let active = self.storage.get_active_habits().await?;
        let mut todays_entries = self.storage.get_entries_for_date(today).await?;

        let mut list = Vec::new();
        for habit in active {
            let history = self.storage.get_entries_for_habit(&habit.id).await?;
            let status = compute_status(&habit, &history, today);

            // Overdue catches habits that still need attention even when
            // the due test alone would leave them out.
            if !(is_due_on(&habit, today) || status.is_overdue) {
                continue;
            }

            let position = todays_entries.iter().position(|e| e.habit_id == habit.id);
            let today_entry = position.map(|index| todays_entries.swap_remove(index));

            list.push(HabitWithEntries {
                habit,
                today_entry,
                is_overdue: status.is_overdue,
                streak: status.current_streak,
            });
        }

        sort_for_display(&mut list);
        Ok(list)
    }

    /// Create a habit and refresh
    pub async fn add_habit(&self, habit: Habit) -> Result<(), TrackerError> {
        habit.validate()?;
        self.storage.add_habit(&habit).await?;
        info!("Added habit '{}' ({})", habit.name, habit.id);
        self.refresh().await;
        Ok(())
    }

    /// Replace a habit and refresh
    pub async fn update_habit(&self, habit: Habit) -> Result<(), TrackerError> {
        habit.validate()?;
        self.storage.update_habit(&habit).await?;
        info!("Updated habit '{}' ({})", habit.name, habit.id);
        self.refresh().await;
        Ok(())
    }

    /// Delete a habit with its whole history and refresh
    pub async fn delete_habit(&self, habit_id: &HabitId) -> Result<(), TrackerError> {
        self.storage.delete_habit(habit_id).await?;
        info!("Deleted habit {}", habit_id);
        self.refresh().await;
        Ok(())
    }

    /// Mark a habit done for today, creating today's entry if needed
    pub async fn complete_habit(&self, habit_id: &HabitId, value: Option<f64>) -> Result<(), TrackerError> {
        let now = self.clock.now();
        let today = now.date_naive();

        let entry = match self.storage.get_entry(habit_id, today).await? {
            Some(mut existing) => {
                existing.mark_completed(value, now)?;
                existing
            }
            None => HabitEntry::completed(habit_id.clone(), today, value, now)?,
        };

        self.storage.add_entry(&entry).await?;
        debug!("Completed habit {} for {}", habit_id, today);
        self.refresh().await;
        Ok(())
    }

    /// Take back today's completion; does nothing to storage without an entry
    pub async fn uncomplete_habit(&self, habit_id: &HabitId) -> Result<(), TrackerError> {
        let today = self.clock.today();

        if let Some(mut entry) = self.storage.get_entry(habit_id, today).await? {
            entry.mark_incomplete();
            self.storage.add_entry(&entry).await?;
            debug!("Uncompleted habit {} for {}", habit_id, today);
        }

        self.refresh().await;
        Ok(())
    }

    /// Look up a single habit
    pub async fn habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, TrackerError> {
        Ok(self.storage.get_habit(habit_id).await?)
    }

    /// All active habits, oldest first
    pub async fn active_habits(&self) -> Result<Vec<Habit>, TrackerError> {
        let mut habits = self.storage.get_active_habits().await?;
        habits.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(habits)
    }

    /// A habit's full entry history, oldest day first
    pub async fn entries_for(&self, habit_id: &HabitId) -> Result<Vec<HabitEntry>, TrackerError> {
        let mut entries = self.storage.get_entries_for_habit(habit_id).await?;
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    /// Snapshot of the published list
    pub fn habits(&self) -> Vec<HabitWithEntries> {
        self.habits.get()
    }

    pub fn subscribe_habits(&self) -> watch::Receiver<Vec<HabitWithEntries>> {
        self.habits.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// The calendar day the service currently considers "today"
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Overdue habits first, then oldest first within each group
fn sort_for_display(list: &mut [HabitWithEntries]) {
    list.sort_by(|a, b| {
        b.is_overdue
            .cmp(&a.is_overdue)
            .then_with(|| a.habit.created_at.cmp(&b.habit.created_at))
    });
}
