/// Due, overdue and streak status for a habit
///
/// Status is never stored. It is derived from the habit, its complete entry
/// history and a reference day every time the habit list is loaded.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{is_due_on, Habit, HabitEntry};

/// Derived status of a habit on a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HabitStatus {
    /// Due on the reference day and not completed on it
    pub is_overdue: bool,
    /// Reserved; always zero
    pub missed_days: u32,
    /// Contiguous completed due days walking back from the reference day
    pub current_streak: u32,
}

/// Compute the status of `habit` on `reference`
///
/// `entries` should be the habit's full history. Entries belonging to other
/// habits are ignored.
pub fn compute_status(habit: &Habit, entries: &[HabitEntry], reference: NaiveDate) -> HabitStatus {
    let completed_days: HashSet<NaiveDate> = entries
        .iter()
        .filter(|e| e.habit_id == habit.id && e.completed)
        .map(|e| e.date)
        .collect();

    let is_overdue = is_due_on(habit, reference) && !completed_days.contains(&reference);

    HabitStatus {
        is_overdue,
        missed_days: 0,
        current_streak: current_streak(habit, &completed_days, reference),
    }
}

/// Walk backwards from `reference` to the creation day, counting due days
/// that were completed. Days that are not due are skipped; the first due day
/// without a completion ends the walk.
fn current_streak(habit: &Habit, completed_days: &HashSet<NaiveDate>, reference: NaiveDate) -> u32 {
    let created_on = habit.created_on();
    let mut streak = 0;
    let mut day = reference;

    while day >= created_on {
        if is_due_on(habit, day) {
            if completed_days.contains(&day) {
                streak += 1;
            } else {
                break;
            }
        }

        day = match day.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }

    streak
}
