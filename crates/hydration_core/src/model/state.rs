//! In-memory hydration state for the active day.
//!
//! # Invariants
//! - `total_intake == entries_total(&entries)` after every completed operation.
//! - `daily_goal > 0`.
//! - `entries` are newest first; removal keeps the relative order of the rest.

use super::entry::DrinkEntry;
use super::Milliliters;
use chrono::NaiveDate;

/// Snapshot of goal, running total and today's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationState {
    pub daily_goal: Milliliters,
    pub total_intake: Milliliters,
    /// Newest first.
    pub entries: Vec<DrinkEntry>,
    pub last_active_date: NaiveDate,
}

impl HydrationState {
    /// Empty day carrying the given goal.
    pub fn empty_day(daily_goal: Milliliters, day: NaiveDate) -> Self {
        Self {
            daily_goal,
            total_intake: 0,
            entries: Vec::new(),
            last_active_date: day,
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.total_intake >= self.daily_goal
    }

    /// Milliliters still missing to reach the goal, 0 once reached.
    pub fn remaining(&self) -> Milliliters {
        self.daily_goal.saturating_sub(self.total_intake)
    }

    /// Progress towards the goal in percent, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.daily_goal == 0 {
            return 100.0;
        }
        (f64::from(self.total_intake) / f64::from(self.daily_goal) * 100.0).min(100.0)
    }

    pub fn find_entry(&self, id: &str) -> Option<&DrinkEntry> {
        self.entries.iter().find(|entry| entry.id.as_str() == id)
    }
}

/// Sums entry amounts, returning `None` if the sum does not fit in `Milliliters`.
pub fn entries_total(entries: &[DrinkEntry]) -> Option<Milliliters> {
    entries
        .iter()
        .try_fold(0 as Milliliters, |acc, entry| acc.checked_add(entry.amount))
}
