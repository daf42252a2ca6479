//! Persistence collaborator for hydration state.
//!
//! # Responsibility
//! - Define the string-keyed, string-valued store contract.
//! - Provide SQLite and in-memory implementations of it.
//!
//! # Invariants
//! - Stores are passive: they never decide what to write or when.
//! - `set_many` either writes every pair or reports an error.

pub mod kv_repo;
pub mod memory_repo;

/// Keys under which hydration state is stored.
pub mod keys {
    /// Decimal integer string, milliliters.
    pub const DAILY_GOAL: &str = "dailyGoal";
    /// Decimal integer string, milliliters.
    pub const TOTAL_WATER: &str = "totalWater";
    /// JSON array of `{id, amount, time}` objects, newest first.
    pub const DRINK_HISTORY: &str = "drinkHistory";
    /// `YYYY-MM-DD` local date of the last observed day.
    pub const LAST_DATE: &str = "lastDate";
}
