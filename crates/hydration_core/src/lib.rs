//! Core domain logic for the hydration tracker.
//! This crate is the single source of truth for intake, goal and rollover invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{DrinkEntry, EntryId, EntryValidationError};
pub use model::preset::{QuickAdd, UnknownPresetError};
pub use model::state::HydrationState;
pub use model::{Milliliters, DEFAULT_DAILY_GOAL};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use repo::memory_repo::MemoryKvRepository;
pub use service::hydration_service::{
    HydrationError, HydrationResult, HydrationService, MutationOutcome, Rejection,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
