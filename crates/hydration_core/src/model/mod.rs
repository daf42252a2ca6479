//! Hydration domain model.
//!
//! # Responsibility
//! - Define the drink entry record and the in-memory day state.
//! - Hold the pure rules for amounts, presets and progress.
//!
//! # Invariants
//! - Every persisted amount is a positive number of milliliters.
//! - `HydrationState::total_intake` equals the sum of its entry amounts.

pub mod entry;
pub mod input;
pub mod preset;
pub mod state;

/// Milliliters. Amounts, goals and totals share this unit.
pub type Milliliters = u32;

/// Goal used when none has been stored yet.
pub const DEFAULT_DAILY_GOAL: Milliliters = 2000;
