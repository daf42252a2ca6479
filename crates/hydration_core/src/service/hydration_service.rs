//! Hydration state manager.
//!
//! # Responsibility
//! - Load, reconcile and roll over persisted state.
//! - Apply intake/delete/goal/reset transitions and persist each one fully
//!   before returning.
//!
//! # Invariants
//! - `state.total_intake` always equals the sum of `state.entries` amounts.
//! - `state.daily_goal > 0`.
//! - In-memory state changes only after the matching write succeeded.
//! - Invalid input and unknown ids are rejections, never errors.
//! - Missing or corrupt stored values read as absent.

use crate::clock::{date_key, time_label, Clock, SystemClock};
use crate::model::entry::DrinkEntry;
use crate::model::input::{parse_leading_int, positive_milliliters};
use crate::model::preset::QuickAdd;
use crate::model::state::{entries_total, HydrationState};
use crate::model::{Milliliters, DEFAULT_DAILY_GOAL};
use crate::repo::keys;
use crate::repo::kv_repo::{KvRepository, RepoError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type HydrationResult<T> = Result<T, HydrationError>;

/// Failure to persist a state transition.
#[derive(Debug)]
pub enum HydrationError {
    Repo(RepoError),
    Encode(serde_json::Error),
}

impl Display for HydrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "failed to persist hydration state: {err}"),
            Self::Encode(err) => write!(f, "failed to encode drink history: {err}"),
        }
    }
}

impl Error for HydrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RepoError> for HydrationError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for HydrationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Why a mutation was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Amount was non-numeric, not positive, or would overflow the total.
    InvalidAmount,
    /// Goal was non-numeric or not positive.
    InvalidGoal,
    /// No entry with the requested id exists today.
    MissingEntry,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidGoal => "invalid_goal",
            Self::MissingEntry => "missing_entry",
        }
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a mutation that did not fail to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Ignored(Rejection),
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// State manager over an injected key-value store and clock.
pub struct HydrationService<R: KvRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    state: HydrationState,
}

impl<R: KvRepository> HydrationService<R, SystemClock> {
    /// Loads state using the system local clock.
    pub fn load(repo: R) -> HydrationResult<Self> {
        Self::load_with_clock(repo, SystemClock)
    }
}

impl<R: KvRepository, C: Clock> HydrationService<R, C> {
    /// Builds the manager and runs `initialize` once.
    pub fn load_with_clock(repo: R, clock: C) -> HydrationResult<Self> {
        let today = clock.today();
        let mut service = Self {
            repo,
            clock,
            state: HydrationState::empty_day(DEFAULT_DAILY_GOAL, today),
        };
        service.initialize()?;
        Ok(service)
    }

    pub fn state(&self) -> &HydrationState {
        &self.state
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Reloads persisted state, rolling the day over when the stored date is
    /// missing or differs from today.
    ///
    /// # Contract
    /// - The goal survives rollover; an absent or invalid goal is replaced by
    ///   `DEFAULT_DAILY_GOAL` and written back.
    /// - On the same-day path the total is recomputed from entries and written
    ///   back if the stored value disagrees.
    pub fn initialize(&mut self) -> HydrationResult<&HydrationState> {
        let today = self.clock.today();
        let today_key = date_key(today);

        let daily_goal = match self.read_goal() {
            Some(goal) => goal,
            None => {
                self.repo
                    .set(keys::DAILY_GOAL, &DEFAULT_DAILY_GOAL.to_string())?;
                debug!(
                    "event=goal_default module=service status=ok goal_ml={DEFAULT_DAILY_GOAL}"
                );
                DEFAULT_DAILY_GOAL
            }
        };

        let last_date = self.read_value(keys::LAST_DATE);
        if last_date.as_deref() != Some(today_key.as_str()) {
            self.persist_rollover(&today_key)?;
            self.state = HydrationState::empty_day(daily_goal, today);
            info!(
                "event=day_rollover module=service status=ok trigger=initialize had_previous_date={} goal_ml={daily_goal}",
                last_date.is_some()
            );
            return Ok(&self.state);
        }

        let loaded = self.read_entries();
        let (entries, total_intake) = match entries_total(&loaded) {
            Some(total) => (loaded, total),
            None => {
                warn!(
                    "event=state_read module=service status=invalid key={} error=total_overflow",
                    keys::DRINK_HISTORY
                );
                (Vec::new(), 0)
            }
        };

        let stored_total = self
            .read_value(keys::TOTAL_WATER)
            .and_then(|raw| raw.trim().parse::<Milliliters>().ok());
        if stored_total != Some(total_intake) {
            self.persist_log(&entries, total_intake)?;
            warn!(
                "event=total_reconcile module=service status=ok stored_present={} total_ml={total_intake}",
                stored_total.is_some()
            );
        }

        self.state = HydrationState {
            daily_goal,
            total_intake,
            entries,
            last_active_date: today,
        };
        info!(
            "event=state_load module=service status=ok goal_ml={daily_goal} total_ml={total_intake} entries={}",
            self.state.entries.len()
        );
        Ok(&self.state)
    }

    /// Rolls the day over if the clock has moved past the active date.
    ///
    /// Intended for long-running front ends; nothing calls it implicitly.
    /// Returns `true` when a rollover happened.
    pub fn refresh_day(&mut self) -> HydrationResult<bool> {
        let today = self.clock.today();
        if today == self.state.last_active_date {
            return Ok(false);
        }

        self.persist_rollover(&date_key(today))?;
        self.state = HydrationState::empty_day(self.state.daily_goal, today);
        info!(
            "event=day_rollover module=service status=ok trigger=refresh goal_ml={}",
            self.state.daily_goal
        );
        Ok(true)
    }

    /// Logs an intake of `amount` ml as the newest entry.
    pub fn add_intake(&mut self, amount: i64) -> HydrationResult<MutationOutcome> {
        let Some(amount) = positive_milliliters(amount) else {
            return Ok(reject("intake_add", Rejection::InvalidAmount));
        };
        let Some(total_intake) = self.state.total_intake.checked_add(amount) else {
            return Ok(reject("intake_add", Rejection::InvalidAmount));
        };
        let entry = match DrinkEntry::new(amount, time_label(self.clock.now())) {
            Ok(entry) => entry,
            Err(_) => return Ok(reject("intake_add", Rejection::InvalidAmount)),
        };

        let mut entries = Vec::with_capacity(self.state.entries.len() + 1);
        entries.push(entry);
        entries.extend(self.state.entries.iter().cloned());

        self.persist_log(&entries, total_intake)?;
        self.state.entries = entries;
        self.state.total_intake = total_intake;

        info!(
            "event=intake_add module=service status=ok amount_ml={amount} total_ml={total_intake} goal_reached={}",
            self.state.goal_reached()
        );
        Ok(MutationOutcome::Applied)
    }

    /// Free-form text variant of `add_intake`; non-numeric text is rejected.
    pub fn add_intake_input(&mut self, raw: &str) -> HydrationResult<MutationOutcome> {
        match parse_leading_int(raw) {
            Some(amount) => self.add_intake(amount),
            None => Ok(reject("intake_add", Rejection::InvalidAmount)),
        }
    }

    pub fn add_quick(&mut self, preset: QuickAdd) -> HydrationResult<MutationOutcome> {
        self.add_intake(i64::from(preset.amount()))
    }

    /// Removes the entry with `id` and subtracts its amount.
    ///
    /// The amount comes from the current entry list at removal time, and the
    /// total is recomputed from what remains, so it cannot go negative.
    pub fn delete_entry(&mut self, id: &str) -> HydrationResult<MutationOutcome> {
        let Some(position) = self
            .state
            .entries
            .iter()
            .position(|entry| entry.id.as_str() == id)
        else {
            return Ok(reject("entry_delete", Rejection::MissingEntry));
        };

        let mut entries = self.state.entries.clone();
        let removed = entries.remove(position);
        let total_intake = entries_total(&entries).unwrap_or(0);

        self.persist_log(&entries, total_intake)?;
        self.state.entries = entries;
        self.state.total_intake = total_intake;

        info!(
            "event=entry_delete module=service status=ok amount_ml={} total_ml={total_intake}",
            removed.amount
        );
        Ok(MutationOutcome::Applied)
    }

    /// Replaces the daily goal. Total and entries are untouched.
    pub fn update_goal(&mut self, new_goal: i64) -> HydrationResult<MutationOutcome> {
        let Some(daily_goal) = positive_milliliters(new_goal) else {
            return Ok(reject("goal_update", Rejection::InvalidGoal));
        };

        self.repo.set(keys::DAILY_GOAL, &daily_goal.to_string())?;
        self.state.daily_goal = daily_goal;

        info!("event=goal_update module=service status=ok goal_ml={daily_goal}");
        Ok(MutationOutcome::Applied)
    }

    /// Free-form text variant of `update_goal`.
    pub fn update_goal_input(&mut self, raw: &str) -> HydrationResult<MutationOutcome> {
        match parse_leading_int(raw) {
            Some(goal) => self.update_goal(goal),
            None => Ok(reject("goal_update", Rejection::InvalidGoal)),
        }
    }

    /// Clears total and entries for the current day, keeping the goal.
    pub fn reset_day(&mut self) -> HydrationResult<MutationOutcome> {
        self.persist_log(&[], 0)?;
        let cleared = self.state.entries.len();
        self.state.entries.clear();
        self.state.total_intake = 0;

        info!("event=day_reset module=service status=ok cleared_entries={cleared}");
        Ok(MutationOutcome::Applied)
    }

    fn persist_log(&self, entries: &[DrinkEntry], total_intake: Milliliters) -> HydrationResult<()> {
        let history = serde_json::to_string(entries)?;
        let total = total_intake.to_string();
        self.repo.set_many(&[
            (keys::TOTAL_WATER, total.as_str()),
            (keys::DRINK_HISTORY, history.as_str()),
        ])?;
        Ok(())
    }

    fn persist_rollover(&self, today_key: &str) -> HydrationResult<()> {
        self.repo.set_many(&[
            (keys::TOTAL_WATER, "0"),
            (keys::DRINK_HISTORY, "[]"),
            (keys::LAST_DATE, today_key),
        ])?;
        Ok(())
    }

    fn read_value(&self, key: &str) -> Option<String> {
        match self.repo.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=state_read module=service status=error key={key} error={err}"
                );
                None
            }
        }
    }

    fn read_goal(&self) -> Option<Milliliters> {
        let raw = self.read_value(keys::DAILY_GOAL)?;
        let goal = raw.trim().parse::<i64>().ok().and_then(positive_milliliters);
        if goal.is_none() {
            warn!("event=state_read module=service status=invalid key={}", keys::DAILY_GOAL);
        }
        goal
    }

    fn read_entries(&self) -> Vec<DrinkEntry> {
        let Some(raw) = self.read_value(keys::DRINK_HISTORY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<DrinkEntry>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=state_read module=service status=invalid key={} error={err}",
                    keys::DRINK_HISTORY
                );
                Vec::new()
            }
        }
    }
}

fn reject(event: &str, rejection: Rejection) -> MutationOutcome {
    debug!("event={event} module=service status=ignored reason={rejection}");
    MutationOutcome::Ignored(rejection)
}
