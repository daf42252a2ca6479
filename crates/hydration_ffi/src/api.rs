//! FFI use-case API for the Flutter presentation layer.
//!
//! # Responsibility
//! - Expose the hydration state manager operations to Dart via FRB.
//! - Return one snapshot envelope shape for every call so the UI can
//!   re-render from the response alone.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Rejected input (bad amount, bad goal, unknown entry) is `ok = true,
//!   applied = false`; only storage failures produce `ok = false`.
//! - Every call reopens the store and runs the day rollover check first.

use hydration_core::db::{default_db_path, open_db};
use hydration_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, DrinkEntry,
    HydrationResult, HydrationService, HydrationState, MutationOutcome, QuickAdd, Rejection,
    SqliteKvRepository,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Liveness check the Flutter shell calls before the first snapshot.
///
/// Touches no store, so it answers even when the hydration file is unusable.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    "pong".to_owned()
}

/// Version of `hydration_core` linked into this bridge, shown on the settings screen.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Starts rolling file logs for every later `hydration_*` call.
///
/// Call once at app start, before the first `hydration_snapshot`. `level` is
/// `trace|debug|info|warn|error`; `log_dir` must be absolute. Repeating the
/// same pair is accepted; switching either is refused.
///
/// Returns an empty string when logging is active, otherwise the reason it
/// is not. Unlike the snapshot calls, there is no envelope here.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One drink log row for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkEntryItem {
    /// Opaque entry id, passed back to `hydration_delete_entry`.
    pub id: String,
    pub amount_ml: u32,
    /// Local time-of-day label.
    pub time: String,
}

/// Full view state returned by every hydration call.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationSnapshot {
    /// `false` only when the store could not be opened, read or written.
    pub ok: bool,
    /// Whether the requested mutation changed state.
    pub applied: bool,
    /// Human-readable result for diagnostics.
    pub message: String,
    pub daily_goal: u32,
    pub total_intake: u32,
    pub remaining: u32,
    /// 0..=100.
    pub progress_percent: f64,
    pub goal_reached: bool,
    /// Newest first.
    pub entries: Vec<DrinkEntryItem>,
}

impl HydrationSnapshot {
    fn from_state(state: &HydrationState, applied: bool, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            applied,
            message: message.into(),
            daily_goal: state.daily_goal,
            total_intake: state.total_intake,
            remaining: state.remaining(),
            progress_percent: state.progress_percent(),
            goal_reached: state.goal_reached(),
            entries: state.entries.iter().map(to_entry_item).collect(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            message: message.into(),
            daily_goal: 0,
            total_intake: 0,
            remaining: 0,
            progress_percent: 0.0,
            goal_reached: false,
            entries: Vec::new(),
        }
    }
}

/// Quick-add preset descriptor for building one-tap buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickAddItem {
    /// Name accepted by `hydration_quick_add`.
    pub key: String,
    pub label: String,
    pub amount_ml: u32,
}

/// Lists quick-add presets in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_quick_add_presets() -> Vec<QuickAddItem> {
    QuickAdd::ALL
        .iter()
        .map(|preset| QuickAddItem {
            key: preset.label().to_ascii_lowercase(),
            label: preset.label().to_string(),
            amount_ml: preset.amount(),
        })
        .collect()
}

/// Loads current state, rolling the day over if needed.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_snapshot() -> HydrationSnapshot {
    snapshot_at(&resolve_db_path())
}

/// Logs an intake of `amount_ml`. Non-positive amounts are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_add_intake(amount_ml: i64) -> HydrationSnapshot {
    mutate_at(&resolve_db_path(), "hydration_add_intake", |service| {
        service.add_intake(amount_ml)
    })
}

/// Logs an intake typed into the free-form amount field.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_add_intake_text(raw: String) -> HydrationSnapshot {
    mutate_at(&resolve_db_path(), "hydration_add_intake_text", |service| {
        service.add_intake_input(raw.as_str())
    })
}

/// Logs a quick-add preset by name (`glass|bottle|large`).
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_quick_add(preset: String) -> HydrationSnapshot {
    quick_add_at(&resolve_db_path(), preset.as_str())
}

/// Deletes one entry by id. Unknown ids are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_delete_entry(entry_id: String) -> HydrationSnapshot {
    mutate_at(&resolve_db_path(), "hydration_delete_entry", |service| {
        service.delete_entry(entry_id.trim())
    })
}

/// Replaces the daily goal. Non-positive goals are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_update_goal(goal_ml: i64) -> HydrationSnapshot {
    mutate_at(&resolve_db_path(), "hydration_update_goal", |service| {
        service.update_goal(goal_ml)
    })
}

/// Replaces the daily goal from the settings text field.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_update_goal_text(raw: String) -> HydrationSnapshot {
    mutate_at(&resolve_db_path(), "hydration_update_goal_text", |service| {
        service.update_goal_input(raw.as_str())
    })
}

/// Clears today's total and log, keeping the goal.
#[flutter_rust_bridge::frb(sync)]
pub fn hydration_reset_day() -> HydrationSnapshot {
    mutate_at(&resolve_db_path(), "hydration_reset_day", |service| {
        service.reset_day()
    })
}

type SqliteService<'conn> = HydrationService<SqliteKvRepository<'conn>>;

fn snapshot_at(db_path: &Path) -> HydrationSnapshot {
    with_service_at(db_path, "hydration_snapshot", |service| {
        HydrationSnapshot::from_state(service.state(), false, "Loaded.")
    })
}

fn quick_add_at(db_path: &Path, preset: &str) -> HydrationSnapshot {
    mutate_at(db_path, "hydration_quick_add", |service| {
        match preset.parse::<QuickAdd>() {
            Ok(preset) => service.add_quick(preset),
            Err(_) => Ok(MutationOutcome::Ignored(Rejection::InvalidAmount)),
        }
    })
}

fn mutate_at(
    db_path: &Path,
    op: &'static str,
    f: impl FnOnce(&mut SqliteService<'_>) -> HydrationResult<MutationOutcome>,
) -> HydrationSnapshot {
    with_service_at(db_path, op, |service| match f(service) {
        Ok(MutationOutcome::Applied) => {
            HydrationSnapshot::from_state(service.state(), true, "Saved.")
        }
        Ok(MutationOutcome::Ignored(rejection)) => HydrationSnapshot::from_state(
            service.state(),
            false,
            format!("Ignored: {rejection}."),
        ),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={op} error_code=persist_failed");
            let mut snapshot = HydrationSnapshot::from_state(
                service.state(),
                false,
                format!("{op} failed: {err}"),
            );
            snapshot.ok = false;
            snapshot
        }
    })
}

fn with_service_at(
    db_path: &Path,
    op: &'static str,
    f: impl FnOnce(&mut SqliteService<'_>) -> HydrationSnapshot,
) -> HydrationSnapshot {
    let conn = match open_db(db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={op} error_code=db_open_failed");
            return HydrationSnapshot::failure(format!("{op} failed: {err}"));
        }
    };
    let mut service = match HydrationService::load(SqliteKvRepository::new(&conn)) {
        Ok(service) => service,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={op} error_code=state_load_failed");
            return HydrationSnapshot::failure(format!("{op} failed: {err}"));
        }
    };
    f(&mut service)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH.get_or_init(default_db_path).clone()
}

fn to_entry_item(entry: &DrinkEntry) -> DrinkEntryItem {
    DrinkEntryItem {
        id: entry.id.to_string(),
        amount_ml: entry.amount,
        time: entry.time.clone(),
    }
}
