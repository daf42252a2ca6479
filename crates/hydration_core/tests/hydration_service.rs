use chrono::{Duration, NaiveDate, NaiveDateTime};
use hydration_core::db::{open_db, open_db_in_memory};
use hydration_core::repo::keys;
use hydration_core::{
    DrinkEntry, HydrationError, HydrationService, KvRepository, ManualClock, MemoryKvRepository,
    MutationOutcome, QuickAdd, Rejection, RepoError, RepoResult, SqliteKvRepository,
    DEFAULT_DAILY_GOAL,
};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn morning() -> ManualClock {
    ManualClock::new(at(18, 9, 30))
}

fn stored_entries(repo: &impl KvRepository) -> Vec<DrinkEntry> {
    let raw = repo.get(keys::DRINK_HISTORY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn stored(repo: &impl KvRepository, key: &str) -> Option<String> {
    repo.get(key).unwrap()
}

#[test]
fn fresh_start_defaults_goal_and_persists_day() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    let state = service.state();
    assert_eq!(state.daily_goal, DEFAULT_DAILY_GOAL);
    assert_eq!(state.total_intake, 0);
    assert!(state.entries.is_empty());

    assert_eq!(stored(&repo, keys::DAILY_GOAL).as_deref(), Some("2000"));
    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("0"));
    assert_eq!(stored(&repo, keys::DRINK_HISTORY).as_deref(), Some("[]"));
    assert_eq!(stored(&repo, keys::LAST_DATE).as_deref(), Some("2026-10-18"));
}

#[test]
fn adding_two_drinks_keeps_newest_first() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    assert_eq!(service.add_intake(250).unwrap(), MutationOutcome::Applied);
    clock.advance(Duration::minutes(45));
    assert_eq!(service.add_intake(500).unwrap(), MutationOutcome::Applied);

    let state = service.state();
    assert_eq!(state.total_intake, 750);
    assert_eq!(state.entries.len(), 2);
    assert_eq!(state.entries[0].amount, 500);
    assert_eq!(state.entries[0].time, "10:15 AM");
    assert_eq!(state.entries[1].amount, 250);
    assert_eq!(state.entries[1].time, "09:30 AM");

    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("750"));
    assert_eq!(stored_entries(&repo), state.entries);
}

#[test]
fn total_tracks_sum_of_valid_adds() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    let amounts = [120_i64, 330, 1, 750, 2_000, 45];
    for amount in amounts {
        service.add_intake(amount).unwrap();
    }

    let expected: i64 = amounts.iter().sum();
    assert_eq!(i64::from(service.state().total_intake), expected);
    assert_eq!(service.state().entries.len(), amounts.len());
}

#[test]
fn invalid_amounts_are_ignored() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.add_intake(250).unwrap();
    let before = service.state().clone();
    let stored_before = repo.dump();

    let ignored = MutationOutcome::Ignored(Rejection::InvalidAmount);
    assert_eq!(service.add_intake(0).unwrap(), ignored);
    assert_eq!(service.add_intake(-5).unwrap(), ignored);
    assert_eq!(service.add_intake_input("NaN").unwrap(), ignored);
    assert_eq!(service.add_intake_input("").unwrap(), ignored);
    assert_eq!(service.add_intake_input("water").unwrap(), ignored);
    assert_eq!(service.add_intake_input("-100").unwrap(), ignored);

    assert_eq!(service.state(), &before);
    assert_eq!(repo.dump(), stored_before);
}

#[test]
fn amount_that_would_overflow_total_is_ignored() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.add_intake(i64::from(u32::MAX)).unwrap();

    assert_eq!(
        service.add_intake(1).unwrap(),
        MutationOutcome::Ignored(Rejection::InvalidAmount)
    );
    assert_eq!(service.state().total_intake, u32::MAX);
}

#[test]
fn text_input_and_presets_add_intake() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    assert!(service.add_intake_input(" 300ml").unwrap().is_applied());
    assert!(service.add_quick(QuickAdd::Bottle).unwrap().is_applied());

    let amounts = service
        .state()
        .entries
        .iter()
        .map(|entry| entry.amount)
        .collect::<Vec<_>>();
    assert_eq!(amounts, vec![500, 300]);
    assert_eq!(service.state().total_intake, 800);
}

#[test]
fn reaching_goal_flips_goal_reached() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.add_intake(1_800).unwrap();
    assert!(!service.state().goal_reached());
    assert_eq!(service.state().remaining(), 200);

    service.add_intake(250).unwrap();
    assert_eq!(service.state().total_intake, 2_050);
    assert!(service.state().goal_reached());
    assert_eq!(service.state().remaining(), 0);
}

#[test]
fn add_then_delete_restores_previous_state() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.add_intake(250).unwrap();
    service.add_intake(500).unwrap();
    let before = service.state().clone();

    service.add_intake(330).unwrap();
    let newest = service.state().entries[0].id.clone();
    assert_eq!(
        service.delete_entry(newest.as_str()).unwrap(),
        MutationOutcome::Applied
    );

    assert_eq!(service.state(), &before);
    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("750"));
    assert_eq!(stored_entries(&repo), before.entries);
}

#[test]
fn delete_is_idempotent_and_keeps_order() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    for amount in [100, 200, 300] {
        service.add_intake(amount).unwrap();
    }
    let middle = service.state().entries[1].id.clone();

    assert!(service.delete_entry(middle.as_str()).unwrap().is_applied());
    let after_first = service.state().clone();
    assert_eq!(
        service.delete_entry(middle.as_str()).unwrap(),
        MutationOutcome::Ignored(Rejection::MissingEntry)
    );

    assert_eq!(service.state(), &after_first);
    let amounts = after_first
        .entries
        .iter()
        .map(|entry| entry.amount)
        .collect::<Vec<_>>();
    assert_eq!(amounts, vec![300, 100]);
    assert_eq!(after_first.total_intake, 400);
}

#[test]
fn delete_unknown_id_is_ignored() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.add_intake(250).unwrap();

    assert_eq!(
        service.delete_entry("no-such-entry").unwrap(),
        MutationOutcome::Ignored(Rejection::MissingEntry)
    );
    assert_eq!(service.state().total_intake, 250);
}

#[test]
fn update_goal_changes_only_goal() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.add_intake(400).unwrap();
    let before = service.state().clone();

    assert!(service.update_goal(2_500).unwrap().is_applied());

    let state = service.state();
    assert_eq!(state.daily_goal, 2_500);
    assert_eq!(state.total_intake, before.total_intake);
    assert_eq!(state.entries, before.entries);
    assert_eq!(stored(&repo, keys::DAILY_GOAL).as_deref(), Some("2500"));
}

#[test]
fn invalid_goals_are_ignored() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    let ignored = MutationOutcome::Ignored(Rejection::InvalidGoal);
    assert_eq!(service.update_goal(0).unwrap(), ignored);
    assert_eq!(service.update_goal(-1).unwrap(), ignored);
    assert_eq!(service.update_goal_input("lots").unwrap(), ignored);
    assert!(service.update_goal_input("3000 ml").unwrap().is_applied());
    assert_eq!(service.state().daily_goal, 3_000);
}

#[test]
fn reset_day_clears_log_and_keeps_goal() {
    let repo = MemoryKvRepository::new();
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.update_goal(2_400).unwrap();
    service.add_intake(250).unwrap();
    service.add_intake(750).unwrap();

    assert!(service.reset_day().unwrap().is_applied());

    let state = service.state();
    assert_eq!(state.total_intake, 0);
    assert!(state.entries.is_empty());
    assert_eq!(state.daily_goal, 2_400);
    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("0"));
    assert_eq!(stored(&repo, keys::DRINK_HISTORY).as_deref(), Some("[]"));
    assert_eq!(stored(&repo, keys::DAILY_GOAL).as_deref(), Some("2400"));
}

#[test]
fn initialize_rolls_over_stale_day_and_keeps_goal() {
    let repo = MemoryKvRepository::seeded([
        (keys::DAILY_GOAL, "2500"),
        (keys::TOTAL_WATER, "1500"),
        (
            keys::DRINK_HISTORY,
            r#"[{"id":"b","amount":1000,"time":"08:00 PM"},{"id":"a","amount":500,"time":"07:00 AM"}]"#,
        ),
        (keys::LAST_DATE, "2026-10-17"),
    ]);
    let clock = morning();
    let service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    let state = service.state();
    assert_eq!(state.total_intake, 0);
    assert!(state.entries.is_empty());
    assert_eq!(state.daily_goal, 2_500);
    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("0"));
    assert_eq!(stored(&repo, keys::DRINK_HISTORY).as_deref(), Some("[]"));
    assert_eq!(stored(&repo, keys::LAST_DATE).as_deref(), Some("2026-10-18"));
    assert_eq!(stored(&repo, keys::DAILY_GOAL).as_deref(), Some("2500"));
}

#[test]
fn initialize_same_day_restores_entries() {
    let repo = MemoryKvRepository::seeded([
        (keys::DAILY_GOAL, "1800"),
        (keys::TOTAL_WATER, "750"),
        (
            keys::DRINK_HISTORY,
            r#"[{"id":"1729245600000","amount":500,"time":"09:00 AM"},{"id":"1729242000000","amount":250,"time":"08:00 AM"}]"#,
        ),
        (keys::LAST_DATE, "2026-10-18"),
    ]);
    let clock = morning();
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    assert_eq!(service.state().daily_goal, 1_800);
    assert_eq!(service.state().total_intake, 750);
    assert_eq!(service.state().entries.len(), 2);

    assert!(service.delete_entry("1729242000000").unwrap().is_applied());
    assert_eq!(service.state().total_intake, 500);
}

#[test]
fn initialize_reconciles_total_with_entries() {
    let repo = MemoryKvRepository::seeded([
        (keys::TOTAL_WATER, "9999"),
        (
            keys::DRINK_HISTORY,
            r#"[{"id":"x","amount":300,"time":"09:00 AM"}]"#,
        ),
        (keys::LAST_DATE, "2026-10-18"),
    ]);
    let clock = morning();
    let service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    assert_eq!(service.state().total_intake, 300);
    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("300"));
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let repo = MemoryKvRepository::seeded([
        (keys::DAILY_GOAL, "-40"),
        (keys::TOTAL_WATER, "abc"),
        (keys::DRINK_HISTORY, "{not json"),
        (keys::LAST_DATE, "2026-10-18"),
    ]);
    let clock = morning();
    let service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    let state = service.state();
    assert_eq!(state.daily_goal, DEFAULT_DAILY_GOAL);
    assert_eq!(state.total_intake, 0);
    assert!(state.entries.is_empty());
    assert_eq!(stored(&repo, keys::DAILY_GOAL).as_deref(), Some("2000"));
    assert_eq!(stored(&repo, keys::TOTAL_WATER).as_deref(), Some("0"));
}

#[test]
fn history_with_invalid_entry_is_treated_as_absent() {
    let repo = MemoryKvRepository::seeded([
        (keys::TOTAL_WATER, "250"),
        (
            keys::DRINK_HISTORY,
            r#"[{"id":"ok","amount":250,"time":"09:00 AM"},{"id":"bad","amount":0,"time":"09:05 AM"}]"#,
        ),
        (keys::LAST_DATE, "2026-10-18"),
    ]);
    let clock = morning();
    let service = HydrationService::load_with_clock(&repo, &clock).unwrap();

    assert!(service.state().entries.is_empty());
    assert_eq!(service.state().total_intake, 0);
}

#[test]
fn refresh_day_rolls_over_only_after_midnight() {
    let repo = MemoryKvRepository::new();
    let clock = ManualClock::new(at(18, 23, 50));
    let mut service = HydrationService::load_with_clock(&repo, &clock).unwrap();
    service.update_goal(2_200).unwrap();
    service.add_intake(500).unwrap();

    assert!(!service.refresh_day().unwrap());
    assert_eq!(service.state().total_intake, 500);

    clock.advance(Duration::minutes(20));
    assert!(service.refresh_day().unwrap());

    let state = service.state();
    assert_eq!(state.total_intake, 0);
    assert!(state.entries.is_empty());
    assert_eq!(state.daily_goal, 2_200);
    assert_eq!(
        state.last_active_date,
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    );
    assert_eq!(stored(&repo, keys::LAST_DATE).as_deref(), Some("2026-10-19"));
}

#[test]
fn sqlite_state_survives_reopen_and_rolls_over_next_day() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hydration.sqlite3");
    let clock = morning();

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteKvRepository::new(&conn);
        let mut service = HydrationService::load_with_clock(repo, &clock).unwrap();
        service.update_goal(2_600).unwrap();
        service.add_intake(250).unwrap();
        service.add_intake(500).unwrap();
    }

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteKvRepository::new(&conn);
        let service = HydrationService::load_with_clock(repo, &clock).unwrap();
        assert_eq!(service.state().daily_goal, 2_600);
        assert_eq!(service.state().total_intake, 750);
        assert_eq!(service.state().entries[0].amount, 500);
    }

    clock.set(at(19, 7, 0));
    let conn = open_db(&path).unwrap();
    let repo = SqliteKvRepository::new(&conn);
    let service = HydrationService::load_with_clock(repo, &clock).unwrap();
    assert_eq!(service.state().daily_goal, 2_600);
    assert_eq!(service.state().total_intake, 0);
    assert!(service.state().entries.is_empty());
}

/// Store whose writes always fail, for error propagation checks.
struct ReadOnlyRepo(MemoryKvRepository);

impl KvRepository for ReadOnlyRepo {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::Backend("read-only".to_string()))
    }
}

#[test]
fn failed_write_leaves_state_untouched() {
    let conn = open_db_in_memory().unwrap();
    let clock = morning();
    let seeded = {
        let repo = SqliteKvRepository::new(&conn);
        let mut service = HydrationService::load_with_clock(repo, &clock).unwrap();
        service.add_intake(250).unwrap();
        service.state().clone()
    };

    let repo = ReadOnlyRepo(MemoryKvRepository::seeded([
        (keys::DAILY_GOAL, "2000"),
        (keys::TOTAL_WATER, "250"),
        (
            keys::DRINK_HISTORY,
            serde_json::to_string(&seeded.entries).unwrap().as_str(),
        ),
        (keys::LAST_DATE, "2026-10-18"),
    ]));
    let mut service = HydrationService::load_with_clock(repo, &clock).unwrap();
    assert_eq!(service.state(), &seeded);

    let err = service.add_intake(500).unwrap_err();
    assert!(matches!(err, HydrationError::Repo(RepoError::Backend(_))));
    assert_eq!(service.state(), &seeded);

    assert!(service.update_goal(3_000).is_err());
    assert_eq!(service.state().daily_goal, 2_000);
}
