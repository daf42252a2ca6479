//! Terminal front end for the hydration tracker.
//!
//! # Responsibility
//! - Map one command line invocation to one state manager operation.
//! - Print the resulting progress and today's log.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hydration_core::db::{default_db_path, open_db, DB_PATH_ENV};
use hydration_core::{
    default_log_level, init_logging, HydrationService, HydrationState, KvRepository,
    MutationOutcome, QuickAdd, SqliteKvRepository,
};
use log::info;
use std::path::PathBuf;

const PROGRESS_BAR_WIDTH: usize = 30;

/// Track daily water intake against a goal
#[derive(Parser)]
#[command(name = "hydration")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store file (defaults to $HYDRATION_DB_PATH or a file in the temp directory)
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show progress towards today's goal
    Status,

    /// Log a drink of the given amount in ml (e.g. `300` or `300ml`)
    Add {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Log a preset drink: glass (250ml), bottle (500ml) or large (750ml)
    Quick {
        preset: QuickAdd,
    },

    /// Delete one of today's entries by id
    Delete {
        id: String,
    },

    /// Set the daily goal in ml
    Goal {
        #[arg(allow_hyphen_values = true)]
        goal: String,
    },

    /// Clear today's total and log, keeping the goal
    Reset,

    /// List today's entries, newest first
    History,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())
            .map_err(|err| anyhow::anyhow!("{err}"))
            .context("failed to initialize logging")?;
    }

    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    let mut service = HydrationService::load(SqliteKvRepository::new(&conn))
        .context("failed to load hydration state")?;

    let command = cli.command.unwrap_or(Commands::Status);
    info!("event=cli_command module=cli status=start command={}", command.name());

    match command {
        Commands::Status => print_status(service.state()),
        Commands::History => print_history(service.state()),
        Commands::Add { amount } => {
            let outcome = service.add_intake_input(&amount)?;
            report(&service, outcome, "Logged drink.")
        }
        Commands::Quick { preset } => {
            let outcome = service.add_quick(preset)?;
            report(&service, outcome, &format!("Logged {preset}."))
        }
        Commands::Delete { id } => {
            let outcome = service.delete_entry(id.trim())?;
            report(&service, outcome, "Deleted entry.")
        }
        Commands::Goal { goal } => {
            let outcome = service.update_goal_input(&goal)?;
            report(&service, outcome, "Updated daily goal.")
        }
        Commands::Reset => {
            let outcome = service.reset_day()?;
            report(&service, outcome, "Reset today's log.")
        }
    }

    Ok(())
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Add { .. } => "add",
            Self::Quick { .. } => "quick",
            Self::Delete { .. } => "delete",
            Self::Goal { .. } => "goal",
            Self::Reset => "reset",
            Self::History => "history",
        }
    }
}

fn report<R: KvRepository>(
    service: &HydrationService<R>,
    outcome: MutationOutcome,
    applied_message: &str,
) {
    match outcome {
        MutationOutcome::Applied => println!("{applied_message}"),
        MutationOutcome::Ignored(rejection) => println!("Nothing changed ({rejection})."),
    }
    print_status(service.state());
}

fn print_status(state: &HydrationState) {
    println!(
        "{} {} / {} ml ({:.0}%)",
        progress_bar(state.progress_percent()),
        state.total_intake,
        state.daily_goal,
        state.progress_percent()
    );
    if state.goal_reached() {
        println!("Daily goal reached!");
    } else if state.total_intake > 0 {
        println!("{} ml to go.", state.remaining());
    }
}

fn print_history(state: &HydrationState) {
    if state.entries.is_empty() {
        println!("No drinks logged yet.");
        return;
    }
    for entry in &state.entries {
        println!("{:>8}  {:>6} ml  {}", entry.time, entry.amount, entry.id);
    }
    println!("Total: {} ml", state.total_intake);
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
