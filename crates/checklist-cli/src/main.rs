//! # checklist
//!
//! Command-line front end for the daily checklist. Every invocation first
//! runs the daily rollover, then executes one command against the data
//! directory. Commands that change tasks or reminders end with a backup of
//! the task file.

#![deny(unsafe_code)]

mod app;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use checklist_settings::{DataPaths, SettingsStore, data_dir};

use crate::app::App;

/// Daily morning/evening checklist.
#[derive(Parser, Debug)]
#[command(name = "checklist", version, about = "Daily morning and evening checklist")]
struct Cli {
    /// Data directory (defaults to `$CHECKLIST_DATA_DIR` or `~/.dailychecklist`).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's morning and evening lists
    Today {
        /// Include weekday tasks for other days
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Put the task on the evening list
        #[arg(long, conflicts_with = "custom")]
        evening: bool,
        /// Put the task on a custom checklist (created if missing)
        #[arg(long, value_name = "CHECKLIST")]
        custom: Option<String>,
        /// Only show the task on this weekday
        #[arg(long)]
        weekday: Option<String>,
        /// Make the task a subtask of this task id
        #[arg(long, value_name = "TASK_ID")]
        parent: Option<String>,
        /// Attach a note
        #[arg(long)]
        note: Option<String>,
    },
    /// Mark a task done today
    Done { id: String },
    /// Clear a task's completion
    Undo { id: String },
    /// Remove a task and its subtasks
    Remove { id: String },
    /// List the subtasks of a task
    Subtasks { id: String },
    /// Search task names
    Search {
        query: String,
        /// Include weekday tasks for other days
        #[arg(long)]
        all: bool,
    },
    /// List custom checklists
    Checklists,
    /// Show weekday tasks on every day (on/off)
    ShowWeekdayTasks { value: String },
    /// Set a reminder for a task or a custom checklist
    Remind {
        /// Day, as YYYY-MM-DD
        date: String,
        /// Time of day, as HH:MM
        time: String,
        /// Remind about this task
        #[arg(long, value_name = "TASK_ID", conflicts_with = "checklist")]
        task: Option<String>,
        /// Remind about this custom checklist
        #[arg(long, value_name = "NAME")]
        checklist: Option<String>,
    },
    /// List reminders
    Reminders {
        /// Only reminders due soon or recently missed
        #[arg(long)]
        due: bool,
        /// How far ahead `--due` looks, in minutes
        #[arg(long, default_value_t = 15)]
        minutes: i64,
    },
    /// Delete a reminder by its number in `reminders`
    Unremind { index: usize },
    /// Back up the task file now
    Backup,
}

impl Command {
    fn changes_data(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Done { .. }
                | Self::Undo { .. }
                | Self::Remove { .. }
                | Self::Remind { .. }
                | Self::Unremind { .. }
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    checklist_core::logging::init_subscriber(&cli.log_level);

    let paths = DataPaths::new(cli.data_dir.clone().unwrap_or_else(data_dir));
    let settings_store = SettingsStore::new(paths.settings_file());
    let mut app = App::open(&paths, settings_store, chrono::Local::now().naive_local());

    let changes_data = cli.command.changes_data();
    let output = app.run(cli.command)?;
    print!("{output}");
    if changes_data {
        let _ = app.shutdown();
    }
    Ok(())
}
