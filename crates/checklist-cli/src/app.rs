//! Command handlers over one data directory.
//!
//! Handlers return the text to print so `main` stays a thin shell.

use std::collections::HashSet;
use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use checklist_core::ChecklistId;
use checklist_settings::{DataPaths, Settings, SettingsStore, parse_bool};
use checklist_tasks::recurrence::weekday_name;
use checklist_tasks::{
    Checklist, ChecklistRegistry, Reminder, ReminderStore, Task, TaskManager, TaskType,
    XmlTaskRepository, is_daily_list_name, run_daily_check, validate_name,
};
use tracing::warn;

use crate::Command;
use crate::render;

/// An opened data directory plus the session clock.
pub(crate) struct App {
    manager: TaskManager<XmlTaskRepository>,
    settings_store: SettingsStore,
    settings: Settings,
    now: NaiveDateTime,
}

impl App {
    /// Open everything under `paths` and run the daily rollover for `now`.
    ///
    /// Reminders still kept inside an older `tasks.xml` are imported into
    /// an empty reminder file.
    pub(crate) fn open(paths: &DataPaths, settings_store: SettingsStore, now: NaiveDateTime) -> Self {
        let repository = XmlTaskRepository::from_paths(paths);
        let mut reminders = ReminderStore::open(paths.reminders_file());
        if let Err(e) = reminders.import_legacy(repository.legacy_reminders()) {
            warn!(error = %e, "legacy reminders not imported");
        }
        let mut manager = TaskManager::open(repository, ChecklistRegistry::open(paths.checklists_file()))
            .with_reminders(reminders);

        let settings = match run_daily_check(&mut manager, &settings_store, now.date()) {
            Ok(outcome) => outcome.settings,
            Err(e) => {
                warn!(error = %e, "daily check failed, will retry next run");
                settings_store.load()
            }
        };

        Self {
            manager,
            settings_store,
            settings,
            now,
        }
    }

    pub(crate) fn run(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Today { all, json } => self.show_today(all, json),
            Command::Add {
                name,
                evening,
                custom,
                weekday,
                parent,
                note,
            } => self.add(&name, evening, custom.as_deref(), weekday.as_deref(), parent.as_deref(), note),
            Command::Done { id } => self.set_done(&id, true),
            Command::Undo { id } => self.set_done(&id, false),
            Command::Remove { id } => self.remove(&id),
            Command::Subtasks { id } => self.subtasks(&id),
            Command::Search { query, all } => Ok(self.search(&query, all)),
            Command::Checklists => Ok(self.checklists()),
            Command::ShowWeekdayTasks { value } => self.show_weekday_tasks(&value),
            Command::Remind {
                date,
                time,
                task,
                checklist,
            } => self.remind(&date, &time, task.as_deref(), checklist.as_deref()),
            Command::Reminders { due, minutes } => Ok(self.reminders(due, minutes)),
            Command::Unremind { index } => self.unremind(index),
            Command::Backup => self.backup(),
        }
    }

    /// End-of-session backup of the task file.
    pub(crate) fn shutdown(&self) -> Option<PathBuf> {
        self.manager.shutdown()
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    fn show_all(&self, all: bool) -> bool {
        all || self.settings.show_weekday_tasks
    }

    fn show_today(&self, all: bool, json: bool) -> Result<String> {
        let today = self.today();
        let lists = self.manager.daily_lists(today, self.show_all(all));
        if json {
            return Ok(format!("{}\n", serde_json::to_string_pretty(&lists)?));
        }
        let mut out = format!("{today} ({})\n", weekday_name(today.weekday()));
        out.push_str(&render::section("Morning", &lists.morning));
        out.push_str(&render::section("Evening", &lists.evening));
        Ok(out)
    }

    fn add(
        &mut self,
        name: &str,
        evening: bool,
        custom: Option<&str>,
        weekday: Option<&str>,
        parent: Option<&str>,
        note: Option<String>,
    ) -> Result<String> {
        let name = validate_name(name)?;
        let mut task = Task::new(name, if evening { TaskType::Evening } else { TaskType::Morning });

        if let Some(checklist) = custom {
            task.task_type = TaskType::Custom;
            task.checklist_id = Some(self.checklist_named(checklist)?);
        }
        if let Some(day) = weekday {
            let day: Weekday = day.parse().map_err(|_| anyhow!("unknown weekday: {day}"))?;
            task = task.with_weekday(weekday_name(day));
        }
        if let Some(parent_id) = parent {
            // Subtasks live on their parent's list
            let parent = self
                .manager
                .get_task_by_id(parent_id)
                .with_context(|| format!("no task with id {parent_id}"))?;
            task.task_type = parent.task_type;
            task.checklist_id.clone_from(&parent.checklist_id);
            task = task.with_parent(parent.id.clone());
        }
        if let Some(note) = note {
            task = task.with_note(note);
        }

        let id = self.manager.add_task(task).context("could not save tasks")?;
        Ok(format!("{id}\n"))
    }

    fn checklist_named(&mut self, name: &str) -> Result<ChecklistId> {
        let name = validate_name(name)?;
        if let Some(existing) = self.manager.checklists().get_by_name(&name) {
            return Ok(existing.id.clone());
        }
        let checklist = Checklist::new(&name);
        let id = checklist.id.clone();
        self.manager
            .checklists_mut()
            .add(checklist)
            .context("could not save checklist names")?;
        Ok(id)
    }

    fn set_done(&mut self, id: &str, done: bool) -> Result<String> {
        let mut task = self
            .manager
            .get_task_by_id(id)
            .cloned()
            .with_context(|| format!("no task with id {id}"))?;
        if done {
            task.mark_done_on(self.today());
        } else {
            task.mark_undone();
        }
        self.manager.update_task(task).context("could not save tasks")?;

        let parent = self.manager.get_task_by_id(id).and_then(|t| t.parent_id.clone());
        match parent.filter(|p| done && self.manager.are_all_subtasks_done(p)) {
            Some(parent) => Ok(format!("all subtasks of #{parent} are done\n")),
            None => Ok(String::new()),
        }
    }

    fn remove(&mut self, id: &str) -> Result<String> {
        let removed = self.manager.remove_task(id).context("could not save tasks")?;
        if removed == 0 {
            bail!("no task with id {id}");
        }
        Ok(format!("removed {removed} task(s)\n"))
    }

    fn subtasks(&self, id: &str) -> Result<String> {
        let parent = self
            .manager
            .get_task_by_id(id)
            .with_context(|| format!("no task with id {id}"))?;
        let children = self.manager.get_subtasks(id);
        Ok(render::section(&parent.name, &children))
    }

    fn search(&self, query: &str, all: bool) -> String {
        let mut out = String::new();
        for task in self.manager.search(query, self.today(), self.show_all(all)) {
            let _ = writeln!(out, "{}", render::task_line(task, 0));
        }
        out
    }

    fn checklists(&self) -> String {
        let mut out = String::new();
        for checklist in self.manager.checklists().all() {
            let count = self
                .manager
                .get_tasks(TaskType::Custom, Some(checklist.id.as_str()))
                .len();
            let _ = writeln!(out, "{}  ({count} tasks)  #{}", checklist.name, checklist.id);
        }
        out
    }

    fn show_weekday_tasks(&mut self, value: &str) -> Result<String> {
        let show = parse_bool(value).with_context(|| format!("expected on or off, got {value:?}"))?;
        // Save over the stored values so env overrides never reach the file
        let stored = self.settings_store.load_stored();
        self.settings_store
            .save(&Settings {
                show_weekday_tasks: show,
                ..stored
            })
            .context("could not save settings")?;
        self.settings.show_weekday_tasks = self.settings_store.overrides().show_weekday_tasks.unwrap_or(show);
        Ok(String::new())
    }

    // ── Reminders ───────────────────────────────────────────────────

    fn remind(&mut self, date: &str, time: &str, task: Option<&str>, checklist: Option<&str>) -> Result<String> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| format!("expected YYYY-MM-DD, got {date:?}"))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M").with_context(|| format!("expected HH:MM, got {time:?}"))?;
        let at = date.and_time(time);

        let reminder = match (task, checklist) {
            (Some(task_id), None) => {
                let task = self
                    .manager
                    .get_task_by_id(task_id)
                    .with_context(|| format!("no task with id {task_id}"))?;
                Reminder::for_checklist(task.list_reference(), at).with_task(task.id.clone())
            }
            (None, Some(name)) => {
                if is_daily_list_name(name) {
                    bail!("reminders for the {name} list must target a task");
                }
                let checklists = self.manager.checklists();
                let checklist = checklists
                    .get_by_name(name)
                    .or_else(|| checklists.get_by_id(name))
                    .with_context(|| format!("no checklist named {name}"))?;
                Reminder::for_checklist(checklist.id.as_str(), at)
            }
            _ => bail!("pass exactly one of --task or --checklist"),
        };

        self.manager.add_reminder(reminder).context("could not save reminders")?;
        Ok(String::new())
    }

    fn reminders(&self, due: bool, minutes: i64) -> String {
        let opened = HashSet::new();
        let shown: Vec<&Reminder> = if due {
            self.manager.get_due_reminders(self.now, minutes, &opened)
        } else {
            self.manager.get_reminders().iter().collect()
        };

        let mut out = String::new();
        for (index, reminder) in self.manager.get_reminders().iter().enumerate() {
            if !shown.contains(&reminder) {
                continue;
            }
            let _ = write!(
                out,
                "{}  {}  {}",
                index + 1,
                reminder.at.format("%Y-%m-%d %H:%M"),
                self.checklist_label(&reminder.checklist)
            );
            if let Some(task) = reminder.task_id.as_deref().and_then(|id| self.manager.get_task_by_id(id)) {
                let _ = write!(out, "  {}", task.name);
            }
            out.push('\n');
        }
        if !due {
            if let Some(next) = self.manager.get_next_reminder_time(self.now, &opened) {
                let _ = writeln!(out, "next: {}", next.format("%Y-%m-%d %H:%M"));
            }
        }
        out
    }

    fn checklist_label(&self, reference: &str) -> String {
        if is_daily_list_name(reference) {
            return reference.trim().to_lowercase();
        }
        let checklists = self.manager.checklists();
        checklists
            .get_by_id(reference)
            .or_else(|| checklists.get_by_name(reference))
            .map_or_else(|| reference.to_string(), |c| c.name.clone())
    }

    fn unremind(&mut self, index: usize) -> Result<String> {
        let reminder = index
            .checked_sub(1)
            .and_then(|i| self.manager.get_reminders().get(i))
            .cloned()
            .with_context(|| format!("no reminder number {index}"))?;
        let _ = self
            .manager
            .remove_reminder(&reminder)
            .context("could not save reminders")?;
        Ok(String::new())
    }

    // ── Backups ─────────────────────────────────────────────────────

    fn backup(&self) -> Result<String> {
        let Some(path) = self.manager.create_manual_backup() else {
            bail!("nothing backed up; the task file may not exist yet");
        };
        let backups = self
            .manager
            .repository()
            .backups()
            .context("backups are disabled")?;
        if !backups.verify_backup(&path).context("could not read the backup")? {
            bail!("backup {} failed verification", path.display());
        }
        Ok(format!("{} (verified)\n", path.display()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
