//! Reminder storage and due-time queries.
//!
//! Reminders live in `reminders.properties` as
//! `reminder.N=checklist,year,month,day,hour,minute[,taskId]`. Older data
//! directories kept them as `<reminder>` elements inside `tasks.xml`; those
//! are imported once, the first time the properties file is empty.
//!
//! Queries take the current time and a predicate telling whether a
//! checklist reference still exists, so the store itself never looks at the
//! clock or the checklist registry.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use checklist_settings::{parse_properties, render_properties};
use tracing::{debug, info, warn};

use crate::errors::{Result, TaskError};
use crate::types::{Reminder, is_daily_list_name};

/// Upper bound on stored reminders.
pub const MAX_REMINDERS: usize = 10_000;

/// Overdue reminders older than this are no longer reported as due.
pub const OVERDUE_GRACE_MINUTES: i64 = 60;

const FILE_HEADER: &str = "Daily Checklist Reminders";
const KEY_PREFIX: &str = "reminder.";

/// Persisted reminders, in file order.
#[derive(Debug, Default)]
pub struct ReminderStore {
    path: Option<PathBuf>,
    reminders: Vec<Reminder>,
}

impl ReminderStore {
    /// Store backed by `path`. A missing or unreadable file starts empty;
    /// lines that do not describe a valid reminder are skipped.
    ///
    /// Checklist-wide reminders for the morning or evening list are dropped
    /// and the file rewritten without them.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut reminders = Vec::new();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                for (key, value) in parse_properties(&text) {
                    if reminders.len() >= MAX_REMINDERS {
                        warn!(path = %path.display(), limit = MAX_REMINDERS, "reminder limit reached, ignoring the rest");
                        break;
                    }
                    match parse_reminder(&value) {
                        Some(reminder) => reminders.push(reminder),
                        None => warn!(path = %path.display(), %key, %value, "skipping unreadable reminder"),
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "reminders unreadable"),
        }

        let mut store = Self {
            path: Some(path),
            reminders,
        };
        if store.drop_daily_list_wide() > 0 {
            if let Err(e) = store.save() {
                warn!(error = %e, "could not rewrite reminders");
            }
        }
        debug!(count = store.len(), "reminders loaded");
        store
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Seed an empty store from reminders found in an older task file.
    /// Returns how many were imported; a store that already holds reminders
    /// is left alone.
    pub fn import_legacy(&mut self, legacy: Vec<Reminder>) -> Result<usize> {
        if !self.reminders.is_empty() || legacy.is_empty() {
            return Ok(0);
        }
        self.reminders = legacy;
        self.reminders.truncate(MAX_REMINDERS);
        let _ = self.drop_daily_list_wide();
        self.save()?;
        info!(count = self.reminders.len(), "legacy reminders imported");
        Ok(self.reminders.len())
    }

    /// Every reminder, in file order.
    pub fn all(&self) -> &[Reminder] {
        &self.reminders
    }

    /// Number of reminders.
    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    /// Whether there are no reminders.
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// First reminder targeting `task_id`.
    pub fn for_task(&self, task_id: &str) -> Option<&Reminder> {
        self.reminders
            .iter()
            .find(|r| r.task_id.as_deref() == Some(task_id))
    }

    /// Append a reminder and save.
    pub fn add(&mut self, reminder: Reminder) -> Result<()> {
        if reminder.is_daily_list_wide() {
            return Err(TaskError::InvalidInput(
                "morning and evening reminders must target a task".into(),
            ));
        }
        if self.reminders.len() >= MAX_REMINDERS {
            return Err(TaskError::InvalidInput(format!(
                "at most {MAX_REMINDERS} reminders can be stored"
            )));
        }
        self.reminders.push(reminder);
        self.save()
    }

    /// Remove every reminder equal to `reminder` and save. Returns how many
    /// were removed; nothing is written when that is zero.
    pub fn remove(&mut self, reminder: &Reminder) -> Result<usize> {
        let before = self.reminders.len();
        self.reminders.retain(|r| r != reminder);
        let removed = before - self.reminders.len();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    /// Reminders due around `now`.
    ///
    /// A reminder is due when it falls within the next `minutes_ahead`
    /// minutes, or is overdue by less than [`OVERDUE_GRACE_MINUTES`].
    /// Upcoming reminders for a checklist in `opened` are left out; overdue
    /// ones are always reported. Reminders whose checklist no longer exists
    /// are skipped.
    pub fn due<F>(
        &self,
        now: NaiveDateTime,
        minutes_ahead: i64,
        opened: &HashSet<String>,
        exists: F,
    ) -> Vec<&Reminder>
    where
        F: Fn(&str) -> bool,
    {
        let horizon = now + Duration::minutes(minutes_ahead);
        let grace = now - Duration::minutes(OVERDUE_GRACE_MINUTES);
        self.reminders
            .iter()
            .filter(|r| is_live(r, &exists))
            .filter(|r| {
                let upcoming = r.at > now && r.at <= horizon;
                let overdue = r.at <= now && r.at > grace;
                overdue || (upcoming && !opened.contains(&r.checklist))
            })
            .collect()
    }

    /// Earliest future reminder time among checklists not in `opened`.
    pub fn next_time<F>(&self, now: NaiveDateTime, opened: &HashSet<String>, exists: F) -> Option<NaiveDateTime>
    where
        F: Fn(&str) -> bool,
    {
        self.reminders
            .iter()
            .filter(|r| is_live(r, &exists))
            .filter(|r| !opened.contains(&r.checklist) && r.at > now)
            .map(|r| r.at)
            .min()
    }

    /// Whether `checklist` has any reminder. For the daily lists only
    /// task-level reminders count.
    pub fn has_reminders<F>(&self, checklist: &str, exists: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        exists(checklist)
            && self
                .reminders
                .iter()
                .any(|r| r.checklist == checklist && (r.task_id.is_some() || !is_daily_list_name(checklist)))
    }

    fn drop_daily_list_wide(&mut self) -> usize {
        let before = self.reminders.len();
        self.reminders.retain(|r| !r.is_daily_list_wide());
        let dropped = before - self.reminders.len();
        if dropped > 0 {
            info!(dropped, "removed checklist-wide reminders for the daily lists");
        }
        dropped
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let pairs: Vec<(String, String)> = self
            .reminders
            .iter()
            .enumerate()
            .map(|(i, r)| (format!("{KEY_PREFIX}{i}"), render_reminder(r)))
            .collect();
        checklist_core::fs::write_atomic(path, render_properties(FILE_HEADER, &pairs).as_bytes())
            .map_err(|e| TaskError::write(path, e))?;
        debug!(path = %path.display(), count = pairs.len(), "reminders saved");
        Ok(())
    }
}

fn is_live<F>(reminder: &Reminder, exists: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    !reminder.is_daily_list_wide() && exists(&reminder.checklist)
}

fn parse_reminder(value: &str) -> Option<Reminder> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() < 6 {
        return None;
    }
    Reminder::from_parts(
        parts[0],
        [parts[1], parts[2], parts[3], parts[4], parts[5]],
        parts.get(6).copied(),
    )
}

fn render_reminder(reminder: &Reminder) -> String {
    let at = reminder.at;
    let mut value = format!(
        "{},{},{},{},{},{}",
        reminder.checklist,
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute()
    );
    if let Some(task_id) = &reminder.task_id {
        value.push(',');
        value.push_str(task_id);
    }
    value
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
