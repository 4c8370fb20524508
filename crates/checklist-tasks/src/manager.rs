//! Task manager: the single entry point for reading and mutating tasks.
//!
//! Every mutation updates the in-memory [`TaskStore`] first and then flushes
//! the whole collection through the [`TaskRepository`]. If the flush fails
//! the change stays in memory and [`TaskError::PersistenceWrite`] is
//! returned; calling [`TaskManager::flush`] again retries it.
//!
//! Reminders and checklist names are kept in their own stores, each saved
//! as soon as it changes.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use checklist_core::TaskId;
use tracing::{debug, info, warn};

use crate::checklists::ChecklistRegistry;
use crate::errors::{Result, TaskError};
use crate::recurrence::{self, DailyLists};
use crate::reminders::ReminderStore;
use crate::repository::TaskRepository;
use crate::store::TaskStore;
use crate::types::{Reminder, Task, TaskType, is_daily_list_name};

/// Orchestrates the task store, its persistence, the checklist registry,
/// and reminders.
#[derive(Debug)]
pub struct TaskManager<R> {
    store: TaskStore,
    repository: R,
    checklists: ChecklistRegistry,
    reminders: ReminderStore,
}

impl<R: TaskRepository> TaskManager<R> {
    /// Load every task from `repository`.
    ///
    /// Duplicate ids and looping parent links in the stored data are
    /// repaired with a warning rather than rejected.
    pub fn open(repository: R, checklists: ChecklistRegistry) -> Self {
        let store = TaskStore::from_loaded(repository.load());
        debug!(tasks = store.len(), checklists = checklists.len(), "task manager opened");
        Self {
            store,
            repository,
            checklists,
            reminders: ReminderStore::in_memory(),
        }
    }

    /// Use `reminders` instead of an empty in-memory reminder store.
    #[must_use]
    pub fn with_reminders(mut self, reminders: ReminderStore) -> Self {
        self.reminders = reminders;
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a task and persist. Returns its id.
    pub fn add_task(&mut self, task: Task) -> Result<TaskId> {
        let id = task.id.clone();
        self.store.insert(task)?;
        self.flush()?;
        Ok(id)
    }

    /// Replace an existing task (matched by id) and persist.
    pub fn update_task(&mut self, task: Task) -> Result<()> {
        let _ = self.store.update(task)?;
        self.flush()
    }

    /// Replace several tasks with a single flush.
    ///
    /// Unknown ids are rejected before anything changes. A cycle error stops
    /// at the offending task; earlier updates in the batch stay applied in
    /// memory and are not flushed.
    pub fn update_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        if let Some(missing) = tasks.iter().find(|t| !self.store.contains(&t.id)) {
            return Err(TaskError::task_not_found(missing.id.as_str()));
        }
        if tasks.is_empty() {
            return Ok(());
        }
        for task in tasks {
            let _ = self.store.update(task)?;
        }
        self.flush()
    }

    /// Remove a task and all its descendants, then persist. Returns how many
    /// tasks were removed; an unknown id removes nothing and writes nothing.
    pub fn remove_task(&mut self, id: &str) -> Result<usize> {
        let removed = self.store.remove(id);
        if removed.is_empty() {
            debug!(task_id = id, "remove of unknown task ignored");
            return Ok(0);
        }
        debug!(task_id = id, removed = removed.len(), "task removed");
        self.flush()?;
        Ok(removed.len())
    }

    /// Replace the whole collection and persist.
    ///
    /// The current store file is backed up first. Checklists referenced by
    /// the new tasks but not yet registered are added to the registry.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        let _ = self.repository.backup("set-tasks");
        self.store.replace_all(tasks)?;
        if let Err(e) = self.checklists.register_from_tasks(self.store.all()) {
            warn!(error = %e, "could not update checklist registry");
        }
        info!(tasks = self.store.len(), "task collection replaced");
        self.flush()
    }

    /// Move a task and its subtasks into a custom checklist.
    pub fn move_task_to_checklist(&mut self, id: &str, checklist_id: &str) -> Result<()> {
        if !self.store.contains(id) {
            return Err(TaskError::task_not_found(id));
        }
        let checklist = self
            .checklists
            .get_by_id(checklist_id)
            .ok_or_else(|| TaskError::checklist_not_found(checklist_id))?
            .id
            .clone();

        for member in self.store.subtree_ids(id) {
            if let Some(task) = self.store.get(&member) {
                let mut moved = task.clone();
                moved.task_type = TaskType::Custom;
                moved.checklist_id = Some(checklist.clone());
                let _ = self.store.update(moved)?;
            }
        }
        debug!(task_id = id, checklist_id = %checklist, "task moved");
        self.flush()
    }

    /// Set or clear completion on every direct subtask of `parent_id` with a
    /// single flush. Returns how many subtasks were touched.
    pub fn mark_all_subtasks_done(
        &mut self,
        parent_id: &str,
        done: bool,
        date: Option<NaiveDate>,
    ) -> Result<usize> {
        if !self.store.contains(parent_id) {
            return Err(TaskError::task_not_found(parent_id));
        }
        let children: Vec<Task> = self.store.children_of(parent_id).into_iter().cloned().collect();
        if children.is_empty() {
            return Ok(0);
        }
        let count = children.len();
        for mut child in children {
            child.set_done(done, date);
            let _ = self.store.update(child)?;
        }
        self.flush()?;
        Ok(count)
    }

    /// Clear completion on every done task (the daily reset). Writes once,
    /// and only if something changed. Returns how many were cleared.
    pub fn reset_done_tasks(&mut self) -> Result<usize> {
        let done: Vec<Task> = recurrence::tasks_to_reset(self.store.all())
            .into_iter()
            .cloned()
            .collect();
        if done.is_empty() {
            return Ok(0);
        }
        let count = done.len();
        for mut task in done {
            task.mark_undone();
            let _ = self.store.update(task)?;
        }
        info!(cleared = count, "completion flags reset for new day");
        self.flush()?;
        Ok(count)
    }

    /// Write the current collection to the repository.
    pub fn flush(&self) -> Result<()> {
        let tasks: Vec<&Task> = self.store.all().collect();
        self.repository.save(&tasks)
    }

    /// Back up the store on request. Returns the backup's location.
    pub fn create_manual_backup(&self) -> Option<PathBuf> {
        self.repository.backup("manual")
    }

    /// Back up the store at the end of a session.
    pub fn shutdown(&self) -> Option<PathBuf> {
        self.repository.backup("shutdown")
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reminders
    // ─────────────────────────────────────────────────────────────────────

    /// Store a reminder. A targeted task must exist, and so must the
    /// checklist it refers to.
    pub fn add_reminder(&mut self, reminder: Reminder) -> Result<()> {
        if let Some(task_id) = &reminder.task_id {
            if !self.store.contains(task_id) {
                return Err(TaskError::task_not_found(task_id.as_str()));
            }
        }
        if !self.checklist_exists(&reminder.checklist) {
            return Err(TaskError::checklist_not_found(reminder.checklist));
        }
        debug!(checklist = %reminder.checklist, at = %reminder.at, "reminder added");
        self.reminders.add(reminder)
    }

    /// Remove a reminder. Returns how many matching entries were removed.
    pub fn remove_reminder(&mut self, reminder: &Reminder) -> Result<usize> {
        self.reminders.remove(reminder)
    }

    /// Every reminder.
    pub fn get_reminders(&self) -> &[Reminder] {
        self.reminders.all()
    }

    /// The reminder targeting `task_id`, if any.
    pub fn get_reminder_for_task(&self, task_id: &str) -> Option<&Reminder> {
        self.reminders.for_task(task_id)
    }

    /// Reminders due within `minutes_ahead` of `now`, or recently overdue.
    pub fn get_due_reminders(
        &self,
        now: NaiveDateTime,
        minutes_ahead: i64,
        opened: &HashSet<String>,
    ) -> Vec<&Reminder> {
        self.reminders
            .due(now, minutes_ahead, opened, |c| self.checklist_exists(c))
    }

    /// When the next reminder for an unopened checklist falls due.
    pub fn get_next_reminder_time(&self, now: NaiveDateTime, opened: &HashSet<String>) -> Option<NaiveDateTime> {
        self.reminders.next_time(now, opened, |c| self.checklist_exists(c))
    }

    /// Whether `checklist` has reminders.
    pub fn has_reminders(&self, checklist: &str) -> bool {
        self.reminders.has_reminders(checklist, |c| self.checklist_exists(c))
    }

    /// Whether a reminder's checklist reference points at something: a
    /// daily list, or a registered checklist by id or name.
    pub fn checklist_exists(&self, reference: &str) -> bool {
        is_daily_list_name(reference) || self.checklists.resolves(reference)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Every task, in store order.
    pub fn get_all_tasks(&self) -> Vec<&Task> {
        self.store.all().collect()
    }

    /// Look up a task.
    pub fn get_task_by_id(&self, id: &str) -> Option<&Task> {
        self.store.get(id)
    }

    /// Direct subtasks of `parent_id`, in insertion order.
    pub fn get_subtasks(&self, parent_id: &str) -> Vec<&Task> {
        self.store.children_of(parent_id)
    }

    /// Whether `parent_id` has subtasks and every one of them is done.
    pub fn are_all_subtasks_done(&self, parent_id: &str) -> bool {
        let children = self.store.children_of(parent_id);
        !children.is_empty() && children.iter().all(|t| t.is_done())
    }

    /// Whether any task is still open.
    pub fn has_undone_tasks(&self) -> bool {
        self.store.all().any(|t| !t.is_done())
    }

    /// Tasks active on `today`, store order.
    pub fn get_daily_tasks(&self, today: NaiveDate, show_all_weekday_tasks: bool) -> Vec<&Task> {
        recurrence::daily_tasks(self.store.all(), today, show_all_weekday_tasks)
    }

    /// Today's morning and evening lists.
    pub fn daily_lists(&self, today: NaiveDate, show_all_weekday_tasks: bool) -> DailyLists<'_> {
        recurrence::daily_lists(self.store.all(), today, show_all_weekday_tasks)
    }

    /// Tasks of one type. For [`TaskType::Custom`] with a checklist, only
    /// that checklist's tasks.
    pub fn get_tasks(&self, task_type: TaskType, checklist_id: Option<&str>) -> Vec<&Task> {
        self.store
            .all()
            .filter(|t| t.task_type == task_type)
            .filter(|t| match (task_type, checklist_id) {
                (TaskType::Custom, Some(wanted)) => t.checklist_id.as_deref() == Some(wanted),
                _ => true,
            })
            .collect()
    }

    /// Case-insensitive name search over tasks active on `today`.
    pub fn search(&self, query: &str, today: NaiveDate, include_all_weekday: bool) -> Vec<&Task> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        recurrence::daily_tasks(self.store.all(), today, include_all_weekday)
            .into_iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// The checklist registry.
    pub fn checklists(&self) -> &ChecklistRegistry {
        &self.checklists
    }

    /// Mutable access to the checklist registry.
    pub fn checklists_mut(&mut self) -> &mut ChecklistRegistry {
        &mut self.checklists
    }

    /// The backing repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
