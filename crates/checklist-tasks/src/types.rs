//! Core types: tasks, their recurrence window, custom checklists, and
//! reminders.
//!
//! Serializable types use `camelCase` so JSON output matches the field names
//! of the XML store.

use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use checklist_core::{ChecklistId, TaskId};
use serde::{Deserialize, Serialize};

use crate::errors::TaskError;

// ─────────────────────────────────────────────────────────────────────────────
// TaskType
// ─────────────────────────────────────────────────────────────────────────────

/// Recurrence window a task is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskType {
    /// Daily morning list.
    Morning,
    /// Daily evening list.
    Evening,
    /// A user-defined checklist.
    Custom,
}

impl TaskType {
    /// Tag written to the store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Evening => "EVENING",
            Self::Custom => "CUSTOM",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MORNING" => Ok(Self::Morning),
            "EVENING" => Ok(Self::Evening),
            "CUSTOM" => Ok(Self::Custom),
            other => Err(TaskError::InvalidInput(format!("unknown task type: {other:?}"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────────────────

/// A checklist entry.
///
/// `done_date` is only ever present while `done` is true; the completion
/// fields are private so every change goes through [`Task::set_done`].
/// Subtasks are not stored here: they are derived from `parent_id` by the
/// [`TaskStore`](crate::store::TaskStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier.
    pub id: TaskId,
    /// Display text; may be empty.
    pub name: String,
    /// Recurrence window.
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Lowercase or mixed-case weekday name; `None` means every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    /// Owning custom checklist; `None` for the built-in daily lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_id: Option<ChecklistId>,
    /// Parent task for subtasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    done_date: Option<NaiveDate>,
    /// Free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Task {
    /// New undone task with a fresh id.
    pub fn new(name: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            task_type,
            weekday: None,
            checklist_id: None,
            parent_id: None,
            done: false,
            done_date: None,
            note: None,
        }
    }

    /// Replace the id (used when the caller already has one).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    /// Restrict to a weekday. Blank input clears the restriction.
    #[must_use]
    pub fn with_weekday(mut self, weekday: impl Into<String>) -> Self {
        self.set_weekday(Some(weekday.into()));
        self
    }

    /// Assign to a custom checklist.
    #[must_use]
    pub fn with_checklist(mut self, checklist_id: impl Into<ChecklistId>) -> Self {
        self.checklist_id = Some(checklist_id.into());
        self
    }

    /// Make this a subtask of `parent_id`.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<TaskId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into()).filter(|n| !n.trim().is_empty());
        self
    }

    /// Set or clear the weekday restriction; blank values clear it.
    pub fn set_weekday(&mut self, weekday: Option<String>) {
        self.weekday = weekday
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
    }

    /// Completion flag.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Date the task was completed, if recorded.
    pub fn done_date(&self) -> Option<NaiveDate> {
        self.done_date
    }

    /// Update completion.
    ///
    /// Clearing `done` always clears the date. Setting it keeps only the
    /// date supplied; there is no implicit "today".
    pub fn set_done(&mut self, done: bool, date: Option<NaiveDate>) {
        self.done = done;
        self.done_date = if done { date } else { None };
    }

    /// Mark done on `date`.
    pub fn mark_done_on(&mut self, date: NaiveDate) {
        self.set_done(true, Some(date));
    }

    /// Clear completion.
    pub fn mark_undone(&mut self) {
        self.set_done(false, None);
    }

    /// Whether this task has a parent.
    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Whether this task is limited to one weekday.
    pub fn is_weekday_task(&self) -> bool {
        self.weekday.is_some()
    }

    /// Whether the note has any content.
    pub fn has_note(&self) -> bool {
        self.note.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// The list this task belongs to as a reminder refers to it: the
    /// checklist id for custom tasks, otherwise `MORNING` or `EVENING`.
    pub fn list_reference(&self) -> String {
        match (&self.task_type, &self.checklist_id) {
            (TaskType::Custom, Some(checklist)) => checklist.to_string(),
            (task_type, _) => task_type.as_str().to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checklist
// ─────────────────────────────────────────────────────────────────────────────

/// A user-defined checklist. Identity is the id alone; renaming never
/// changes equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    /// Immutable identifier.
    pub id: ChecklistId,
    /// Display name (trimmed).
    pub name: String,
}

impl Checklist {
    /// New checklist with a fresh id.
    pub fn new(name: &str) -> Self {
        Self::with_id(ChecklistId::new(), name)
    }

    /// Checklist with a known id.
    pub fn with_id(id: impl Into<ChecklistId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.trim().to_string(),
        }
    }

    /// Rename; surrounding whitespace is dropped.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }
}

impl PartialEq for Checklist {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Checklist {}

impl Hash for Checklist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reminder
// ─────────────────────────────────────────────────────────────────────────────

/// Whether `name` refers to one of the built-in daily lists.
pub fn is_daily_list_name(name: &str) -> bool {
    [TaskType::Morning, TaskType::Evening]
        .iter()
        .any(|t| name.trim().eq_ignore_ascii_case(t.as_str()))
}

/// A dated prompt for a checklist, or for one task in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reminder {
    /// Checklist reference: a custom checklist id or name, or
    /// `MORNING`/`EVENING`.
    pub checklist: String,
    /// Local date and time the reminder is due, to the minute.
    pub at: NaiveDateTime,
    /// Target task; `None` covers the whole checklist.
    pub task_id: Option<TaskId>,
}

impl Reminder {
    /// Reminder for a whole checklist.
    pub fn for_checklist(checklist: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            checklist: checklist.into(),
            at,
            task_id: None,
        }
    }

    /// Target one task. A blank id keeps the reminder checklist-wide.
    #[must_use]
    pub fn with_task(mut self, task_id: impl Into<TaskId>) -> Self {
        let task_id = task_id.into();
        self.task_id = (!task_id.trim().is_empty()).then_some(task_id);
        self
    }

    /// Whether this covers a whole morning or evening list. Only task-level
    /// reminders are kept for those.
    pub fn is_daily_list_wide(&self) -> bool {
        self.task_id.is_none() && is_daily_list_name(&self.checklist)
    }

    /// Build from textual parts: year, month, day, hour and minute.
    /// `None` when a number or the resulting date is invalid, or the
    /// checklist is blank.
    pub(crate) fn from_parts(checklist: &str, numbers: [&str; 5], task_id: Option<&str>) -> Option<Self> {
        let [year, month, day, hour, minute] = numbers;
        let date = NaiveDate::from_ymd_opt(
            year.trim().parse().ok()?,
            month.trim().parse().ok()?,
            day.trim().parse().ok()?,
        )?;
        let at = date.and_hms_opt(hour.trim().parse().ok()?, minute.trim().parse().ok()?, 0)?;
        if checklist.trim().is_empty() {
            return None;
        }
        let reminder = Self::for_checklist(checklist, at);
        Some(match task_id {
            Some(task_id) => reminder.with_task(task_id),
            None => reminder,
        })
    }

    /// Build from the attributes of a legacy `<reminder>` element.
    pub(crate) fn from_attributes(attributes: &[(String, String)]) -> Option<Self> {
        let get = |key: &str| {
            attributes
                .iter()
                .find_map(|(k, v)| (k == key).then_some(v.as_str()))
        };
        Self::from_parts(
            get("checklistName")?,
            [get("year")?, get("month")?, get("day")?, get("hour")?, get("minute")?],
            get("taskId"),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
