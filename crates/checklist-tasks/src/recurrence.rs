//! Daily recurrence: which tasks are visible today, and when completion
//! flags roll over.
//!
//! Everything here is a pure function of its arguments. "Today" and the
//! show-all preference are always passed in; nothing reads the clock.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::types::{Task, TaskType};

/// Lowercase English name of `weekday`, as stored on tasks.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Whether `task` should be shown on `today`.
///
/// True for tasks with no weekday, for tasks whose weekday matches `today`
/// (case-insensitive), and for every task when `show_all_weekday_tasks` is set.
pub fn is_active_today(task: &Task, today: NaiveDate, show_all_weekday_tasks: bool) -> bool {
    match task.weekday.as_deref() {
        None => true,
        Some(day) if day.trim().is_empty() => true,
        Some(day) => {
            show_all_weekday_tasks
                || day.trim().eq_ignore_ascii_case(weekday_name(today.weekday()))
        }
    }
}

/// Tasks active on `today`, in input order.
pub fn daily_tasks<'a, I>(tasks: I, today: NaiveDate, show_all_weekday_tasks: bool) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| is_active_today(t, today, show_all_weekday_tasks))
        .collect()
}

/// Whether the daily reset is due. An absent last date always triggers it.
pub fn must_reset_for_new_day(last_processed: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_processed != Some(today)
}

/// Tasks whose completion must be cleared on a new day: every done task,
/// weekday-restricted or not.
pub fn tasks_to_reset<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|t| t.is_done()).collect()
}

/// Today's built-in lists.
#[derive(Debug, Default, Serialize)]
pub struct DailyLists<'a> {
    /// Active morning tasks, store order.
    pub morning: Vec<&'a Task>,
    /// Active evening tasks, store order.
    pub evening: Vec<&'a Task>,
}

/// Split active tasks into the morning and evening lists. Custom checklist
/// tasks are not part of either.
pub fn daily_lists<'a, I>(tasks: I, today: NaiveDate, show_all_weekday_tasks: bool) -> DailyLists<'a>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut lists = DailyLists::default();
    for task in daily_tasks(tasks, today, show_all_weekday_tasks) {
        match task.task_type {
            TaskType::Morning => lists.morning.push(task),
            TaskType::Evening => lists.evening.push(task),
            TaskType::Custom => {}
        }
    }
    lists
}
