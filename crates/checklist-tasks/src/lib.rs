//! # checklist-tasks
//!
//! Task store and recurrence engine for the daily checklist.
//!
//! - [`TaskStore`]: tasks indexed by id plus a parent → children index
//! - [`XmlTaskRepository`]: whole-collection persistence to `tasks.xml`
//! - [`TaskManager`]: mutations with write-through persistence, queries
//! - [`recurrence`]: which tasks show today, when completion rolls over
//! - [`run_daily_check`]: the rollover applied on each activation
//! - [`ChecklistRegistry`]: display names of custom checklists
//! - [`ReminderStore`]: timed reminders in `reminders.properties`
//! - [`BackupManager`]: timestamped, checksummed copies of `tasks.xml`

#![deny(unsafe_code)]

pub mod activation;
pub mod backup;
pub mod checklists;
pub mod errors;
pub mod manager;
pub mod recurrence;
pub mod reminders;
pub mod repository;
pub mod store;
pub mod types;
pub mod validation;

pub use activation::{DailyCheckOutcome, run_daily_check};
pub use backup::BackupManager;
pub use checklists::{ChecklistRegistry, UNTITLED_CHECKLIST};
pub use errors::{Result, TaskError};
pub use manager::TaskManager;
pub use recurrence::DailyLists;
pub use reminders::{MAX_REMINDERS, ReminderStore};
pub use repository::{TaskRepository, XmlTaskRepository};
pub use store::TaskStore;
pub use types::{Checklist, Reminder, Task, TaskType, is_daily_list_name};
pub use validation::validate_name;
