//! Error types for the task store.

use std::path::{Path, PathBuf};

use checklist_core::TaskId;
use checklist_settings::SettingsError;
use thiserror::Error;

/// Errors from task store operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type ("Task" or "Checklist").
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// Insert with an id that is already present.
    #[error("duplicate task id: {0}")]
    DuplicateId(TaskId),

    /// A parent link that would close a loop.
    #[error("cycle: task {task_id} cannot have parent {parent_id}")]
    Cycle {
        /// The task being linked.
        task_id: TaskId,
        /// The requested parent.
        parent_id: TaskId,
    },

    /// The durable store could not be read or parsed.
    #[error("could not read {}: {reason}", path.display())]
    PersistenceRead {
        /// File that failed.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// The durable store could not be written. In-memory state has already
    /// been updated.
    #[error("could not save {}: {reason}", path.display())]
    PersistenceWrite {
        /// File that failed.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// Rejected user input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Settings could not be written during activation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl TaskError {
    /// Create a not-found error for a task.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Task",
            id: id.into(),
        }
    }

    /// Create a not-found error for a checklist.
    pub fn checklist_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Checklist",
            id: id.into(),
        }
    }

    pub(crate) fn read(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::PersistenceRead {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::PersistenceWrite {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a failed write whose in-memory change already applied.
    #[must_use]
    pub fn is_unsaved_change(&self) -> bool {
        matches!(self, Self::PersistenceWrite { .. })
    }
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = TaskError::task_not_found("t-1");
        assert_eq!(err.to_string(), "Task not found: t-1");
        let err = TaskError::checklist_not_found("c-1");
        assert_eq!(err.to_string(), "Checklist not found: c-1");
    }

    #[test]
    fn cycle_display() {
        let err = TaskError::Cycle {
            task_id: TaskId::from("a"),
            parent_id: TaskId::from("b"),
        };
        assert_eq!(err.to_string(), "cycle: task a cannot have parent b");
    }

    #[test]
    fn write_error_is_unsaved_change() {
        let err = TaskError::write(Path::new("/x/tasks.xml"), "disk full");
        assert!(err.is_unsaved_change());
        assert_eq!(err.to_string(), "could not save /x/tasks.xml: disk full");
        assert!(!TaskError::DuplicateId(TaskId::from("a")).is_unsaved_change());
    }

    #[test]
    fn settings_error_converts() {
        let io = std::io::Error::other("boom");
        let err: TaskError = SettingsError::from(io).into();
        assert!(matches!(err, TaskError::Settings(_)));
    }
}
