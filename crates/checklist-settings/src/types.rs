//! Settings value and on-disk layout of the data directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Date format used for `lastDate` and every persisted done-date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persisted user state consulted on every activation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// Show weekday tasks on every day, not only their own.
    pub show_weekday_tasks: bool,
    /// Last day the daily reset ran, if ever.
    pub last_processed_date: Option<NaiveDate>,
}

impl Settings {
    /// Settings with today's date recorded as processed.
    #[must_use]
    pub fn processed_on(&self, today: NaiveDate) -> Self {
        Self {
            last_processed_date: Some(today),
            ..self.clone()
        }
    }
}

/// File locations inside the application data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Task store file name.
    pub const TASKS_FILE: &'static str = "tasks.xml";
    /// Settings file name.
    pub const SETTINGS_FILE: &'static str = "settings.properties";
    /// Checklist registry file name.
    pub const CHECKLISTS_FILE: &'static str = "checklist-names.properties";
    /// Reminder file name.
    pub const REMINDERS_FILE: &'static str = "reminders.properties";
    /// Backup directory name.
    pub const BACKUP_DIR: &'static str = "backups";

    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the task store.
    pub fn tasks_file(&self) -> PathBuf {
        self.root.join(Self::TASKS_FILE)
    }

    /// Path of the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.root.join(Self::SETTINGS_FILE)
    }

    /// Path of the checklist registry.
    pub fn checklists_file(&self) -> PathBuf {
        self.root.join(Self::CHECKLISTS_FILE)
    }

    /// Path of the reminder file.
    pub fn reminders_file(&self) -> PathBuf {
        self.root.join(Self::REMINDERS_FILE)
    }

    /// Directory holding task store backups.
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(Self::BACKUP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(!settings.show_weekday_tasks);
        assert!(settings.last_processed_date.is_none());
    }

    #[test]
    fn processed_on_keeps_preference() {
        let settings = Settings {
            show_weekday_tasks: true,
            last_processed_date: None,
        };
        let today = NaiveDate::from_ymd_opt(2025, 11, 19).unwrap();
        let next = settings.processed_on(today);
        assert!(next.show_weekday_tasks);
        assert_eq!(next.last_processed_date, Some(today));
    }

    #[test]
    fn data_paths_layout() {
        let paths = DataPaths::new("/data");
        assert_eq!(paths.tasks_file(), PathBuf::from("/data/tasks.xml"));
        assert_eq!(
            paths.settings_file(),
            PathBuf::from("/data/settings.properties")
        );
        assert_eq!(
            paths.checklists_file(),
            PathBuf::from("/data/checklist-names.properties")
        );
        assert_eq!(
            paths.reminders_file(),
            PathBuf::from("/data/reminders.properties")
        );
        assert_eq!(paths.backup_dir(), PathBuf::from("/data/backups"));
    }
}
