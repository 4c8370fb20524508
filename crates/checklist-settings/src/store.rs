//! File-backed settings store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::Result;
use crate::loader::{EnvOverrides, parse_settings, render_settings};
use crate::types::Settings;

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
    overrides: EnvOverrides,
}

impl SettingsStore {
    /// Store backed by the file at `path`, with overrides from the process
    /// environment.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overrides: EnvOverrides::from_env(),
        }
    }

    /// Replace the environment overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overrides laid over the stored values by [`SettingsStore::load`].
    pub fn overrides(&self) -> &EnvOverrides {
        &self.overrides
    }

    /// Settings in effect: the stored values with env overrides applied.
    ///
    /// Never save the result; overrides belong to this process only. Use
    /// [`SettingsStore::load_stored`] as the base for changes.
    pub fn load(&self) -> Settings {
        self.overrides.apply(self.load_stored())
    }

    /// Stored settings, falling back to defaults on any failure.
    ///
    /// A missing file is the normal first-run case and is not logged as a
    /// problem; unreadable or malformed files are logged and replaced by
    /// defaults.
    pub fn load_stored(&self) -> Settings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "settings unusable, using defaults");
                Settings::default()
            }
        }
    }

    /// Load settings, reporting unreadable or malformed files as errors.
    ///
    /// A missing file yields defaults.
    pub fn try_load(&self) -> Result<Settings> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                debug!(path = %self.path.display(), "loading settings");
                parse_settings(&text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file not found, using defaults");
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the settings file.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        checklist_core::fs::write_atomic(&self.path, render_settings(settings).as_bytes())?;
        debug!(
            path = %self.path.display(),
            last_date = ?settings.last_processed_date,
            "settings saved"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use checklist_core::logging::capture_logs;
    use tracing::Level;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.properties"))
            .with_overrides(EnvOverrides::default())
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.try_load().unwrap(), Settings::default());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let settings = Settings {
            show_weekday_tasks: true,
            last_processed_date: NaiveDate::from_ymd_opt(2025, 11, 19),
        };
        store.save(&settings).unwrap();
        assert_eq!(store.try_load().unwrap(), settings);
    }

    #[test]
    fn malformed_file_recovers_to_defaults_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "showWeekdayTasks=true\nlastDate=yesterday\n").unwrap();

        assert_matches!(store.try_load(), Err(SettingsError::Malformed { .. }));

        let (logs, _guard) = capture_logs();
        assert_eq!(store.load(), Settings::default());
        assert!(logs.has_event(Level::WARN, "settings unusable"));
    }

    #[test]
    fn unreadable_file_recovers_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // A directory at the settings path cannot be read as text
        std::fs::create_dir(store.path()).unwrap();
        assert_matches!(store.try_load(), Err(SettingsError::Io(_)));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_surfaces_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = SettingsStore::new(blocker.join("settings.properties"));
        assert_matches!(store.save(&Settings::default()), Err(SettingsError::Io(_)));
    }

    #[test]
    fn overrides_show_in_load_but_not_in_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).with_overrides(EnvOverrides {
            show_weekday_tasks: Some(true),
        });
        store.save(&Settings::default()).unwrap();

        assert!(store.load().show_weekday_tasks);
        assert!(!store.load_stored().show_weekday_tasks);
        assert!(!store.try_load().unwrap().show_weekday_tasks);
    }
}
