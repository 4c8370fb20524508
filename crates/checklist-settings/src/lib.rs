//! # checklist-settings
//!
//! Persistent user state for the daily checklist.
//!
//! Two values live in `settings.properties` inside the data directory:
//! - `showWeekdayTasks`: show weekday-restricted tasks on every day
//! - `lastDate`: the last day the daily reset ran (`YYYY-MM-DD`)
//!
//! Reading never fails: a missing or malformed file yields
//! [`Settings::default()`]. Writing is atomic and reports I/O errors.
//!
//! The data directory is `~/.dailychecklist` unless `CHECKLIST_DATA_DIR` is
//! set. `CHECKLIST_SHOW_WEEKDAY_TASKS` overrides the stored preference for
//! the running process without being saved.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod store;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{EnvOverrides, data_dir, data_dir_from, parse_bool, parse_properties, render_properties};
pub use store::SettingsStore;
pub use types::{DATE_FORMAT, DataPaths, Settings};
