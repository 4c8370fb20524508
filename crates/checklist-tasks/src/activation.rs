//! Daily rollover, run whenever the application becomes active.
//!
//! Compares the stored `lastDate` with today. On a new day (or when no date
//! was ever stored) every done task is cleared in one flush, then today is
//! recorded. If the task flush fails the date is left alone so the next
//! activation retries the reset.
//!
//! Only the stored settings are written back; env overrides stay in memory.

use chrono::NaiveDate;
use checklist_settings::{Settings, SettingsStore};
use tracing::{debug, info};

use crate::errors::Result;
use crate::manager::TaskManager;
use crate::recurrence;
use crate::repository::TaskRepository;

/// What [`run_daily_check`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCheckOutcome {
    /// Whether a new day was detected.
    pub reset: bool,
    /// Tasks whose completion was cleared.
    pub cleared: usize,
    /// Settings in effect afterwards, env overrides included.
    pub settings: Settings,
}

/// Apply the daily reset if `today` differs from the stored last date.
pub fn run_daily_check<R: TaskRepository>(
    manager: &mut TaskManager<R>,
    settings_store: &SettingsStore,
    today: NaiveDate,
) -> Result<DailyCheckOutcome> {
    let stored = settings_store.load_stored();
    let previous = stored.last_processed_date;
    if !recurrence::must_reset_for_new_day(previous, today) {
        debug!(%today, "already processed today");
        return Ok(DailyCheckOutcome {
            reset: false,
            cleared: 0,
            settings: settings_store.overrides().apply(stored),
        });
    }

    let cleared = manager.reset_done_tasks()?;
    let stored = stored.processed_on(today);
    settings_store.save(&stored)?;
    info!(%today, ?previous, cleared, "new day processed");
    Ok(DailyCheckOutcome {
        reset: true,
        cleared,
        settings: settings_store.overrides().apply(stored),
    })
}
