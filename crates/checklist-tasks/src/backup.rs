//! Timestamped copies of the task store with rotation.
//!
//! Backups are named
//! `tasks-backup-{YYYYMMDD-HHMMSS-mmm}-{seq}-{reason}-{digest}.xml`. The
//! zero-padded sequence number orders copies taken within the same
//! millisecond, so a plain name sort is oldest-first. The digest is a
//! SHA-256 prefix of the copied bytes and lets a backup be checked for
//! corruption later.

use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

const BACKUP_PREFIX: &str = "tasks-backup-";
const BACKUP_EXT: &str = ".xml";
const DIGEST_LEN: usize = 16;

/// Number of backups kept after rotation.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Copies the task store into a backup directory and prunes old copies.
#[derive(Clone, Debug)]
pub struct BackupManager {
    dir: PathBuf,
    max_backups: usize,
}

impl BackupManager {
    /// Manager for `dir`, keeping [`DEFAULT_MAX_BACKUPS`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    /// Override how many backups survive rotation (at least one).
    #[must_use]
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups.max(1);
        self
    }

    /// Backup directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the backup directory, then rotate.
    ///
    /// Returns `Ok(None)` when `source` does not exist yet.
    pub fn create_backup(&self, source: &Path, reason: &str) -> io::Result<Option<PathBuf>> {
        if !source.is_file() {
            debug!(path = %source.display(), "nothing to back up");
            return Ok(None);
        }
        let contents = std::fs::read(source)?;
        std::fs::create_dir_all(&self.dir)?;

        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S-%3f");
        let same_instant = format!("{BACKUP_PREFIX}{stamp}-");
        let seq = self
            .list_backups()?
            .iter()
            .filter(|p| file_name(p).starts_with(&same_instant))
            .count();
        let target = self.dir.join(format!(
            "{same_instant}{seq:03}-{reason}-{digest}{BACKUP_EXT}",
            reason = sanitize_reason(reason),
            digest = digest(&contents),
        ));

        checklist_core::fs::write_atomic(&target, &contents)?;
        debug!(backup = %target.display(), "task store backed up");

        let _ = self.prune()?;
        Ok(Some(target))
    }

    /// Backup files, oldest first.
    pub fn list_backups(&self) -> io::Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut backups: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                let name = file_name(&path);
                (name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXT)).then_some(path)
            })
            .collect();
        backups.sort();
        Ok(backups)
    }

    /// Whether a backup's bytes still match the digest recorded in its name.
    /// Files without a recorded digest never verify.
    pub fn verify_backup(&self, backup: &Path) -> io::Result<bool> {
        let Some(recorded) = recorded_digest(backup) else {
            warn!(path = %backup.display(), "backup name carries no digest");
            return Ok(false);
        };
        let intact = digest(&std::fs::read(backup)?) == recorded;
        if !intact {
            warn!(path = %backup.display(), "backup contents do not match their digest");
        }
        Ok(intact)
    }

    /// Delete all but the newest `max_backups`. Returns how many were deleted.
    ///
    /// Individual deletion failures are logged and skipped.
    pub fn prune(&self) -> io::Result<usize> {
        let backups = self.list_backups()?;
        let excess = backups.len().saturating_sub(self.max_backups);
        let mut deleted = 0;
        for old in backups.iter().take(excess) {
            match std::fs::remove_file(old) {
                Ok(()) => deleted += 1,
                Err(e) => warn!(path = %old.display(), error = %e, "failed to delete old backup"),
            }
        }
        Ok(deleted)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn digest(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(DIGEST_LEN);
    hex
}

fn recorded_digest(path: &Path) -> Option<String> {
    let name = file_name(path);
    let stem = name.strip_suffix(BACKUP_EXT)?;
    let (_, recorded) = stem.rsplit_once('-')?;
    (recorded.len() == DIGEST_LEN && recorded.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| recorded.to_string())
}

fn sanitize_reason(reason: &str) -> String {
    let cleaned: String = reason
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "manual".to_string()
    } else {
        cleaned.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| file_name(p)).collect()
    }

    #[test]
    fn missing_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path().join("backups"));
        let result = manager.create_backup(&dir.path().join("tasks.xml"), "set-tasks");
        assert!(result.unwrap().is_none());
        assert!(!manager.dir().exists());
    }

    #[test]
    fn backup_copies_contents() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tasks.xml");
        std::fs::write(&source, "<tasks/>").unwrap();
        let manager = BackupManager::new(dir.path().join("backups"));

        let backup = manager.create_backup(&source, "Set Tasks").unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "<tasks/>");
        let name = file_name(&backup);
        assert!(name.starts_with(BACKUP_PREFIX));
        assert!(name.contains("-000-set-tasks-"), "{name}");
        assert!(manager.verify_backup(&backup).unwrap());
    }

    #[test]
    fn rapid_backups_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tasks.xml");
        std::fs::write(&source, "x").unwrap();
        let manager = BackupManager::new(dir.path().join("backups"));
        for _ in 0..3 {
            let _ = manager.create_backup(&source, "same").unwrap();
        }
        assert_eq!(manager.list_backups().unwrap().len(), 3);
    }

    #[test]
    fn prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        std::fs::create_dir_all(&backups).unwrap();
        for i in 1..=5 {
            let name = format!("{BACKUP_PREFIX}2026010{i}-120000-000-manual{BACKUP_EXT}");
            std::fs::write(backups.join(name), "b").unwrap();
        }
        std::fs::write(backups.join("notes.txt"), "keep me").unwrap();

        let manager = BackupManager::new(&backups).with_max_backups(3);
        assert_eq!(manager.prune().unwrap(), 2);

        let left = file_names(&manager.list_backups().unwrap());
        assert_eq!(left.len(), 3);
        assert!(left[0].contains("20260103"));
        assert!(left[2].contains("20260105"));
        assert!(backups.join("notes.txt").exists());
    }

    #[test]
    fn rotation_applies_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tasks.xml");
        std::fs::write(&source, "x").unwrap();
        let manager = BackupManager::new(dir.path().join("backups"));
        for _ in 0..(DEFAULT_MAX_BACKUPS + 3) {
            let _ = manager.create_backup(&source, "bulk").unwrap();
        }
        assert_eq!(manager.list_backups().unwrap().len(), DEFAULT_MAX_BACKUPS);
    }

    #[test]
    fn list_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path().join("nope"));
        assert!(manager.list_backups().unwrap().is_empty());
        assert_eq!(manager.prune().unwrap(), 0);
    }

    #[test]
    fn reason_is_sanitized() {
        assert_eq!(sanitize_reason("Set Tasks!"), "set-tasks");
        assert_eq!(sanitize_reason("  "), "manual");
        assert_eq!(sanitize_reason("../../etc"), "etc");
    }

    #[test]
    fn same_instant_backups_keep_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tasks.xml");
        let manager = BackupManager::new(dir.path().join("backups")).with_max_backups(2);
        for body in ["first", "second", "third"] {
            std::fs::write(&source, body).unwrap();
            manager.create_backup(&source, "same").unwrap();
        }
        let kept: Vec<String> = manager
            .list_backups()
            .unwrap()
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(kept, ["second", "third"]);
    }

    #[test]
    fn sequence_orders_before_reason() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        std::fs::create_dir_all(&backups).unwrap();
        let older = format!("{BACKUP_PREFIX}20260101-120000-000-000-zzz-0000000000000000{BACKUP_EXT}");
        let newer = format!("{BACKUP_PREFIX}20260101-120000-000-001-aaa-0000000000000000{BACKUP_EXT}");
        std::fs::write(backups.join(&newer), "n").unwrap();
        std::fs::write(backups.join(&older), "o").unwrap();
        let listed = file_names(&BackupManager::new(&backups).list_backups().unwrap());
        assert_eq!(listed, [older, newer]);
    }

    #[test]
    fn tampered_backup_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tasks.xml");
        std::fs::write(&source, "<tasks/>").unwrap();
        let manager = BackupManager::new(dir.path().join("backups"));
        let backup = manager.create_backup(&source, "manual").unwrap().unwrap();
        assert!(manager.verify_backup(&backup).unwrap());

        std::fs::write(&backup, "<tasks><task/></tasks>").unwrap();
        assert!(!manager.verify_backup(&backup).unwrap());

        let unnamed = manager.dir().join("tasks-backup-old.xml");
        std::fs::write(&unnamed, "<tasks/>").unwrap();
        assert!(!manager.verify_backup(&unnamed).unwrap());
    }
}
