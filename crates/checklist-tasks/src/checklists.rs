//! Registry of custom checklist names.
//!
//! Persisted as `id=name` properties. Tasks only carry the checklist id; this
//! registry is where the display name lives.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use checklist_core::ChecklistId;
use checklist_settings::{parse_properties, render_properties};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::errors::{Result, TaskError};
use crate::types::{Checklist, Task, TaskType};

/// Name given to checklists discovered only through their tasks.
pub const UNTITLED_CHECKLIST: &str = "Untitled Checklist";

const FILE_HEADER: &str = "Daily Checklist Custom Checklists";

/// Known custom checklists, keyed by id.
#[derive(Debug, Default)]
pub struct ChecklistRegistry {
    path: Option<PathBuf>,
    checklists: IndexMap<ChecklistId, Checklist>,
}

impl ChecklistRegistry {
    /// Registry backed by `path`. A missing or unreadable file starts empty;
    /// entries with a blank name are dropped.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut checklists = IndexMap::new();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                for (id, name) in parse_properties(&text) {
                    if id.trim().is_empty() || name.trim().is_empty() {
                        continue;
                    }
                    let checklist = Checklist::with_id(id.trim(), &name);
                    let _ = checklists.insert(checklist.id.clone(), checklist);
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "checklist names unreadable"),
        }
        debug!(path = %path.display(), count = checklists.len(), "checklists loaded");
        Self {
            path: Some(path),
            checklists,
        }
    }

    /// Registry that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Every checklist, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Checklist> {
        self.checklists.values()
    }

    /// Number of checklists.
    pub fn len(&self) -> usize {
        self.checklists.len()
    }

    /// Whether no checklists are registered.
    pub fn is_empty(&self) -> bool {
        self.checklists.is_empty()
    }

    /// Look up by id.
    pub fn get_by_id(&self, id: &str) -> Option<&Checklist> {
        self.checklists.get(id)
    }

    /// Look up by exact (trimmed) name. First match wins.
    pub fn get_by_name(&self, name: &str) -> Option<&Checklist> {
        let name = name.trim();
        self.checklists.values().find(|c| c.name == name)
    }

    /// Whether `reference` names a registered checklist, by id or by name.
    pub fn resolves(&self, reference: &str) -> bool {
        self.get_by_id(reference).is_some() || self.get_by_name(reference).is_some()
    }

    /// Insert or replace a checklist and save.
    pub fn add(&mut self, checklist: Checklist) -> Result<()> {
        if checklist.name.is_empty() {
            return Err(TaskError::InvalidInput("checklist name is empty".into()));
        }
        let _ = self.checklists.insert(checklist.id.clone(), checklist);
        self.save()
    }

    /// Remove a checklist and save. Absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Result<Option<Checklist>> {
        match self.checklists.shift_remove(id) {
            Some(removed) => {
                self.save()?;
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }

    /// Rename a checklist and save.
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(TaskError::InvalidInput("checklist name is empty".into()));
        }
        let checklist = self
            .checklists
            .get_mut(id)
            .ok_or_else(|| TaskError::checklist_not_found(id))?;
        checklist.set_name(new_name);
        self.save()
    }

    /// Register every checklist referenced by a custom task but not yet
    /// known. Returns how many were added; saves only if that is non-zero.
    ///
    /// Unknown UUID-shaped ids get [`UNTITLED_CHECKLIST`]. Anything else is a
    /// legacy reference holding the checklist name, registered under itself
    /// unless a checklist of that name exists.
    pub fn register_from_tasks<'a, I>(&mut self, tasks: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut added = 0;
        for task in tasks {
            if task.task_type != TaskType::Custom {
                continue;
            }
            let Some(id) = &task.checklist_id else {
                continue;
            };
            if self.checklists.contains_key(id) {
                continue;
            }
            let checklist = if id.looks_like_uuid() {
                Checklist::with_id(id.clone(), UNTITLED_CHECKLIST)
            } else if self.get_by_name(id).is_some() {
                continue;
            } else {
                Checklist::with_id(id.clone(), id)
            };
            let _ = self.checklists.insert(checklist.id.clone(), checklist);
            added += 1;
        }
        if added > 0 {
            info!(added, "registered checklists found in tasks");
            self.save()?;
        }
        Ok(added)
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let pairs: Vec<(String, String)> = self
            .checklists
            .values()
            .map(|c| (c.id.to_string(), c.name.clone()))
            .collect();
        checklist_core::fs::write_atomic(path, render_properties(FILE_HEADER, &pairs).as_bytes())
            .map_err(|e| TaskError::write(path, e))?;
        debug!(path = %path.display(), count = pairs.len(), "checklists saved");
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
    use assert_matches::assert_matches;

    const UUID_A: &str = "0190f5c2-1111-7000-8000-00000000000a";

    fn custom(id: &str, checklist: &str) -> Task {
        Task::new(id, TaskType::Custom).with_id(id).with_checklist(checklist)
    }

    #[test]
    fn add_rename_remove_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist-names.properties");
        let mut registry = ChecklistRegistry::open(&path);
        assert!(registry.is_empty());

        let trip = Checklist::new("Trip");
        let trip_id = trip.id.clone();
        registry.add(trip).unwrap();
        registry.add(Checklist::with_id("c-2", "Groceries")).unwrap();
        registry.rename(&trip_id, "  Weekend trip ").unwrap();

        let reopened = ChecklistRegistry::open(&path);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get_by_id(&trip_id).unwrap().name, "Weekend trip");
        assert_eq!(reopened.get_by_name("Groceries").unwrap().id.as_str(), "c-2");
        assert!(reopened.resolves("c-2") && reopened.resolves("Groceries"));
        assert!(!reopened.resolves("Trip"));

        let mut registry = reopened;
        assert!(registry.remove("c-2").unwrap().is_some());
        assert!(registry.remove("c-2").unwrap().is_none());
        assert_eq!(ChecklistRegistry::open(&path).len(), 1);
    }

    #[test]
    fn rename_unknown_is_not_found() {
        let mut registry = ChecklistRegistry::in_memory();
        let err = registry.rename("ghost", "x").unwrap_err();
        assert_matches!(err, TaskError::NotFound { entity: "Checklist", .. });
    }

    #[test]
    fn blank_names_rejected_and_skipped() {
        let mut registry = ChecklistRegistry::in_memory();
        assert_matches!(registry.add(Checklist::new("   ")), Err(TaskError::InvalidInput(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.properties");
        std::fs::write(&path, "#header\na=\nb=Real\n").unwrap();
        let registry = ChecklistRegistry::open(&path);
        assert_eq!(registry.len(), 1);
        assert!(registry.get_by_id("a").is_none());
    }

    #[test]
    fn unreadable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ChecklistRegistry::open(dir.path());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_unknown_uuid_as_untitled() {
        let mut registry = ChecklistRegistry::in_memory();
        let tasks = vec![custom("t1", UUID_A), custom("t2", UUID_A)];
        assert_eq!(registry.register_from_tasks(&tasks).unwrap(), 1);
        assert_eq!(registry.get_by_id(UUID_A).unwrap().name, UNTITLED_CHECKLIST);
    }

    #[test]
    fn register_keeps_known_names() {
        let mut registry = ChecklistRegistry::in_memory();
        registry.add(Checklist::with_id(UUID_A, "Packing")).unwrap();
        registry.add(Checklist::with_id("c-9", "Beach")).unwrap();

        let tasks = vec![custom("t1", UUID_A), custom("t2", "Beach")];
        assert_eq!(registry.register_from_tasks(&tasks).unwrap(), 0);
        assert_eq!(registry.get_by_id(UUID_A).unwrap().name, "Packing");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn register_legacy_name_reference() {
        let mut registry = ChecklistRegistry::in_memory();
        let tasks = vec![
            custom("t1", "Camping"),
            Task::new("daily", TaskType::Morning).with_checklist("Ignored"),
        ];
        assert_eq!(registry.register_from_tasks(&tasks).unwrap(), 1);
        let camping = registry.get_by_id("Camping").unwrap();
        assert_eq!(camping.name, "Camping");
        assert!(registry.get_by_id("Ignored").is_none());
    }

    #[test]
    fn register_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.properties");
        let mut registry = ChecklistRegistry::open(&path);
        let _ = registry.register_from_tasks(&[custom("t", UUID_A)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(&format!("{UUID_A}=Untitled Checklist")));
    }
}
