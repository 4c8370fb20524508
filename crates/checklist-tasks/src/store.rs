//! In-memory task index.
//!
//! The primary map owns every [`Task`] and preserves store order. A
//! secondary `parent id → child ids` index answers "subtasks of X" without
//! scanning. Both are kept consistent incrementally:
//!
//! - **insert** appends to one parent's child list
//! - **update** moves the id between two child lists when the parent changes
//! - **remove** walks the child index depth-first and drops the whole subtree
//!
//! Child lists are keyed by parent id even when the parent is not (yet)
//! present, so a batch loaded children-first links up once the parent
//! arrives. Links that would close a loop are rejected.

use std::collections::{HashMap, HashSet};

use checklist_core::TaskId;
use indexmap::IndexMap;
use tracing::warn;

use crate::errors::{Result, TaskError};
use crate::types::Task;

/// Indexed collection of tasks.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: IndexMap<TaskId, Task>,
    children: HashMap<TaskId, Vec<TaskId>>,
}

impl TaskStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records read off disk.
    ///
    /// Unlike [`TaskStore::replace_all`] this never fails: later duplicates
    /// are dropped and parent links that would close a loop are cut, each
    /// with a warning.
    pub fn from_loaded(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        for mut task in tasks {
            if store.tasks.contains_key(&task.id) {
                warn!(task_id = %task.id, "duplicate task id in store, keeping first");
                continue;
            }
            if let Some(parent_id) = &task.parent_id {
                if store.would_cycle(&task.id, parent_id) {
                    warn!(task_id = %task.id, parent_id = %parent_id, "parent link forms a cycle, detaching");
                    task.parent_id = None;
                }
            }
            store.link(&task);
            let _ = store.tasks.insert(task.id.clone(), task);
        }
        store
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// Look up a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Every task, in store order.
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Ids of the direct children of `id`, in insertion order.
    pub fn child_ids(&self, id: &str) -> &[TaskId] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Direct children of `id`, in insertion order. Empty if none.
    pub fn children_of(&self, id: &str) -> Vec<&Task> {
        self.child_ids(id)
            .iter()
            .filter_map(|child| self.tasks.get(child))
            .collect()
    }

    /// Add a task.
    pub fn insert(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(TaskError::DuplicateId(task.id));
        }
        if let Some(parent_id) = &task.parent_id {
            if self.would_cycle(&task.id, parent_id) {
                return Err(TaskError::Cycle {
                    task_id: task.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
        self.link(&task);
        let _ = self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Replace the stored task with the same id, returning the old record.
    ///
    /// The record keeps its position in store order. A changed parent moves
    /// the id to the end of the new parent's child list.
    pub fn update(&mut self, task: Task) -> Result<Task> {
        let Some(old_parent) = self.tasks.get(&task.id).map(|t| t.parent_id.clone()) else {
            return Err(TaskError::task_not_found(task.id.as_str()));
        };

        if old_parent != task.parent_id {
            if let Some(parent_id) = &task.parent_id {
                if self.would_cycle(&task.id, parent_id) {
                    return Err(TaskError::Cycle {
                        task_id: task.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                }
            }
            if let Some(old_parent) = &old_parent {
                self.unlink(old_parent, &task.id);
            }
            self.link(&task);
        }

        match self.tasks.get_mut(&task.id) {
            Some(slot) => Ok(std::mem::replace(slot, task)),
            None => Err(TaskError::task_not_found(task.id.as_str())),
        }
    }

    /// Remove `id` and every descendant. Returns the removed ids, parent
    /// before children; empty if `id` was absent.
    pub fn remove(&mut self, id: &str) -> Vec<TaskId> {
        let Some(root) = self.tasks.get(id) else {
            return Vec::new();
        };
        let root_id = root.id.clone();
        if let Some(parent_id) = root.parent_id.clone() {
            self.unlink(&parent_id, &root_id);
        }

        let mut removed = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root_id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(kids) = self.children.remove(&current) {
                // Reverse so the first child is visited first
                stack.extend(kids.into_iter().rev());
            }
            removed.push(current);
        }

        // Child lists may name ids that were never inserted
        removed.retain(|id| self.tasks.contains_key(id));

        if removed.len() == 1 {
            let _ = self.tasks.shift_remove(&removed[0]);
        } else {
            let doomed: HashSet<&TaskId> = removed.iter().collect();
            self.tasks.retain(|id, _| !doomed.contains(id));
        }
        removed
    }

    /// Discard everything and rebuild from `tasks`.
    ///
    /// Duplicate ids and cycles are rejected before anything is discarded,
    /// so on error the store is unchanged.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<()> {
        let mut next = Self::new();
        for task in tasks {
            if next.tasks.contains_key(&task.id) {
                return Err(TaskError::DuplicateId(task.id));
            }
            next.link(&task);
            let _ = next.tasks.insert(task.id.clone(), task);
        }
        if let Some((task_id, parent_id)) = next.find_cycle() {
            return Err(TaskError::Cycle { task_id, parent_id });
        }
        *self = next;
        Ok(())
    }

    /// Ids of `id` and all its descendants.
    pub fn subtree_ids(&self, id: &str) -> Vec<TaskId> {
        let mut out = Vec::new();
        let Some(root) = self.tasks.get(id) else {
            return out;
        };
        let mut stack = vec![root.id.clone()];
        while let Some(current) = stack.pop() {
            stack.extend(self.child_ids(&current).iter().rev().cloned());
            out.push(current);
        }
        out.retain(|id| self.tasks.contains_key(id));
        out
    }

    // ── index maintenance ───────────────────────────────────────────

    fn link(&mut self, task: &Task) {
        if let Some(parent_id) = &task.parent_id {
            self.children
                .entry(parent_id.clone())
                .or_default()
                .push(task.id.clone());
        }
    }

    fn unlink(&mut self, parent_id: &TaskId, child_id: &TaskId) {
        if let Some(kids) = self.children.get_mut(parent_id) {
            kids.retain(|k| k != child_id);
            if kids.is_empty() {
                let _ = self.children.remove(parent_id);
            }
        }
    }

    /// Whether making `parent_id` the parent of `task_id` closes a loop.
    fn would_cycle(&self, task_id: &TaskId, parent_id: &TaskId) -> bool {
        let mut current = Some(parent_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == task_id || steps > self.tasks.len() {
                return true;
            }
            current = self.tasks.get(id).and_then(|t| t.parent_id.as_ref());
            steps += 1;
        }
        false
    }

    /// First `(task, parent)` link found on a cycle, if any.
    fn find_cycle(&self) -> Option<(TaskId, TaskId)> {
        let mut settled: HashSet<&TaskId> = HashSet::new();
        for start in self.tasks.keys() {
            let mut path: Vec<&TaskId> = Vec::new();
            let mut on_path: HashSet<&TaskId> = HashSet::new();
            let mut current = Some(start);
            while let Some(id) = current {
                if settled.contains(id) {
                    break;
                }
                if !on_path.insert(id) {
                    let child = path.last().copied().unwrap_or(id);
                    return Some((child.clone(), id.clone()));
                }
                path.push(id);
                current = self.tasks.get(id).and_then(|t| t.parent_id.as_ref());
            }
            settled.extend(path);
        }
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
