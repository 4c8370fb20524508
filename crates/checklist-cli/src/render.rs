//! Plain-text rendering of task lists.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use checklist_tasks::Task;

/// One task as a single line, indented two spaces per level.
pub fn task_line(task: &Task, depth: usize) -> String {
    let mark = if task.is_done() { "x" } else { " " };
    let mut line = format!("{}[{mark}] {}", "  ".repeat(depth), task.name);
    if let Some(day) = &task.weekday {
        let _ = write!(line, " ({day})");
    }
    if task.has_note() {
        line.push_str(" *");
    }
    let _ = write!(line, "  #{}", task.id);
    line
}

/// A titled section. Subtasks are nested under their parent when the parent
/// is part of the same list; otherwise they are shown at the top level.
pub fn section(title: &str, tasks: &[&Task]) -> String {
    let mut out = format!("{title}\n");
    if tasks.is_empty() {
        out.push_str("  (nothing)\n");
        return out;
    }

    let present: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut children: HashMap<&str, Vec<&Task>> = HashMap::new();
    let mut roots = Vec::new();
    for task in tasks {
        match task.parent_id.as_deref() {
            Some(parent) if present.contains(parent) => {
                children.entry(parent).or_default().push(*task);
            }
            _ => roots.push(*task),
        }
    }

    let mut seen = HashSet::new();
    let mut stack: Vec<(&Task, usize)> = roots.into_iter().rev().map(|t| (t, 1)).collect();
    while let Some((task, depth)) = stack.pop() {
        if !seen.insert(task.id.as_str()) {
            continue;
        }
        out.push_str(&task_line(task, depth));
        out.push('\n');
        if let Some(kids) = children.get(task.id.as_str()) {
            stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
        }
    }
    out
}
