//! Durable task storage.
//!
//! [`TaskRepository`] is the seam between the manager and disk.
//! [`XmlTaskRepository`] keeps every task in one flat XML document:
//!
//! ```xml
//! <tasks>
//!   <task id="…">
//!     <name>Stretch</name>
//!     <type>MORNING</type>
//!     <weekday>monday</weekday>
//!     <done>true</done>
//!     <doneDate>2025-11-18</doneDate>
//!     <parentId>…</parentId>
//!   </task>
//! </tasks>
//! ```
//!
//! Absent optional fields are omitted. Subtasks are stored flat with a
//! `parentId` back-reference; nesting is never written.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use checklist_core::TaskId;
use checklist_settings::{DATE_FORMAT, DataPaths, parse_bool};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup::BackupManager;
use crate::errors::{Result, TaskError};
use crate::types::{Reminder, Task, TaskType};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Whole-collection task persistence.
pub trait TaskRepository {
    /// Every stored task. Read failures are recovered to an empty list.
    fn load(&self) -> Vec<Task>;

    /// Overwrite the store with `tasks`.
    fn save(&self, tasks: &[&Task]) -> Result<()>;

    /// Keep a copy of the current store. Returns the copy's location, or
    /// `None` when nothing was written. Failures are logged, never returned.
    fn backup(&self, _reason: &str) -> Option<PathBuf> {
        None
    }
}

/// XML-file task repository.
#[derive(Clone, Debug)]
pub struct XmlTaskRepository {
    path: PathBuf,
    backups: Option<BackupManager>,
}

impl XmlTaskRepository {
    /// Repository at `path`, without backups.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backups: None,
        }
    }

    /// Repository for a data directory, with backups enabled.
    pub fn from_paths(paths: &DataPaths) -> Self {
        Self::new(paths.tasks_file()).with_backups(BackupManager::new(paths.backup_dir()))
    }

    /// Enable backups.
    #[must_use]
    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = Some(backups);
        self
    }

    /// Store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backup manager, when backups are enabled.
    pub fn backups(&self) -> Option<&BackupManager> {
        self.backups.as_ref()
    }

    /// Load, reporting unreadable or unparseable files as
    /// [`TaskError::PersistenceRead`].
    ///
    /// A missing or blank file is an empty store. Individual records that
    /// cannot be understood are skipped with a warning. Element text is
    /// taken verbatim, surrounding whitespace included.
    pub fn try_load(&self) -> Result<Vec<Task>> {
        let Some(document) = self.read_document()? else {
            return Ok(Vec::new());
        };

        let mut tasks = Vec::with_capacity(document.tasks.len());
        for record in document.tasks {
            match record.into_task() {
                Ok(task) => tasks.push(task),
                Err(reason) => warn!(path = %self.path.display(), %reason, "skipping task record"),
            }
        }
        debug!(path = %self.path.display(), count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    /// Reminders kept as `<reminder>` elements by older stores.
    ///
    /// Unreadable files and incomplete elements yield nothing; this is only
    /// ever used to seed an empty reminder store.
    pub fn legacy_reminders(&self) -> Vec<Reminder> {
        let document = match self.read_document() {
            Ok(Some(document)) => document,
            Ok(None) => return Vec::new(),
            Err(e) => {
                debug!(error = %e, "no legacy reminders readable");
                return Vec::new();
            }
        };
        let reminders: Vec<Reminder> = document
            .reminders
            .iter()
            .filter_map(|attributes| {
                let reminder = Reminder::from_attributes(attributes);
                if reminder.is_none() {
                    warn!(path = %self.path.display(), ?attributes, "skipping legacy reminder");
                }
                reminder
            })
            .collect();
        if !reminders.is_empty() {
            info!(path = %self.path.display(), count = reminders.len(), "legacy reminders found");
        }
        reminders
    }

    fn read_document(&self) -> Result<Option<ParsedDocument>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task store not found, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(TaskError::read(&self.path, e)),
        };
        if text.trim().is_empty() {
            debug!(path = %self.path.display(), "task store is empty");
            return Ok(None);
        }
        parse_document(&text)
            .map(Some)
            .map_err(|e| TaskError::read(&self.path, e))
    }
}

impl TaskRepository for XmlTaskRepository {
    fn load(&self) -> Vec<Task> {
        self.try_load().unwrap_or_else(|e| {
            warn!(error = %e, "task store unreadable, starting empty");
            Vec::new()
        })
    }

    fn save(&self, tasks: &[&Task]) -> Result<()> {
        let text = render_document(tasks).map_err(|e| TaskError::write(&self.path, e))?;
        checklist_core::fs::write_atomic(&self.path, text.as_bytes())
            .map_err(|e| TaskError::write(&self.path, e))?;
        debug!(path = %self.path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }

    fn backup(&self, reason: &str) -> Option<PathBuf> {
        let backups = self.backups.as_ref()?;
        match backups.create_backup(&self.path, reason) {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "task store backup failed");
                None
            }
        }
    }
}

fn render_document(tasks: &[&Task]) -> std::result::Result<String, String> {
    let document = TasksDocument {
        tasks: tasks.iter().map(|t| TaskRecord::from_task(t)).collect(),
    };
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    let _ = serializer.indent(' ', 2);
    let _ = document.serialize(serializer).map_err(|e| e.to_string())?;
    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

// ── Reading ─────────────────────────────────────────────────────────────────

/// Depth of `<task>` elements (the root is depth 0).
const TASK_DEPTH: usize = 1;
/// Depth of the field elements inside a `<task>`.
const FIELD_DEPTH: usize = 2;

#[derive(Debug, Default)]
struct ParsedDocument {
    tasks: Vec<TaskRecord>,
    reminders: Vec<Vec<(String, String)>>,
}

/// Event-driven reader state. Text inside field elements is collected
/// untrimmed; whitespace between elements is ignored.
#[derive(Default)]
struct DocumentParser {
    document: ParsedDocument,
    record: Option<TaskRecord>,
    field: Option<(String, String)>,
}

impl DocumentParser {
    fn open(&mut self, start: &BytesStart<'_>, depth: usize) -> std::result::Result<(), String> {
        let name = element_name(start);
        if name == "reminder" {
            self.document.reminders.push(attributes(start)?);
        }
        match depth {
            TASK_DEPTH if name == "task" => {
                let id = attributes(start)?
                    .into_iter()
                    .find_map(|(key, value)| (key == "id").then_some(value))
                    .unwrap_or_default();
                self.record = Some(TaskRecord {
                    id,
                    ..TaskRecord::default()
                });
            }
            FIELD_DEPTH if self.record.is_some() => self.field = Some((name, String::new())),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str, depth: usize) {
        match depth {
            FIELD_DEPTH => {
                if let (Some((field, text)), Some(record)) = (self.field.take(), self.record.as_mut()) {
                    record.assign(&field, text);
                }
            }
            TASK_DEPTH if name == "task" => {
                if let Some(record) = self.record.take() {
                    self.document.tasks.push(record);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, depth: usize, text: &str) -> std::result::Result<(), String> {
        if depth == FIELD_DEPTH + 1 {
            if let Some((_, buffer)) = self.field.as_mut() {
                buffer.push_str(text);
            }
        } else if depth == 0 && !text.trim().is_empty() {
            return Err(format!("text outside the root element: {:?}", text.trim()));
        }
        Ok(())
    }
}

fn parse_document(text: &str) -> std::result::Result<ParsedDocument, String> {
    let mut reader = Reader::from_str(text);
    let mut parser = DocumentParser::default();
    let mut open: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                parser.open(&start, open.len())?;
                open.push(element_name(&start));
            }
            Event::Empty(start) => {
                parser.open(&start, open.len())?;
                parser.close(&element_name(&start), open.len());
            }
            Event::End(_) => {
                let name = open.pop().ok_or("closing tag without an open element")?;
                parser.close(&name, open.len());
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                parser.text(open.len(), &text)?;
            }
            Event::CData(data) => parser.text(open.len(), &String::from_utf8_lossy(&data))?,
            Event::Eof => break,
            _ => {}
        }
    }
    if let Some(name) = open.last() {
        return Err(format!("document ends inside <{name}>"));
    }
    Ok(parser.document)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attributes(start: &BytesStart<'_>) -> std::result::Result<Vec<(String, String)>, String> {
    start
        .attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(|e| e.to_string())?;
            Ok((key, value.into_owned()))
        })
        .collect()
}

// ── On-disk records ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
#[serde(rename = "tasks")]
struct TasksDocument {
    #[serde(rename = "task")]
    tasks: Vec<TaskRecord>,
}

/// One `<task>` element. Every field is kept as text so a single bad value
/// skips one record instead of failing the whole document.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    #[serde(rename = "@id")]
    id: String,
    name: String,
    #[serde(rename = "type")]
    task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    weekday: Option<String>,
    done: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    done_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checklist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl TaskRecord {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: task.name.clone(),
            task_type: task.task_type.as_str().to_string(),
            weekday: task.weekday.clone(),
            done: task.is_done().to_string(),
            done_date: task.done_date().map(|d| d.format(DATE_FORMAT).to_string()),
            checklist_id: task.checklist_id.as_ref().map(ToString::to_string),
            parent_id: task.parent_id.as_ref().map(ToString::to_string),
            note: task.note.clone(),
        }
    }

    /// Store one field element's text. `checklistName` is the legacy
    /// spelling of `checklistId`; unknown elements are ignored.
    fn assign(&mut self, field: &str, text: String) {
        match field {
            "name" => self.name = text,
            "type" => self.task_type = text,
            "weekday" => self.weekday = Some(text),
            "done" => self.done = text,
            "doneDate" => self.done_date = Some(text),
            "checklistId" | "checklistName" => self.checklist_id = Some(text),
            "parentId" => self.parent_id = Some(text),
            "note" => self.note = Some(text),
            _ => {}
        }
    }

    fn into_task(self) -> std::result::Result<Task, String> {
        let task_type: TaskType = self
            .task_type
            .parse()
            .map_err(|e: TaskError| format!("task {:?}: {e}", self.id))?;

        let id = match non_blank(Some(self.id)) {
            Some(id) => TaskId::from(id),
            None => {
                let id = TaskId::new();
                warn!(task_id = %id, "task record without id, assigned a new one");
                id
            }
        };

        let done = parse_bool(&self.done).unwrap_or(false);
        let done_date = non_blank(self.done_date).and_then(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map_err(|e| warn!(task_id = %id, value = %raw, error = %e, "ignoring bad doneDate"))
                .ok()
        });

        let mut task = Task::new(self.name, task_type).with_id(id);
        task.set_weekday(self.weekday);
        task.checklist_id = non_blank(self.checklist_id).map(Into::into);
        task.parent_id = non_blank(self.parent_id).map(Into::into);
        task.note = self.note;
        task.set_done(done, done_date);
        Ok(task)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use checklist_core::logging::capture_logs;
    use std::collections::HashMap;
    use tracing::Level;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repo_in(dir: &tempfile::TempDir) -> XmlTaskRepository {
        XmlTaskRepository::new(dir.path().join("tasks.xml"))
    }

    fn by_id(tasks: Vec<Task>) -> HashMap<TaskId, Task> {
        tasks.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    fn sample() -> Vec<Task> {
        let mut parent = Task::new("Pack bag", TaskType::Evening).with_id("p");
        parent.mark_done_on(date(2025, 11, 18));
        let child = Task::new("Laptop & charger <15W>", TaskType::Evening)
            .with_id("c")
            .with_parent("p")
            .with_note("check \"both\" cables");
        let custom = Task::new("Passport", TaskType::Custom)
            .with_id("x")
            .with_checklist("0190f5c2-0000-7000-8000-000000000001")
            .with_weekday("friday");
        let mut undated = Task::new("", TaskType::Morning).with_id("u");
        undated.set_done(true, None);
        vec![parent, child, custom, undated]
    }

    #[test]
    fn save_then_load_is_field_equal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        let tasks = sample();
        repo.save(&tasks.iter().collect::<Vec<_>>()).unwrap();

        let loaded = by_id(repo.try_load().unwrap());
        assert_eq!(loaded, by_id(tasks));
        assert_eq!(loaded["c"].parent_id.as_deref(), Some("p"));
    }

    #[test]
    fn empty_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        repo.save(&[]).unwrap();
        assert!(repo.try_load().unwrap().is_empty());
    }

    #[test]
    fn save_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        let tasks = sample();
        repo.save(&tasks.iter().collect::<Vec<_>>()).unwrap();
        let first = std::fs::read_to_string(repo.path()).unwrap();

        let loaded = repo.load();
        repo.save(&loaded.iter().collect::<Vec<_>>()).unwrap();
        assert_eq!(std::fs::read_to_string(repo.path()).unwrap(), first);
    }

    #[test]
    fn absent_fields_are_omitted_not_null() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        let task = Task::new("plain", TaskType::Morning).with_id("a");
        repo.save(&[&task]).unwrap();
        let text = std::fs::read_to_string(repo.path()).unwrap();
        assert!(text.starts_with(XML_DECLARATION));
        assert!(!text.contains("null"));
        assert!(!text.contains("weekday"));
        assert!(!text.contains("doneDate"));
        assert!(!text.contains("parentId"));
        assert!(text.contains(r#"<task id="a">"#));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(repo_in(&dir).try_load().unwrap().is_empty());
        assert!(repo_in(&dir).load().is_empty());
    }

    #[test]
    fn blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(repo.path(), "  \n").unwrap();
        assert!(repo.try_load().unwrap().is_empty());
    }

    #[test]
    fn corrupted_file_loads_empty_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(repo.path(), "<tasks><task id=\"a\"><name>half").unwrap();

        assert_matches!(repo.try_load(), Err(TaskError::PersistenceRead { .. }));

        let (logs, _guard) = capture_logs();
        assert!(repo.load().is_empty());
        assert!(logs.has_event(Level::WARN, "task store unreadable"));
    }

    #[test]
    fn unreadable_path_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::create_dir(repo.path()).unwrap();
        assert_matches!(repo.try_load(), Err(TaskError::PersistenceRead { .. }));
        assert!(repo.load().is_empty());
    }

    #[test]
    fn unknown_type_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(
            repo.path(),
            r#"<?xml version="1.0" encoding="UTF-8"?>
<tasks>
  <task id="h"><name>Heading</name><type>HEADING</type><done>false</done></task>
  <task id="k"><name>Keep</name><type>MORNING</type><done>false</done></task>
</tasks>"#,
        )
        .unwrap();
        let tasks = repo.try_load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id.as_str(), "k");
    }

    #[test]
    fn legacy_layout_is_understood() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(
            repo.path(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<tasks>
  <task id="a">
    <name>Sunscreen</name>
    <type>custom</type>
    <done>true</done>
    <doneDate></doneDate>
    <checklistName>Beach</checklistName>
  </task>
  <task id="b">
    <name>Stale date</name>
    <type>EVENING</type>
    <weekday></weekday>
    <done>false</done>
    <doneDate>2025-11-01</doneDate>
  </task>
</tasks>"#,
        )
        .unwrap();
        let tasks = by_id(repo.try_load().unwrap());

        let a = &tasks["a"];
        assert_eq!(a.task_type, TaskType::Custom);
        assert_eq!(a.checklist_id.as_deref(), Some("Beach"));
        assert!(a.is_done());
        assert!(a.done_date().is_none());

        let b = &tasks["b"];
        assert!(b.weekday.is_none());
        assert!(!b.is_done());
        assert!(b.done_date().is_none());
    }

    #[test]
    fn record_without_id_gets_one() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(
            repo.path(),
            "<tasks><task><name>anon</name><type>MORNING</type><done>false</done></task></tasks>",
        )
        .unwrap();
        let tasks = repo.try_load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(!tasks[0].id.is_empty());
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let repo = XmlTaskRepository::new(blocker.join("tasks.xml"));
        let task = Task::new("a", TaskType::Morning);
        let err = repo.save(&[&task]).unwrap_err();
        assert!(err.is_unsaved_change());
    }

    #[test]
    fn backup_copies_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let repo = XmlTaskRepository::from_paths(&paths);
        let task = Task::new("a", TaskType::Morning);
        repo.save(&[&task]).unwrap();

        let made = repo.backup("set-tasks").unwrap();
        let backups = BackupManager::new(paths.backup_dir()).list_backups().unwrap();
        assert_eq!(backups, vec![made]);
        assert_eq!(
            std::fs::read_to_string(&backups[0]).unwrap(),
            std::fs::read_to_string(repo.path()).unwrap()
        );
    }

    #[test]
    fn surrounding_whitespace_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        let names = ["  padded  ", "   ", "tab\tend\t", "\nnew line first"];
        let tasks: Vec<Task> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut task = Task::new(*name, TaskType::Morning).with_id(format!("t{i}"));
                task.note = Some("  line1\n  line2  ".to_string());
                task
            })
            .collect();
        repo.save(&tasks.iter().collect::<Vec<_>>()).unwrap();

        let loaded = by_id(repo.try_load().unwrap());
        for task in &tasks {
            assert_eq!(loaded[&task.id].name, task.name);
            assert_eq!(loaded[&task.id].note, task.note);
        }
        assert_eq!(loaded, by_id(tasks));
    }

    #[test]
    fn escaped_and_cdata_text_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(
            repo.path(),
            "<tasks>\n  <task id=\"e\">\n    <name> a &amp; b </name>\n    <type>MORNING</type>\n    \
             <done>false</done>\n    <note><![CDATA[ <raw> ]]></note>\n  </task>\n</tasks>\n",
        )
        .unwrap();
        let tasks = repo.try_load().unwrap();
        assert_eq!(tasks[0].name, " a & b ");
        assert_eq!(tasks[0].note.as_deref(), Some(" <raw> "));
    }

    #[test]
    fn text_outside_root_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(repo.path(), "not xml at all").unwrap();
        assert_matches!(repo.try_load(), Err(TaskError::PersistenceRead { .. }));
    }

    #[test]
    fn legacy_reminder_elements_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(
            repo.path(),
            r#"<tasks>
  <task id="a"><name>Pack</name><type>CUSTOM</type><done>false</done><checklistName>Trip</checklistName></task>
  <reminder checklistName="Trip" year="2025" month="11" day="20" hour="8" minute="30"/>
  <reminder checklistName="MORNING" year="2025" month="11" day="21" hour="7" minute="0" taskId="a"/>
  <reminder checklistName="Trip" year="2025" month="13" day="1" hour="0" minute="0"/>
</tasks>"#,
        )
        .unwrap();

        let reminders = repo.legacy_reminders();
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].checklist, "Trip");
        assert_eq!(reminders[0].at.to_string(), "2025-11-20 08:30:00");
        assert!(reminders[0].task_id.is_none());
        assert_eq!(reminders[1].task_id.as_deref(), Some("a"));
        assert_eq!(repo.try_load().unwrap().len(), 1);
    }

    #[test]
    fn legacy_reminders_of_missing_file_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(repo_in(&dir).legacy_reminders().is_empty());
    }

    #[test]
    fn repository_without_backups_writes_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);
        repo.save(&[]).unwrap();
        assert!(repo.backup("manual").is_none());
        assert!(repo.backups().is_none());
    }
}
