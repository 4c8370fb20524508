#![allow(missing_docs, unused_results)]

use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use checklist_settings::{DataPaths, Settings, SettingsStore};
use checklist_tasks::{
    ChecklistRegistry, Task, TaskManager, TaskRepository, TaskType, XmlTaskRepository,
    run_daily_check,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(paths: &DataPaths) -> TaskManager<XmlTaskRepository> {
    TaskManager::open(
        XmlTaskRepository::from_paths(paths),
        ChecklistRegistry::open(paths.checklists_file()),
    )
}

fn setup() -> (tempfile::TempDir, DataPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    (dir, paths)
}

#[test]
fn hundred_subtasks_survive_reload_and_cascade() {
    let (_tmp, paths) = setup();
    let mut manager = open(&paths);
    let parent = manager.add_task(Task::new("Parent", TaskType::Morning)).unwrap();

    let start = Instant::now();
    let children: Vec<Task> = (0..100)
        .map(|i| Task::new(format!("child {i}"), TaskType::Morning).with_parent(parent.clone()))
        .collect();
    let mut all = vec![manager.get_task_by_id(&parent).unwrap().clone()];
    all.extend(children);
    manager.set_tasks(all).unwrap();
    assert_eq!(manager.get_subtasks(&parent).len(), 100);
    assert!(start.elapsed().as_secs() < 5);

    let reopened = open(&paths);
    let subtasks = reopened.get_subtasks(&parent);
    assert_eq!(subtasks.len(), 100);
    assert_eq!(subtasks[0].name, "child 0");
    assert_eq!(subtasks[99].name, "child 99");

    let mut reopened = reopened;
    assert_eq!(reopened.remove_task(&parent).unwrap(), 101);
    assert!(open(&paths).get_all_tasks().is_empty());
}

#[test]
fn populated_store_round_trips_as_a_set() {
    let (_tmp, paths) = setup();
    let mut manager = open(&paths);

    let mut pack = Task::new("Pack", TaskType::Evening).with_weekday("friday");
    pack.mark_done_on(date(2025, 11, 14));
    let pack_id = manager.add_task(pack).unwrap();
    manager
        .add_task(Task::new("Socks", TaskType::Evening).with_parent(pack_id.clone()))
        .unwrap();
    manager
        .add_task(Task::new("Sunscreen", TaskType::Custom).with_checklist("Beach"))
        .unwrap();

    let before: HashMap<_, _> = manager
        .get_all_tasks()
        .into_iter()
        .map(|t| (t.id.clone(), t.clone()))
        .collect();
    let after: HashMap<_, _> = XmlTaskRepository::new(paths.tasks_file())
        .load()
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();
    assert_eq!(before, after);
    assert_eq!(open(&paths).get_subtasks(&pack_id).len(), 1);
}

#[test]
fn corrupted_store_opens_empty_and_recovers_on_write() {
    let (_tmp, paths) = setup();
    std::fs::write(paths.tasks_file(), "not xml at all <<<").unwrap();

    let mut manager = open(&paths);
    assert!(manager.get_all_tasks().is_empty());

    manager.add_task(Task::new("fresh", TaskType::Morning)).unwrap();
    assert_eq!(open(&paths).get_all_tasks().len(), 1);
}

#[test]
fn day_boundary_clears_completion() {
    let (_tmp, paths) = setup();
    let settings = SettingsStore::new(paths.settings_file());
    settings
        .save(&Settings::default().processed_on(date(2025, 11, 18)))
        .unwrap();

    let mut manager = open(&paths);
    let mut a = Task::new("A", TaskType::Morning);
    a.mark_done_on(date(2025, 11, 18));
    let a_id = manager.add_task(a).unwrap();

    let same_day = run_daily_check(&mut manager, &settings, date(2025, 11, 18)).unwrap();
    assert!(!same_day.reset);
    assert!(manager.get_task_by_id(&a_id).unwrap().is_done());

    let next_day = run_daily_check(&mut manager, &settings, date(2025, 11, 19)).unwrap();
    assert!(next_day.reset);
    assert_eq!(next_day.cleared, 1);

    let reloaded = open(&paths);
    let a = reloaded.get_task_by_id(&a_id).unwrap();
    assert!(!a.is_done());
    assert!(a.done_date().is_none());
    assert_eq!(
        settings.try_load().unwrap().last_processed_date,
        Some(date(2025, 11, 19))
    );
}

#[test]
fn weekday_visibility_follows_preference() {
    let (_tmp, paths) = setup();
    let mut manager = open(&paths);
    manager.add_task(Task::new("Daily", TaskType::Morning)).unwrap();
    manager
        .add_task(Task::new("Gym", TaskType::Evening).with_weekday("Monday"))
        .unwrap();

    let monday = date(2025, 11, 17);
    let tuesday = date(2025, 11, 18);
    assert_eq!(manager.get_daily_tasks(monday, false).len(), 2);
    assert_eq!(manager.get_daily_tasks(tuesday, false).len(), 1);
    assert_eq!(manager.get_daily_tasks(tuesday, true).len(), 2);
}

#[test]
fn set_tasks_keeps_a_backup_and_registers_checklists() {
    let (_tmp, paths) = setup();
    let mut manager = open(&paths);
    manager.add_task(Task::new("old", TaskType::Morning)).unwrap();

    manager
        .set_tasks(vec![
            Task::new("Tent", TaskType::Custom).with_checklist("0190f5c2-2222-7000-8000-00000000000b"),
        ])
        .unwrap();

    let backups: Vec<_> = std::fs::read_dir(paths.backup_dir()).unwrap().collect();
    assert_eq!(backups.len(), 1);

    let registry = ChecklistRegistry::open(paths.checklists_file());
    let checklist = registry
        .get_by_id("0190f5c2-2222-7000-8000-00000000000b")
        .unwrap();
    assert_eq!(checklist.name, checklist_tasks::UNTITLED_CHECKLIST);
}
