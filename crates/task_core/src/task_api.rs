//! Entry points for front ends. Each call opens the store, runs one scheduler
//! operation and returns; mutating calls have persisted before they return.

use crate::error::AppError;
use crate::model::{Task, TaskView};
use crate::scheduler::{TaskScheduler, parse_priority};
use crate::storage::{JsonFileStore, json_store};
use std::path::Path;

pub fn open_scheduler(path: &Path) -> Result<TaskScheduler<JsonFileStore>, AppError> {
    TaskScheduler::open(JsonFileStore::new(path))
}

pub fn add_task(
    name: &str,
    priority: i64,
    dependencies: &[String],
    created_at: Option<&str>,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, name, priority, dependencies, created_at)
}

/// Like [`add_task`] but takes the priority as typed by a user.
pub fn add_task_from_text(
    name: &str,
    priority: &str,
    dependencies: &[String],
    created_at: Option<&str>,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_from_text_with_path(&path, name, priority, dependencies, created_at)
}

pub fn list_tasks() -> Result<Vec<TaskView>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path)
}

pub fn complete_task(name: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    complete_task_with_path(&path, name)
}

pub fn next_task() -> Result<Option<TaskView>, AppError> {
    let path = json_store::store_path()?;
    next_task_with_path(&path)
}

pub fn list_completed() -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_completed_with_path(&path)
}

pub fn add_task_with_path(
    path: &Path,
    name: &str,
    priority: i64,
    dependencies: &[String],
    created_at: Option<&str>,
) -> Result<Task, AppError> {
    let mut scheduler = open_scheduler(path)?;
    scheduler.add(
        name,
        priority,
        dependencies.to_vec(),
        created_at.map(str::to_string),
    )
}

pub fn add_task_from_text_with_path(
    path: &Path,
    name: &str,
    priority: &str,
    dependencies: &[String],
    created_at: Option<&str>,
) -> Result<Task, AppError> {
    let priority = parse_priority(priority)?;
    add_task_with_path(path, name, priority, dependencies, created_at)
}

pub fn list_tasks_with_path(path: &Path) -> Result<Vec<TaskView>, AppError> {
    Ok(open_scheduler(path)?.list())
}

pub fn complete_task_with_path(path: &Path, name: &str) -> Result<Task, AppError> {
    open_scheduler(path)?.complete(name)
}

pub fn next_task_with_path(path: &Path) -> Result<Option<TaskView>, AppError> {
    Ok(open_scheduler(path)?.peek_next())
}

pub fn list_completed_with_path(path: &Path) -> Result<Vec<Task>, AppError> {
    Ok(open_scheduler(path)?.completed().to_vec())
}

#[cfg(test)]
mod tests {
    use super::{
        add_task_from_text_with_path, add_task_with_path, complete_task_with_path,
        list_completed_with_path, list_tasks_with_path, next_task_with_path,
    };
    use crate::storage::json_store;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tasksched-{nanos}-{file_name}"))
    }

    fn deps(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn add_task_rejects_blank_name_without_touching_store() {
        let path = temp_path("blank-name.json");
        let err = add_task_with_path(&path, "", 3, &[], None).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(!path.exists());
    }

    #[test]
    fn add_task_rejects_non_integer_priority() {
        let path = temp_path("bad-priority.json");
        let err = add_task_from_text_with_path(&path, "X", "high", &[], None).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(!path.exists());
    }

    #[test]
    fn add_task_writes_to_store() {
        let path = temp_path("add-task.json");
        let task = add_task_from_text_with_path(
            &path,
            "deploy",
            " 2 ",
            &deps(&["build"]),
            Some("2025-12-20T09:00:00Z"),
        )
        .unwrap();
        let loaded = json_store::load_state(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(task.priority, 2);
        assert_eq!(loaded.pending, vec![task]);
        assert!(loaded.completed.is_empty());
    }

    #[test]
    fn list_tasks_on_missing_store_is_empty() {
        let path = temp_path("list-missing.json");
        let listed = list_tasks_with_path(&path).unwrap();

        assert!(listed.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn complete_task_reports_missing_name() {
        let path = temp_path("complete-ghost.json");
        let err = complete_task_with_path(&path, "ghost").unwrap_err();

        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn complete_task_with_empty_name_is_not_found() {
        let path = temp_path("complete-empty.json");
        add_task_with_path(&path, "real", 1, &[], None).unwrap();

        let err = complete_task_with_path(&path, "").unwrap_err();
        let loaded = json_store::load_state(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "not_found");
        assert_eq!(loaded.pending.len(), 1);
    }

    #[test]
    fn dependency_flow_persists_across_calls() {
        let path = temp_path("flow.json");
        add_task_with_path(&path, "A", 5, &[], Some("2025-12-20T09:00:00Z")).unwrap();
        add_task_with_path(&path, "B", 1, &deps(&["A"]), Some("2025-12-20T10:00:00Z")).unwrap();

        let next = next_task_with_path(&path).unwrap().unwrap();
        assert_eq!(next.task.name, "B");
        assert!(!next.executable);

        let err = complete_task_with_path(&path, "B").unwrap_err();
        assert_eq!(err.code(), "blocked");
        assert_eq!(err.unmet(), deps(&["A"]).as_slice());

        complete_task_with_path(&path, "A").unwrap();
        let next = next_task_with_path(&path).unwrap().unwrap();
        assert!(next.executable);

        complete_task_with_path(&path, "B").unwrap();
        let completed = list_completed_with_path(&path).unwrap();
        let pending = list_tasks_with_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let names: Vec<&str> = completed.iter().map(|task| task.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn corrupt_store_is_reported_not_reset() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, "not json").unwrap();

        let err = add_task_with_path(&path, "A", 1, &[], None).unwrap_err();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(content, "not json");
    }
}
