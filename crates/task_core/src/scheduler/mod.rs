//! Ordering and dependency logic over the pending heap and the completed list.
//!
//! Every mutating call persists the whole state through the [`TaskStore`] before it
//! returns. If persisting fails the in-memory change is rolled back, so the scheduler
//! always mirrors the last state that was saved successfully.

use crate::error::AppError;
use crate::model::{Task, TaskView};
use crate::storage::{StoreState, TaskStore};
use std::collections::HashSet;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

mod heap;

pub use heap::PendingHeap;

pub struct TaskScheduler<S: TaskStore> {
    pending: PendingHeap,
    completed: Vec<Task>,
    store: S,
}

impl<S: TaskStore> TaskScheduler<S> {
    /// Loads persisted state from `store`; an empty store yields an empty scheduler.
    pub fn open(store: S) -> Result<Self, AppError> {
        let state = store.load()?;
        debug!(
            pending = state.pending.len(),
            completed = state.completed.len(),
            "scheduler opened"
        );
        Ok(Self {
            pending: PendingHeap::from_vec(state.pending),
            completed: state.completed,
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Completed tasks in the order they were completed.
    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    /// Inserts a pending task. `created_at` defaults to the current UTC time (RFC 3339).
    pub fn add(
        &mut self,
        name: &str,
        priority: i64,
        dependencies: Vec<String>,
        created_at: Option<String>,
    ) -> Result<Task, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::invalid_input("name is required"));
        }

        let created_at = match created_at {
            Some(value) => value,
            None => now_timestamp()?,
        };
        let task = Task {
            priority,
            created_at,
            name: name.to_string(),
            dependencies,
        };

        let previous = self.pending.clone();
        self.pending.push(task.clone());
        if let Err(err) = self.persist() {
            self.pending = previous;
            return Err(err);
        }

        debug!(task = %task.name, priority = task.priority, "task added");
        Ok(task)
    }

    /// All pending tasks in (priority, created_at, name) order with their executable status.
    pub fn list(&self) -> Vec<TaskView> {
        let done = self.completed_names();
        self.pending
            .sorted()
            .into_iter()
            .map(|task| view(task, &done))
            .collect()
    }

    /// Marks the first pending task named `name` (heap array order) as completed.
    pub fn complete(&mut self, name: &str) -> Result<Task, AppError> {
        let index = self
            .pending
            .position(name)
            .ok_or_else(|| AppError::not_found(format!("task '{name}' not found")))?;

        let unmet = {
            let done = self.completed_names();
            unmet_dependencies(&self.pending.as_slice()[index], &done)
        };
        if !unmet.is_empty() {
            debug!(task = name, ?unmet, "task blocked");
            return Err(AppError::blocked(name, unmet));
        }

        let previous = self.pending.clone();
        let task = self
            .pending
            .remove_at(index)
            .ok_or_else(|| AppError::not_found(format!("task '{name}' not found")))?;
        self.completed.push(task.clone());

        if let Err(err) = self.persist() {
            self.completed.pop();
            self.pending = previous;
            return Err(err);
        }

        debug!(task = name, "task completed");
        Ok(task)
    }

    /// Highest-priority pending task with its status. Only the root is inspected: a blocked
    /// root is reported even when a lower-priority task could run.
    pub fn peek_next(&self) -> Option<TaskView> {
        let done = self.completed_names();
        self.pending.peek().map(|task| view(task, &done))
    }

    pub fn is_executable(&self, task: &Task) -> bool {
        unmet_dependencies(task, &self.completed_names()).is_empty()
    }

    fn completed_names(&self) -> HashSet<&str> {
        self.completed.iter().map(|task| task.name.as_str()).collect()
    }

    fn persist(&self) -> Result<(), AppError> {
        let state = StoreState {
            pending: self.pending.as_slice().to_vec(),
            completed: self.completed.clone(),
        };
        self.store.save(&state).inspect_err(|err| {
            warn!(error = %err, "failed to persist scheduler state");
        })
    }
}

fn unmet_dependencies(task: &Task, done: &HashSet<&str>) -> Vec<String> {
    task.dependencies
        .iter()
        .filter(|dependency| !done.contains(dependency.as_str()))
        .cloned()
        .collect()
}

fn view(task: &Task, done: &HashSet<&str>) -> TaskView {
    let unmet = unmet_dependencies(task, done);
    TaskView {
        task: task.clone(),
        executable: unmet.is_empty(),
        unmet,
    }
}

/// Validates a textual priority; anything that is not an integer is rejected.
pub fn parse_priority(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse::<i64>().map_err(|_| {
        AppError::invalid_input(format!("priority must be an integer, got '{raw}'"))
    })
}

pub fn now_timestamp() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
