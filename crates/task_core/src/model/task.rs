use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "prioridad")]
    pub priority: i64,
    #[serde(rename = "fecha")]
    pub created_at: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "dependencias", default)]
    pub dependencies: Vec<String>,
}

impl Task {
    pub fn key(&self) -> TaskKey<'_> {
        TaskKey {
            priority: self.priority,
            created_at: &self.created_at,
            name: &self.name,
        }
    }
}

/// Ordering key for pending tasks: priority, then `created_at`, then name, all ascending.
///
/// `created_at` is compared as a plain string and never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskKey<'a> {
    pub priority: i64,
    pub created_at: &'a str,
    pub name: &'a str,
}

impl Ord for TaskKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.created_at.cmp(other.created_at))
            .then_with(|| self.name.cmp(other.name))
    }
}

impl PartialOrd for TaskKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A pending task annotated with its executable status at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub task: Task,
    pub executable: bool,
    pub unmet: Vec<String>,
}
