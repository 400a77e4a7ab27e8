use crate::config;
use crate::error::AppError;
use crate::model::Task;
use crate::storage::{StoreState, TaskStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const STORE_FILE_NAME: &str = "tasks.json";
pub const STORE_ENV_VAR: &str = "TASKSCHED_STORE_PATH";

#[derive(Debug, Deserialize)]
struct StoredDocument {
    #[serde(alias = "pendientes")]
    pending: Vec<StoredTask>,
    completadas: Vec<StoredTask>,
}

/// Older files kept completed tasks as `[priority, fecha, nombre, dependencias]` arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredTask {
    Record(Task),
    Tuple(i64, String, String, Vec<String>),
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        match stored {
            StoredTask::Record(task) => task,
            StoredTask::Tuple(priority, created_at, name, dependencies) => Task {
                priority,
                created_at,
                name,
                dependencies,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct StoredDocumentRef<'a> {
    pending: &'a [Task],
    completadas: &'a [Task],
}

/// File-backed store writing the whole state as pretty JSON.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<StoreState, AppError> {
        load_state(&self.path)
    }

    fn save(&self, state: &StoreState) -> Result<(), AppError> {
        save_state(&self.path, state)
    }
}

/// Store location: `TASKSCHED_STORE_PATH`, then the config file's `store_path`, then the default.
pub fn store_path() -> Result<PathBuf, AppError> {
    let loaded = config::load_config_with_fallback();
    resolve_store_path(loaded.config.store_path.as_deref())
}

pub fn resolve_store_path(configured: Option<&str>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path.trim()));
    }

    Ok(config::app_dir()?.join(STORE_FILE_NAME))
}

pub fn load_state(path: &Path) -> Result<StoreState, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no store file, starting empty");
            return Ok(StoreState::default());
        }
        Err(err) => return Err(AppError::io(format!("{}: {}", path.display(), err))),
    };
    if content.trim().is_empty() {
        debug!(path = %path.display(), "store file is blank, starting empty");
        return Ok(StoreState::default());
    }

    let value: serde_json::Value = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    if !value.is_object() {
        return Err(AppError::invalid_data(format!(
            "{}: store must be a JSON object",
            path.display()
        )));
    }
    let stored: StoredDocument = serde_json::from_value(value).map_err(|err| {
        AppError::invalid_data(format!("invalid store in {}: {}", path.display(), err))
    })?;

    let state = StoreState {
        pending: stored.pending.into_iter().map(Task::from).collect(),
        completed: stored.completadas.into_iter().map(Task::from).collect(),
    };
    debug!(
        path = %path.display(),
        pending = state.pending.len(),
        completed = state.completed.len(),
        "store loaded"
    );
    Ok(state)
}

/// Writes `<file>.tmp` and renames it over the store so readers never see a partial file.
pub fn save_state(path: &Path, state: &StoreState) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|err| AppError::io(format!("{}: {}", parent.display(), err)))?;
    }

    let stored = StoredDocumentRef {
        pending: &state.pending,
        completadas: &state.completed,
    };
    let mut content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    content.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|err| AppError::io(format!("{}: {}", tmp_path.display(), err)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&tmp_path, permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    if let Err(err) = std::fs::rename(&tmp_path, path) {
        std::fs::remove_file(&tmp_path).ok();
        return Err(AppError::io(format!("{}: {}", path.display(), err)));
    }
    debug!(
        path = %path.display(),
        pending = state.pending.len(),
        completed = state.completed.len(),
        "store saved"
    );

    Ok(())
}
