use crate::error::AppError;
use crate::model::Task;
use std::cell::RefCell;

pub mod json_store;

pub use json_store::JsonFileStore;

/// Full durable state: pending tasks in heap array order and completed tasks in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

/// Load/save boundary used by the scheduler. Every save rewrites the whole state.
pub trait TaskStore {
    fn load(&self) -> Result<StoreState, AppError>;

    fn save(&self, state: &StoreState) -> Result<(), AppError>;
}

/// In-process store, handy for tests and for callers that do not want a file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<StoreState>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: RefCell::new(state),
            fail_writes: false,
        }
    }

    /// Makes every later `save` fail with an I/O error.
    pub fn read_only(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<StoreState, AppError> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &StoreState) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::io("memory store is read-only"));
        }
        *self.state.borrow_mut() = state.clone();
        Ok(())
    }
}
