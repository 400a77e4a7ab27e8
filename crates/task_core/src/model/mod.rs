mod task;

pub use task::{Task, TaskKey, TaskView};
