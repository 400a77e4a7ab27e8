pub mod config;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod task_api;
