//! Sample console tasks.

pub mod main_task;

pub use main_task::MainTask;
