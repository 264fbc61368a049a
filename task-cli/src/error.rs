use crate::task::TaskId;
use thiserror::Error;

/// Failures surfaced by store operations. None of them leave a partial mutation behind.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task description cannot be empty")]
    EmptyDescription,
    #[error("Invalid status '{0}'. Use 'todo', 'in-progress', or 'done'")]
    InvalidStatus(String),
    #[error("Invalid filter '{0}'. Use 'all', 'todo', 'in-progress', or 'done'")]
    InvalidFilter(String),
    #[error("Task with ID {0} not found")]
    NotFound(TaskId),
    #[error("Cannot generate new task ID, maximum value reached")]
    IdOverflow,
    #[error("Task file could not be accessed: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
