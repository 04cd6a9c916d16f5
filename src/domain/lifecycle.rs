//! Task lifecycle guard.
//!
//! A task is either `Open` or `Completed`. Completion is one-way: a completed
//! task may be read but never mutated, completed again or deleted.

use thiserror::Error;

use super::task::Task;

/// The lifecycle state of a task, derived from its `completed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Open,
    Completed,
}

impl TaskState {
    /// Derives the state of `task`.
    #[must_use]
    pub const fn of(task: &Task) -> Self {
        if task.completed {
            Self::Completed
        } else {
            Self::Open
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// An operation was attempted on a task whose state forbids it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task is in an invalid state for this operation")]
pub struct InvalidStateError;

/// Ensures `task` may still be mutated.
///
/// # Errors
///
/// Returns `InvalidStateError` if the task is completed.
pub const fn ensure_open(task: &Task) -> Result<(), InvalidStateError> {
    if TaskState::of(task).is_open() {
        Ok(())
    } else {
        Err(InvalidStateError)
    }
}

/// Transitions an open task to completed. No other field changes.
///
/// # Errors
///
/// Returns `InvalidStateError` if the task is already completed.
pub fn complete(task: Task) -> Result<Task, InvalidStateError> {
    ensure_open(&task)?;
    Ok(task.with_completed(true))
}
