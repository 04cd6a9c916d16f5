//! Domain module for task management.
//!
//! This module contains the task model, its validation rules, the lifecycle
//! guard and the partial-update merge engine. Nothing here performs I/O.

pub mod lifecycle;
pub mod patch;
pub mod task;
pub mod validation;

pub use lifecycle::{InvalidStateError, TaskState, complete, ensure_open};
pub use patch::{FieldPatch, TaskPatch};
pub use task::{Priority, Task, TaskId, Timestamp};
pub use validation::{TaskDraft, ValidTask, ValidationError};
