//! Task application service.
//!
//! Orchestrates every task operation: load, guard, validate or merge, save.
//! For operations that target an id, a missing task is reported first, then a
//! completed task, then invalid input.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::domain::{Task, TaskDraft, TaskId, TaskPatch, ValidationError, lifecycle};
use crate::infrastructure::{Page, Pageable, RepositoryError, TaskRepository};

// =============================================================================
// Service Error
// =============================================================================

/// Failure kinds surfaced by [`TaskService`]. Each maps to a distinct response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task not found: {0}")]
    ResourceNotFound(TaskId),

    #[error("task {0} is in an invalid state for this operation")]
    InvalidState(TaskId),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// The reference date for due-date validation.
///
/// **Note**: This is an impure function (side effect: system clock).
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// =============================================================================
// Task Service
// =============================================================================

/// Application service for tasks.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskService")
            .field("repository", &"Arc<dyn TaskRepository>")
            .finish()
    }
}

impl TaskService {
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Validates and stores a new task.
    ///
    /// The payload may set `completed = true`; the complete transition is
    /// not involved.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` listing every invalid field, or
    /// `ServiceError::Repository` if storage fails.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, ServiceError> {
        let task = draft.validate(today())?.into_task();

        let saved = self
            .repository
            .save(task)
            .await
            .map_err(|error| storage_failure(None, error))?;

        tracing::info!(task_id = ?saved.id, category = %saved.category, "Task created");
        Ok(saved)
    }

    /// Returns the task with `id`. Completed tasks are readable.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ResourceNotFound` if no such task exists.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.load(id).await
    }

    /// Lists every task, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn list_all(&self, pageable: Pageable) -> Result<Page<Task>, ServiceError> {
        self.repository
            .find_all(pageable)
            .await
            .map_err(|error| storage_failure(None, error))
    }

    /// Lists tasks whose category contains `category`, ignoring case. An empty
    /// term matches every task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if storage fails.
    pub async fn search_by_category(
        &self,
        pageable: Pageable,
        category: &str,
    ) -> Result<Page<Task>, ServiceError> {
        self.repository
            .find_by_category_containing_ignore_case(pageable, category)
            .await
            .map_err(|error| storage_failure(None, error))
    }

    /// Marks an open task as completed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ResourceNotFound` if no such task exists, or
    /// `ServiceError::InvalidState` if it is already completed.
    pub async fn complete(&self, id: TaskId) -> Result<Task, ServiceError> {
        let task = self.load(id).await?;
        let completed = lifecycle::complete(task).map_err(|_| rejected(id, "complete"))?;

        let saved = self.store(id, completed).await?;
        tracing::info!(task_id = %id, "Task completed");
        Ok(saved)
    }

    /// Overwrites every mutable field of an open task.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound`, then `InvalidState`, then `Validation`, in
    /// that order of precedence.
    pub async fn full_replace(&self, id: TaskId, draft: TaskDraft) -> Result<Task, ServiceError> {
        let task = self.load(id).await?;
        guard(id, &task, "full_replace")?;

        let replaced = draft.validate(today())?.apply_to(task);

        let saved = self.store(id, replaced).await?;
        tracing::info!(task_id = %id, "Task replaced");
        Ok(saved)
    }

    /// Applies a sparse change-set to an open task.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound`, then `InvalidState`, then `Validation`, in
    /// that order of precedence.
    pub async fn partial_update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, ServiceError> {
        let task = self.load(id).await?;
        guard(id, &task, "partial_update")?;

        let merged = patch.merge(task, today())?;

        let saved = self.store(id, merged).await?;
        tracing::info!(task_id = %id, empty_patch = patch.is_empty(), "Task updated");
        Ok(saved)
    }

    /// Deletes an open task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ResourceNotFound` if no such task exists, or
    /// `ServiceError::InvalidState` if it is completed.
    pub async fn delete(&self, id: TaskId) -> Result<(), ServiceError> {
        let task = self.load(id).await?;
        guard(id, &task, "delete")?;

        let deleted = self
            .repository
            .delete_by_id(&id)
            .await
            .map_err(|error| storage_failure(Some(id), error))?;

        if !deleted {
            return Err(ServiceError::ResourceNotFound(id));
        }

        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    async fn load(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.repository
            .find_by_id(&id)
            .await
            .map_err(|error| storage_failure(Some(id), error))?
            .ok_or(ServiceError::ResourceNotFound(id))
    }

    async fn store(&self, id: TaskId, task: Task) -> Result<Task, ServiceError> {
        self.repository
            .save(task)
            .await
            .map_err(|error| storage_failure(Some(id), error))
    }
}

fn guard(id: TaskId, task: &Task, operation: &str) -> Result<(), ServiceError> {
    lifecycle::ensure_open(task).map_err(|_| rejected(id, operation))
}

fn rejected(id: TaskId, operation: &str) -> ServiceError {
    tracing::warn!(task_id = %id, operation, "Operation rejected: task is completed");
    ServiceError::InvalidState(id)
}

/// Classifies a repository failure. A task that vanished between load and
/// write is reported as not found.
fn storage_failure(id: Option<TaskId>, error: RepositoryError) -> ServiceError {
    match (id, error) {
        (Some(id), RepositoryError::NotFound(_)) => ServiceError::ResourceNotFound(id),
        (id, error) => {
            tracing::error!(task_id = ?id, %error, "Repository operation failed");
            ServiceError::Repository(error)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
