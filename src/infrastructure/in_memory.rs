//! In-memory repository implementation.
//!
//! Suitable for development and tests. Tasks are kept in a `BTreeMap` keyed by
//! id, so an unsorted listing follows id order, which for v7 ids is creation
//! order.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - `save` is atomic under the write lock

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskId, Timestamp};
use crate::infrastructure::{Page, Pageable, RepositoryError, TaskRepository, paginate};

/// Returns `true` if `category` contains `term`, ignoring case.
///
/// An empty term matches every category.
#[must_use]
pub fn category_contains_ignore_case(category: &str, term: &str) -> bool {
    category.to_lowercase().contains(&term.to_lowercase())
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use todo_list_api::domain::{Priority, Task};
/// use todo_list_api::infrastructure::{InMemoryTaskRepository, TaskRepository};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repository = InMemoryTaskRepository::new();
/// let due = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
/// let saved = repository
///     .save(Task::new("Study", "", Priority::High, due, "College"))
///     .await
///     .unwrap();
///
/// assert!(saved.id.is_some());
/// assert!(saved.created_at.is_some());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<BTreeMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, task: Task) -> Result<Task, RepositoryError> {
        let mut guard = self.tasks.write().await;

        let stored = match task.id {
            None => {
                let id = TaskId::generate();
                task.with_identity(id, Timestamp::now())
            }
            Some(id) => {
                let Some(existing) = guard.get(&id) else {
                    return Err(RepositoryError::NotFound(id.to_string()));
                };
                Task {
                    created_at: existing.created_at,
                    ..task
                }
            }
        };

        let Some(id) = stored.id else {
            return Err(RepositoryError::DatabaseError(
                "task has no identifier after save".to_string(),
            ));
        };
        guard.insert(id, stored.clone());
        drop(guard);

        Ok(stored)
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &TaskId) -> Result<bool, RepositoryError> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }

    async fn find_all(&self, pageable: Pageable) -> Result<Page<Task>, RepositoryError> {
        let items: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        Ok(paginate(items, &pageable))
    }

    async fn find_by_category_containing_ignore_case(
        &self,
        pageable: Pageable,
        category: &str,
    ) -> Result<Page<Task>, RepositoryError> {
        let items: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| category_contains_ignore_case(&task.category, category))
            .cloned()
            .collect();
        Ok(paginate(items, &pageable))
    }
}

// =============================================================================
// Tests
// =============================================================================
