//! Shared fixtures for integration tests.
//!
//! The `#![allow(dead_code)]` attribute is necessary because each integration
//! test file is compiled as its own crate and uses only part of this module.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};

use todo_list_api::api::{AppConfig, AppState};
use todo_list_api::domain::{Priority, Task, TaskDraft, TaskId};
use todo_list_api::infrastructure::InMemoryTaskRepository;
use todo_list_api::service::TaskService;

// =============================================================================
// Dates
// =============================================================================

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn tomorrow() -> NaiveDate {
    today() + Days::new(1)
}

pub fn yesterday() -> NaiveDate {
    today() - Days::new(1)
}

// =============================================================================
// Service / State Creation Helpers
// =============================================================================

/// Creates a service over a fresh in-memory repository.
pub fn create_test_service() -> TaskService {
    TaskService::new(Arc::new(InMemoryTaskRepository::new()))
}

/// Creates an `AppState` with an in-memory repository and default paging.
pub fn create_test_app_state() -> AppState {
    AppState::new(create_test_service(), AppConfig::default())
}

// =============================================================================
// Task Fixtures
// =============================================================================

/// A valid payload due tomorrow.
pub fn draft(title: &str, category: &str) -> TaskDraft {
    TaskDraft {
        title: Some(title.to_string()),
        description: Some(String::new()),
        priority: Some(Priority::Medium),
        due_date: Some(tomorrow()),
        completed: None,
        category: Some(category.to_string()),
    }
}

/// Creates a task through the service and returns it with its id.
pub async fn create_and_save_task(service: &TaskService, title: &str, category: &str) -> (TaskId, Task) {
    let task = service
        .create(draft(title, category))
        .await
        .expect("fixture task should be valid");
    let id = task.id.expect("saved task should have an id");
    (id, task)
}
