//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are separate from domain models; conversions are written out field by
//! field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{FieldPatch, Priority, Task, TaskDraft, TaskPatch};
use crate::infrastructure::Page;

// =============================================================================
// Task DTOs
// =============================================================================

/// Request body for create and full replace.
///
/// Every field is optional on the wire so that a missing field is reported as
/// a validation cause rather than a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<PriorityDto>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<TaskRequest> for TaskDraft {
    fn from(request: TaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            priority: request.priority.map(Priority::from),
            due_date: request.due_date,
            completed: request.completed,
            category: request.category,
        }
    }
}

/// Request body for a partial update.
///
/// An omitted key leaves the field untouched; an explicit `null` is a request
/// to clear it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatchRequest {
    #[serde(default)]
    pub title: FieldPatch<String>,
    #[serde(default)]
    pub description: FieldPatch<String>,
    #[serde(default)]
    pub priority: FieldPatch<PriorityDto>,
    #[serde(default)]
    pub due_date: FieldPatch<NaiveDate>,
    #[serde(default)]
    pub completed: FieldPatch<bool>,
    #[serde(default)]
    pub category: FieldPatch<String>,
}

impl From<TaskPatchRequest> for TaskPatch {
    fn from(request: TaskPatchRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            priority: request.priority.map(Priority::from),
            due_date: request.due_date,
            completed: request.completed,
            category: request.category,
        }
    }
}

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: PriorityDto,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub category: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.map(|id| id.to_string()).unwrap_or_default(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: PriorityDto::from(task.priority),
            due_date: task.due_date,
            completed: task.completed,
            category: task.category.clone(),
            created_at: task
                .created_at
                .map(|created_at| created_at.to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

/// Paginated listing body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub tasks: Vec<TaskResponse>,
    pub page: u32,
    pub size: u32,
    pub total_pages: u64,
    pub total_elements: u64,
}

impl From<Page<Task>> for PageResponse {
    fn from(page: Page<Task>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(TaskResponse::from);
        Self {
            tasks: page.content,
            page: page.page,
            size: page.size,
            total_pages,
            total_elements: page.total_elements,
        }
    }
}

// =============================================================================
// Enum DTOs
// =============================================================================

/// DTO for priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriorityDto {
    High,
    Medium,
    Low,
}

impl From<Priority> for PriorityDto {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::High => Self::High,
            Priority::Medium => Self::Medium,
            Priority::Low => Self::Low,
        }
    }
}

impl From<PriorityDto> for Priority {
    fn from(dto: PriorityDto) -> Self {
        match dto {
            PriorityDto::High => Self::High,
            PriorityDto::Medium => Self::Medium,
            PriorityDto::Low => Self::Low,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
