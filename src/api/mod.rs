//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use dto::{PageResponse, PriorityDto, TaskPatchRequest, TaskRequest, TaskResponse};
pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{
    AppConfig, AppState, HealthResponse, ListQuery, SearchQuery, build_pageable, complete_task,
    create_task, delete_task, get_task, health_check, list_tasks, replace_task, search_tasks,
    update_task,
};
pub use routes::router;
