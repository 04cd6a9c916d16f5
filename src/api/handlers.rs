//! HTTP handlers for the task API.
//!
//! Handlers decode the request, delegate to [`TaskService`] and encode the
//! result. Decoding failures become `400 BAD_REQUEST`; service failures are
//! mapped by [`ApiErrorResponse`].

use std::str::FromStr;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use super::dto::{PageResponse, TaskPatchRequest, TaskRequest, TaskResponse};
use super::error::ApiErrorResponse;
use crate::domain::TaskId;
use crate::infrastructure::{Pageable, Sort};
use crate::service::TaskService;

// =============================================================================
// Application Configuration
// =============================================================================

/// Paging limits applied to list and search requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Page size used when the request does not give one.
    pub default_page_size: u32,
    /// Upper bound for a requested page size.
    pub max_page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: TaskService,
    pub config: AppConfig,
}

impl AppState {
    #[must_use]
    pub const fn new(service: TaskService, config: AppConfig) -> Self {
        Self { service, config }
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for `GET /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// `field` or `field,asc|desc`.
    pub sort: Option<String>,
}

/// Query parameters for `GET /api/tasks/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for; missing means every task matches.
    pub category: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

/// Builds a page request, applying the default size and clamping to
/// `[1, max_page_size]`.
///
/// # Errors
///
/// Returns `400 BAD_REQUEST` if `sort` cannot be parsed.
pub fn build_pageable(
    config: &AppConfig,
    page: Option<u32>,
    size: Option<u32>,
    sort: Option<&str>,
) -> Result<Pageable, ApiErrorResponse> {
    let max_page_size = config.max_page_size.max(1);
    let size = size
        .unwrap_or(config.default_page_size)
        .clamp(1, max_page_size);
    let pageable = Pageable::new(page.unwrap_or(0), size)?;

    match sort.map(str::trim).filter(|sort| !sort.is_empty()) {
        Some(sort) => Ok(pageable.with_sort(Sort::from_str(sort)?)),
        None => Ok(pageable),
    }
}

fn parse_task_id(path: Result<Path<String>, PathRejection>) -> Result<TaskId, ApiErrorResponse> {
    let Path(raw) = path?;
    TaskId::from_str(&raw)
        .map_err(|_| ApiErrorResponse::bad_request(format!("Invalid task id: '{raw}'")))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/tasks`
///
/// # Errors
///
/// `400` for malformed paging parameters, `500` on storage failure.
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<PageResponse>, ApiErrorResponse> {
    let Query(query) = query?;
    let pageable = build_pageable(
        &state.config,
        query.page,
        query.size,
        query.sort.as_deref(),
    )?;

    let page = state.service.list_all(pageable).await?;
    Ok(Json(PageResponse::from(page)))
}

/// `GET /api/tasks/search?category=`
///
/// # Errors
///
/// `400` for malformed paging parameters, `500` on storage failure.
pub async fn search_tasks(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<PageResponse>, ApiErrorResponse> {
    let Query(query) = query?;
    let pageable = build_pageable(
        &state.config,
        query.page,
        query.size,
        query.sort.as_deref(),
    )?;
    let category = query.category.unwrap_or_default();

    let page = state.service.search_by_category(pageable, &category).await?;
    Ok(Json(PageResponse::from(page)))
}

/// `POST /api/tasks`
///
/// # Errors
///
/// `400` for malformed JSON or invalid fields, `500` on storage failure.
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let Json(request) = payload?;
    let task = state.service.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// `GET /api/tasks/{id}`
///
/// # Errors
///
/// `400` for a malformed id, `404` if the task does not exist.
pub async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = parse_task_id(path)?;
    let task = state.service.get_by_id(id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `PUT /api/tasks/{id}`
///
/// # Errors
///
/// `404` if the task does not exist, `409` if it is completed, `400` for
/// invalid input.
pub async fn replace_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = parse_task_id(path)?;
    let Json(request) = payload?;
    let task = state.service.full_replace(id, request.into()).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `PATCH /api/tasks/{id}`
///
/// # Errors
///
/// `404` if the task does not exist, `409` if it is completed, `400` for
/// invalid input.
pub async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<TaskPatchRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = parse_task_id(path)?;
    let Json(request) = payload?;
    let task = state.service.partial_update(id, request.into()).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `PATCH /api/tasks/{id}/complete`
///
/// # Errors
///
/// `404` if the task does not exist, `409` if it is already completed.
pub async fn complete_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = parse_task_id(path)?;
    let task = state.service.complete(id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// `DELETE /api/tasks/{id}`
///
/// # Errors
///
/// `404` if the task does not exist, `409` if it is completed.
pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let id = parse_task_id(path)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
