//! Route table for the task API.

use axum::Router;
use axum::routing::{get, patch};

use super::handlers::{
    AppState, complete_task, create_task, delete_task, get_task, health_check, list_tasks,
    replace_task, search_tasks, update_task,
};

/// Builds the application router with every task route and the health check.
///
/// Middleware (tracing, CORS) is layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/search", get(search_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task)
                .put(replace_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .route("/api/tasks/{id}/complete", patch(complete_task))
        .with_state(state)
}
