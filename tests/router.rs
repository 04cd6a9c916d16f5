//! Integration tests for the HTTP surface.
//!
//! Requests are sent through the full router with `tower::ServiceExt::oneshot`.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{create_test_app_state, tomorrow, yesterday};
use todo_list_api::api::router;

// =============================================================================
// Helpers
// =============================================================================

#[fixture]
fn app() -> Router {
    router(create_test_app_state())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn payload(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "description": "",
        "priority": "MEDIUM",
        "dueDate": tomorrow().to_string(),
        "category": category,
    })
}

async fn create(app: &Router, title: &str, category: &str) -> String {
    let (status, body) = send(app, Method::POST, "/api/tasks", Some(payload(title, category))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_health(app: Router) {
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[rstest]
#[tokio::test]
async fn test_create_returns_created_task(app: Router) {
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(payload("Estudar", "Faculdade")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Estudar");
    assert_eq!(body["priority"], "MEDIUM");
    assert_eq!(body["completed"], false);
    assert_eq!(body["dueDate"], tomorrow().to_string());
    assert!(body["createdAt"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_create_with_past_date_returns_field_errors(app: Router) {
    let mut request = payload("Estudar", "Faculdade");
    request["dueDate"] = json!(yesterday().to_string());

    let (status, body) = send(&app, Method::POST, "/api/tasks", Some(request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["fieldErrors"]["dueDate"], "due date must be a future date");
    assert!(body["timestamp"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_malformed_json_is_bad_request(app: Router) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tasks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_get_unknown_and_malformed_ids(app: Router) {
    let unknown = format!("/api/tasks/{}", uuid::Uuid::now_v7());
    let (status, body) = send(&app, Method::GET, &unknown, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send(&app, Method::GET, "/api/tasks/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[rstest]
#[tokio::test]
async fn test_complete_then_mutations_conflict(app: Router) {
    let id = create(&app, "Estudar", "Faculdade").await;
    let task_uri = format!("/api/tasks/{id}");
    let complete_uri = format!("{task_uri}/complete");

    let (status, body) = send(&app, Method::PATCH, &complete_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);

    let (status, body) = send(&app, Method::PATCH, &complete_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TASK_STATE");

    let (status, _) = send(&app, Method::DELETE, &task_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::PATCH, &task_uri, Some(json!({"title": "New"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::PUT, &task_uri, Some(payload("New", "Casa"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::GET, &task_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Estudar");
}

#[rstest]
#[tokio::test]
async fn test_patch_keeps_untouched_fields(app: Router) {
    let mut request = payload("Estudar", "Faculdade");
    request["description"] = json!("Old desc");
    let (_, created) = send(&app, Method::POST, "/api/tasks", Some(request)).await;
    let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"title": "New"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New");
    assert_eq!(body["description"], "Old desc");
    assert_eq!(body["createdAt"], created["createdAt"]);
}

#[rstest]
#[tokio::test]
async fn test_patch_with_null_required_field_is_rejected(app: Router) {
    let id = create(&app, "Estudar", "Faculdade").await;
    let uri = format!("/api/tasks/{id}");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"title": null}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fieldErrors"]["title"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_put_replaces_task(app: Router) {
    let id = create(&app, "Estudar", "Faculdade").await;
    let uri = format!("/api/tasks/{id}");

    let mut request = payload("Limpar", "Casa");
    request["priority"] = json!("LOW");
    let (status, body) = send(&app, Method::PUT, &uri, Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["title"], "Limpar");
    assert_eq!(body["priority"], "LOW");
    assert_eq!(body["category"], "Casa");
}

#[rstest]
#[tokio::test]
async fn test_delete_returns_no_content(app: Router) {
    let id = create(&app, "Estudar", "Faculdade").await;
    let uri = format!("/api/tasks/{id}");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_list_returns_page_body(app: Router) {
    create(&app, "Estudar", "Faculdade").await;

    let (status, body) = send(&app, Method::GET, "/api/tasks?page=0&size=2", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["page"], 0);
    assert_eq!(body["size"], 2);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["totalElements"], 1);
}

#[rstest]
#[tokio::test]
async fn test_list_sorted_by_title(app: Router) {
    for title in ["Beta", "Alpha", "Gamma"] {
        create(&app, title, "Casa").await;
    }

    let (status, body) = send(&app, Method::GET, "/api/tasks?sort=title,asc", None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
}

#[rstest]
#[tokio::test]
async fn test_list_with_unknown_sort_is_bad_request(app: Router) {
    let (status, body) = send(&app, Method::GET, "/api/tasks?sort=owner", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[rstest]
#[tokio::test]
async fn test_search_by_category_ignores_case(app: Router) {
    create(&app, "Estudar", "Faculdade").await;
    create(&app, "Limpar", "Casa").await;

    let (status, body) = send(&app, Method::GET, "/api/tasks/search?category=FACUL", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 1);
    assert_eq!(body["tasks"][0]["category"], "Faculdade");

    let (_, body) = send(&app, Method::GET, "/api/tasks/search", None).await;
    assert_eq!(body["totalElements"], 2);
}
