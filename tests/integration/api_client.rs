//! Integration tests for the REST client against an in-process mock backend.
//!
//! An axum server on `127.0.0.1:0` stands in for the task-management API.
//! These tests validate:
//! - Bearer auth on every request, login storing the access token
//! - The board's status write is `PATCH /tasks/{id}/ {"status": ...}`
//! - Status codes map onto `ApiError` variants
//! - `ApiClient` as a `TaskBackend` drives the optimistic coordinator
//! - Comments, notifications and user search request shapes

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use parking_lot::Mutex;
use serde_json::{Value, json};

use taskboard::api::{ApiClient, ApiError, BoardScope, TaskBackend};
use taskboard::board::{BoardStore, Coordinator, NoticeLevel, TransitionRequest};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskStatus};

const TOKEN: &str = "test-access-token";

/// State of the mock backend.
#[derive(Default)]
struct Mock {
    tasks: Mutex<Vec<Value>>,
    patches: Mutex<Vec<(u64, Value)>>,
    auth: Mutex<Vec<Option<String>>>,
    comments: Mutex<Vec<Value>>,
    read_all: AtomicBool,
    fail_patches: AtomicBool,
}

impl Mock {
    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth.lock().push(value);
    }
}

fn task_json(id: u64, title: &str, status: &str, project: Option<u64>) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "priority": "MED",
        "due_date": null,
        "assignee": null,
        "project": project,
        "is_personal": project.is_none(),
        "created_by": 1,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

fn user_json(id: u64, username: &str) -> Value {
    json!({"id": id, "username": username, "email": format!("{username}@example.com")})
}

async fn my_tasks(State(mock): State<Arc<Mock>>, headers: HeaderMap) -> Json<Value> {
    mock.record_auth(&headers);
    let tasks: Vec<Value> = mock
        .tasks
        .lock()
        .iter()
        .filter(|t| t["is_personal"] == json!(true))
        .cloned()
        .collect();
    Json(Value::Array(tasks))
}

async fn project_tasks(
    State(mock): State<Arc<Mock>>,
    Path(project): Path<u64>,
    headers: HeaderMap,
) -> Json<Value> {
    mock.record_auth(&headers);
    let tasks: Vec<Value> = mock
        .tasks
        .lock()
        .iter()
        .filter(|t| t["project"] == json!(project))
        .cloned()
        .collect();
    Json(Value::Array(tasks))
}

async fn create_project_task(
    State(mock): State<Arc<Mock>>,
    Path(project): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut tasks = mock.tasks.lock();
    let id = tasks.len() as u64 + 100;
    let title = body["title"].as_str().unwrap_or_default().to_string();
    let task = task_json(id, &title, "TODO", Some(project));
    tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn patch_task(
    State(mock): State<Arc<Mock>>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record_auth(&headers);
    mock.patches.lock().push((id, body.clone()));
    if mock.fail_patches.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let mut tasks = mock.tasks.lock();
    let Some(task) = tasks.iter_mut().find(|t| t["id"] == json!(id)) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    };
    if let Some(status) = body.get("status") {
        task["status"] = status.clone();
    }
    Json(task.clone()).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == json!("alice") && body["password"] == json!("pw") {
        Json(json!({"access": TOKEN, "refresh": "refresh-token"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn list_comments(State(mock): State<Arc<Mock>>) -> Json<Value> {
    Json(Value::Array(mock.comments.lock().clone()))
}

async fn create_comment(State(mock): State<Arc<Mock>>, Json(body): Json<Value>) -> Response {
    let mut comments = mock.comments.lock();
    let comment = json!({
        "id": comments.len() + 1,
        "body": body["body"],
        "author": user_json(1, "alice"),
        "created_at": "2025-01-03T00:00:00Z",
        "updated_at": "2025-01-03T00:00:00Z"
    });
    comments.push(comment.clone());
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn notifications() -> Json<Value> {
    Json(json!([{
        "id": 5,
        "title": "Task assigned",
        "message": "You were assigned to Fix login",
        "project": 3,
        "project_name": "Web",
        "task": 7,
        "task_title": "Fix login",
        "is_read": false,
        "created_at": "2025-01-02T00:00:00Z"
    }]))
}

async fn read_all(State(mock): State<Arc<Mock>>) -> Json<Value> {
    mock.read_all.store(true, Ordering::SeqCst);
    Json(json!({"message": "ok"}))
}

async fn search_users(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let query = params.get("search").cloned().unwrap_or_default();
    let users: Vec<Value> = ["alice", "bob", "alfred"]
        .iter()
        .enumerate()
        .filter(|(_, name)| name.starts_with(query.as_str()))
        .map(|(i, name)| user_json(i as u64 + 1, name))
        .collect();
    Json(Value::Array(users))
}

/// Start the mock backend in-process and return its API base URL.
async fn start_backend(mock: Arc<Mock>) -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/api/my-tasks/", get(my_tasks))
        .route(
            "/api/projects/{id}/tasks/",
            get(project_tasks).post(create_project_task),
        )
        .route("/api/tasks/{id}/", patch(patch_task))
        .route(
            "/api/tasks/{id}/comments/",
            get(list_comments).post(create_comment),
        )
        .route("/api/login/", post(login))
        .route("/api/notifications/", get(notifications))
        .route("/api/notifications/read-all/", post(read_all))
        .route("/api/users/", get(search_users))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock backend");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), handle)
}

/// Mock seeded with the canonical board: task 7 in TODO on project 3.
fn seeded_mock() -> Arc<Mock> {
    let mock = Arc::new(Mock::default());
    {
        let mut tasks = mock.tasks.lock();
        tasks.push(task_json(7, "Fix login", "TODO", Some(3)));
        tasks.push(task_json(8, "Write docs", "DONE", Some(3)));
        tasks.push(task_json(9, "Water plants", "TODO", None));
    }
    mock
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5))
        .unwrap()
        .with_token(TOKEN)
}

// =============================================================================
// Task reads and writes
// =============================================================================

#[tokio::test]
async fn fetches_project_and_personal_tasks_with_bearer_token() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);

    let project = api.fetch_tasks(BoardScope::Project(3)).await.unwrap();
    assert_eq!(project.len(), 2);
    assert_eq!(project[0].id, TaskId::new(7));
    assert_eq!(project[0].status, TaskStatus::Todo);

    let personal = api.fetch_tasks(BoardScope::Personal).await.unwrap();
    assert_eq!(personal.len(), 1);
    assert!(personal[0].is_personal);

    let expected = Some(format!("Bearer {TOKEN}"));
    assert!(mock.auth.lock().iter().all(|a| *a == expected));
}

#[tokio::test]
async fn status_update_sends_partial_patch() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);

    let task = api
        .update_status(TaskId::new(7), TaskStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);

    let patches = mock.patches.lock().clone();
    assert_eq!(patches, vec![(7, json!({"status": "INPR"}))]);
}

#[tokio::test]
async fn create_task_posts_only_set_fields() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);

    let task = api
        .create_task(3, &NewTask::titled("New card"))
        .await
        .unwrap();
    assert_eq!(task.title, "New card");
    assert_eq!(task.project, Some(3));

    let err = api.create_task(3, &NewTask::titled("  ")).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let mock = seeded_mock();
    mock.fail_patches.store(true, Ordering::SeqCst);
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);

    let err = api
        .set_task_status(TaskId::new(7), TaskStatus::Done)
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_task_maps_to_not_found() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(mock).await;
    let api = client(&base);

    let err = api
        .set_task_status(TaskId::new(404), TaskStatus::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{addr}/api"));
    let err = api.fetch_tasks(BoardScope::Personal).await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
}

// =============================================================================
// The optimistic protocol over HTTP (task 7: TODO -> IN PROGRESS)
// =============================================================================

#[tokio::test]
async fn drop_on_in_progress_confirms_after_refresh() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);
    let scope = BoardScope::Project(3);

    let mut store = BoardStore::from_tasks(api.fetch_tasks(scope).await.unwrap());
    let mut coordinator = Coordinator::new();
    let settlement = coordinator
        .run_transition(
            &mut store,
            &api,
            scope,
            TransitionRequest {
                task_id: TaskId::new(7),
                target: TaskStatus::InProgress,
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(settlement.notice.level, NoticeLevel::Info);
    assert_eq!(
        store.get(TaskId::new(7)).unwrap().status,
        TaskStatus::InProgress
    );
    assert_eq!(mock.patches.lock()[0], (7, json!({"status": "INPR"})));
}

#[tokio::test]
async fn failed_write_restores_server_state() {
    let mock = seeded_mock();
    mock.fail_patches.store(true, Ordering::SeqCst);
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);
    let scope = BoardScope::Project(3);

    let mut store = BoardStore::from_tasks(api.fetch_tasks(scope).await.unwrap());
    let mut coordinator = Coordinator::new();
    let settlement = coordinator
        .run_transition(
            &mut store,
            &api,
            scope,
            TransitionRequest {
                task_id: TaskId::new(7),
                target: TaskStatus::InProgress,
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(settlement.notice.level, NoticeLevel::Error);
    let fresh: Vec<Task> = api.fetch_tasks(scope).await.unwrap();
    assert_eq!(store.tasks(), fresh.as_slice());
    assert_eq!(store.get(TaskId::new(7)).unwrap().status, TaskStatus::Todo);
}

// =============================================================================
// Auth, comments, notifications, users
// =============================================================================

#[tokio::test]
async fn login_stores_access_token() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = ApiClient::new(&base, Duration::from_secs(5)).unwrap();
    assert!(!api.has_token());

    let err = api.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { status: 401 }));
    assert!(!api.has_token());

    let pair = api.login("alice", "pw").await.unwrap();
    assert_eq!(pair.access, TOKEN);
    assert!(api.has_token());

    api.fetch_tasks(BoardScope::Personal).await.unwrap();
    assert_eq!(
        mock.auth.lock().last().cloned().flatten(),
        Some(format!("Bearer {TOKEN}"))
    );
}

#[tokio::test]
async fn comments_round_trip() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(mock).await;
    let api = client(&base);

    let comment = api
        .create_comment(TaskId::new(7), "  Looks good  ")
        .await
        .unwrap();
    assert_eq!(comment.body, "Looks good");
    assert_eq!(comment.author.username, "alice");

    let comments = api.list_comments(TaskId::new(7)).await.unwrap();
    assert_eq!(comments.len(), 1);

    let err = api.create_comment(TaskId::new(7), "   ").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn notifications_list_and_mark_all_read() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(Arc::clone(&mock)).await;
    let api = client(&base);

    let list = api.list_notifications().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].task, Some(TaskId::new(7)));
    assert!(!list[0].is_read);

    api.mark_all_notifications_read().await.unwrap();
    assert!(mock.read_all.load(Ordering::SeqCst));
}

#[tokio::test]
async fn user_search_sends_query() {
    let mock = seeded_mock();
    let (base, _handle) = start_backend(mock).await;
    let api = client(&base);

    let users = api.search_users("al").await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "alfred"]);
}
