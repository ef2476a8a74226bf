//! Task API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tasky_core::{
    parse_due_date, DailySummary, FileTaskRepository, ListFilter, NewTask, Priority, Status, Task,
    TaskService, TaskUpdate, TrackerError,
};

use super::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tag: Option<String>,
    pub due_before: Option<String>,
    pub due_today: Option<String>,
    pub overdue: Option<String>,
    pub include_completed: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub permanent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl From<Vec<Task>> for TaskListResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            count: tasks.len(),
            tasks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn tracker_error(err: TrackerError) -> ApiError {
    match err {
        TrackerError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        other => {
            tracing::error!("task store failure: {}", other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Task not found")
}

/// Runs one service call under the state lock on the blocking pool, since
/// every call reads or rewrites the task file.
async fn with_service<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TaskService<FileTaskRepository>) -> tasky_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.lock().await;
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("task worker failed: {}", e),
            )
        })?
        .map_err(tracker_error)
}

fn is_true(flag: &Option<String>) -> bool {
    flag.as_deref()
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn parse_date_param(name: &str, text: &str) -> Result<NaiveDate, ApiError> {
    parse_due_date(text).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid '{}': '{}'", name, text),
        )
    })
}

impl ListQuery {
    fn into_filter(self) -> Result<ListFilter, ApiError> {
        let status = match self.status.as_deref() {
            None => Some(Status::Pending),
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(
                s.parse::<Status>()
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?,
            ),
        };
        let priority = self
            .priority
            .as_deref()
            .map(|p| p.parse::<Priority>())
            .transpose()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
        let due_before = self
            .due_before
            .as_deref()
            .map(|d| parse_date_param("due_before", d))
            .transpose()?;

        Ok(ListFilter {
            status,
            include_completed: is_true(&self.include_completed),
            priority,
            tag: self.tag,
            due_before,
            due_today: is_true(&self.due_today),
            overdue: is_true(&self.overdue),
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Service info
async fn index() -> Json<Value> {
    Json(json!({
        "service": "Tasky API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /api/tasks",
            "GET /api/summary",
            "GET /api/task/{id}",
            "GET /api/search?q=<query>",
            "POST /api/task",
            "POST /api/task/{id}/complete",
            "PUT /api/task/{id}",
            "DELETE /api/task/{id}",
        ],
    }))
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "tasky".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/tasks - List tasks with filters
async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let filter = query.into_filter()?;
    let tasks = with_service(&state, move |svc| svc.list(&filter)).await?;
    Ok(Json(tasks.into()))
}

/// GET /api/summary - Daily digest
async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = query
        .date
        .as_deref()
        .map(|d| parse_date_param("date", d))
        .transpose()?;
    let summary = with_service(&state, move |svc| svc.daily_summary(date)).await?;
    Ok(Json(summary))
}

/// GET /api/task/{id}
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = with_service(&state, move |svc| svc.get(&id)).await?;
    task.map(Json).ok_or_else(not_found)
}

/// GET /api/search?q=
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let q = query.q.unwrap_or_default();
    if q.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing search query 'q'",
        ));
    }
    let tasks = with_service(&state, move |svc| svc.search(&q)).await?;
    Ok(Json(tasks.into()))
}

/// POST /api/task - Create a task
async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = with_service(&state, move |svc| svc.add(req)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/task/{id}/complete
async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = with_service(&state, move |svc| svc.complete(&id)).await?;
    task.map(Json).ok_or_else(not_found)
}

/// PUT /api/task/{id}
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    let task = with_service(&state, move |svc| svc.update(&id, changes)).await?;
    task.map(Json).ok_or_else(not_found)
}

/// DELETE /api/task/{id}?permanent=true
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let archive = !is_true(&query.permanent);
    let token = id.clone();
    let removed = with_service(&state, move |svc| svc.delete(&token, archive)).await?;
    match removed {
        Some(_) => Ok(Json(DeleteResponse { deleted: true, id })),
        None => Err(not_found()),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/tasks", get(list_tasks))
        .route("/api/list", get(list_tasks))
        .route("/api/summary", get(summary))
        .route("/api/search", get(search))
        .route("/api/task", post(create_task))
        .route(
            "/api/task/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/task/{id}/complete", post(complete_task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tasky_core::{FileTaskRepository, TaskService};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileTaskRepository::new(Some(temp_dir.path().to_path_buf())).unwrap();
        let app = crate::server::app(AppState::new(TaskService::new(repo)));
        (app, temp_dir)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = test_app();
        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "tasky");
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let (app, _dir) = test_app();
        let (status, created) = call(
            &app,
            Method::POST,
            "/api/task",
            Some(json!({"title": "Pay rent", "due": "today", "tags": ["home"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["priority"], "high");
        assert_eq!(created["status"], "pending");
        assert_eq!(created["tags"], json!(["home"]));

        let id = created["id"].as_str().unwrap();
        let (status, fetched) = call(&app, Method::GET, &format!("/api/task/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_without_title_is_bad_request() {
        let (app, _dir) = test_app();
        let (status, body) = call(&app, Method::POST, "/api/task", Some(json!({"due": "today"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let (app, _dir) = test_app();
        let (status, body) = call(&app, Method::GET, "/api/task/task_nothing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found");

        let (status, _) = call(&app, Method::POST, "/api/task/task_nothing/complete", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_orders_and_filters() {
        let (app, _dir) = test_app();
        for (title, priority) in [("low one", "low"), ("high one", "high"), ("medium one", "medium")] {
            call(
                &app,
                Method::POST,
                "/api/task",
                Some(json!({"title": title, "priority": priority})),
            )
            .await;
        }

        let (status, body) = call(&app, Method::GET, "/api/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        let titles: Vec<&str> = body["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["high one", "medium one", "low one"]);

        let (_, body) = call(&app, Method::GET, "/api/list?priority=medium", None).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["tasks"][0]["title"], "medium one");

        let (status, _) = call(&app, Method::GET, "/api/tasks?status=bogus", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_complete_update_and_delete() {
        let (app, _dir) = test_app();
        let (_, created) = call(&app, Method::POST, "/api/task", Some(json!({"title": "Review PR"}))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = call(
            &app,
            Method::PUT,
            &format!("/api/task/{}", id),
            Some(json!({"notes": "check tests", "due": "2026-01-20"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["notes"], "check tests");
        assert_eq!(updated["due"], "2026-01-20");
        assert_eq!(updated["title"], "Review PR");

        let (status, done) = call(&app, Method::POST, &format!("/api/task/{}/complete", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["status"], "completed");

        let (_, listed) = call(&app, Method::GET, "/api/tasks?status=all", None).await;
        assert_eq!(listed["count"], 1);

        let (status, deleted) = call(&app, Method::DELETE, &format!("/api/task/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["deleted"], true);

        let (_, archived) = call(&app, Method::GET, &format!("/api/task/{}", id), None).await;
        assert_eq!(archived["status"], "archived");

        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("/api/task/{}?permanent=true", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::GET, &format!("/api/task/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_all_persist() {
        let (app, _dir) = test_app();
        let handles: Vec<_> = (0..12)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    call(&app, Method::POST, "/api/task", Some(json!({"title": format!("Task {}", i)})))
                        .await
                })
            })
            .collect();
        for handle in handles {
            let (status, _) = handle.await.unwrap();
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = call(&app, Method::GET, "/api/tasks", None).await;
        assert_eq!(body["count"], 12);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (app, _dir) = test_app();
        call(&app, Method::POST, "/api/task", Some(json!({"title": "Buy milk"}))).await;

        let (status, _) = call(&app, Method::GET, "/api/search", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&app, Method::GET, "/api/search?q=MILK", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_summary_empty() {
        let (app, _dir) = test_app();
        let (status, body) = call(&app, Method::GET, "/api/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "No tasks for today. Enjoy!");
        assert_eq!(body["due_today"], json!([]));

        let (status, _) = call(&app, Method::GET, "/api/summary?date=whenever", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
