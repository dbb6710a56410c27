//! One handler per core operation. Handlers parse path and body input, call
//! the service and wrap the result; all decisions live in `todo_core`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use todo_core::{
    CreateTodo, ListParams, ScoredTodo, StatsOverview, TodoError, TodoId, TodoView, UpdateTodo,
};

use crate::error::{ApiError, Context, ErrorBody};
use crate::response::Envelope;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub store: &'static str,
    pub todos: usize,
    /// Seconds since the router was built.
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
}

pub async fn root() -> Json<Banner> {
    Json(Banner {
        message: "todo API is running",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK",
        store: "memory",
        todos: state.service.store().len().await,
        uptime: state.started.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
    })
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(
            "requested endpoint not found",
            Some(uri.path().to_string()),
        )),
    )
}

/// Turn an extractor rejection into a validation failure inside the envelope.
fn accept<T, R: std::fmt::Display>(extracted: Result<T, R>, message: &'static str) -> ApiResult<T> {
    extracted.map_err(|rejection| ApiError::new(message, TodoError::validation(rejection.to_string())))
}

fn parse_id(
    raw: Result<Path<String>, PathRejection>,
    message: &'static str,
) -> ApiResult<TodoId> {
    let Path(raw) = accept(raw, message)?;
    raw.parse::<TodoId>().context(message)
}

pub async fn list_todos(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Envelope<Vec<TodoView>>> {
    const FAILED: &str = "failed to fetch todos";
    let Query(params) = accept(params, FAILED)?;
    let page = state.service.list(&params).await.context(FAILED)?;
    Ok(Envelope::ok(page.items).with_pagination(page.pagination))
}

pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Envelope<TodoView>> {
    const FAILED: &str = "failed to fetch todo";
    let id = parse_id(id, FAILED)?;
    let todo = state.service.get(id).await.context(FAILED)?;
    Ok(Envelope::ok(todo))
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> ApiResult<(StatusCode, Envelope<TodoView>)> {
    const FAILED: &str = "failed to create todo";
    let Json(input) = accept(payload, FAILED)?;
    let todo = state.service.create(input).await.context(FAILED)?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok(todo).with_message("todo created"),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> ApiResult<Envelope<TodoView>> {
    const FAILED: &str = "failed to update todo";
    let id = parse_id(id, FAILED)?;
    let Json(input) = accept(payload, FAILED)?;
    let todo = state.service.update(id, input).await.context(FAILED)?;
    Ok(Envelope::ok(todo).with_message("todo updated"))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Envelope<TodoView>> {
    const FAILED: &str = "failed to delete todo";
    let id = parse_id(id, FAILED)?;
    let todo = state.service.delete(id).await.context(FAILED)?;
    Ok(Envelope::ok(todo).with_message("todo deleted"))
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Envelope<TodoView>> {
    const FAILED: &str = "failed to toggle todo";
    let id = parse_id(id, FAILED)?;
    let todo = state.service.toggle(id).await.context(FAILED)?;
    let message = if todo.todo.completed {
        "todo marked as completed"
    } else {
        "todo marked as pending"
    };
    Ok(Envelope::ok(todo).with_message(message))
}

pub async fn completed_todos(State(state): State<AppState>) -> ApiResult<Envelope<Vec<TodoView>>> {
    let todos = state
        .service
        .completed()
        .await
        .context("failed to fetch completed todos")?;
    Ok(Envelope::counted(todos))
}

pub async fn pending_todos(State(state): State<AppState>) -> ApiResult<Envelope<Vec<TodoView>>> {
    let todos = state
        .service
        .pending()
        .await
        .context("failed to fetch pending todos")?;
    Ok(Envelope::counted(todos))
}

pub async fn urgent_todos(State(state): State<AppState>) -> ApiResult<Envelope<Vec<TodoView>>> {
    let todos = state
        .service
        .urgent()
        .await
        .context("failed to fetch urgent todos")?;
    Ok(Envelope::counted(todos))
}

pub async fn todos_by_category(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
) -> ApiResult<Envelope<Vec<TodoView>>> {
    const FAILED: &str = "failed to fetch todos by category";
    let Path(category) = accept(category, FAILED)?;
    let todos = state.service.by_category(&category).await.context(FAILED)?;
    Ok(Envelope::counted(todos))
}

pub async fn todos_by_priority(
    State(state): State<AppState>,
    priority: Result<Path<String>, PathRejection>,
) -> ApiResult<Envelope<Vec<TodoView>>> {
    const FAILED: &str = "failed to fetch todos by priority";
    let Path(priority) = accept(priority, FAILED)?;
    let todos = state.service.by_priority(&priority).await.context(FAILED)?;
    Ok(Envelope::counted(todos))
}

pub async fn search_todos(
    State(state): State<AppState>,
    query: Result<Path<String>, PathRejection>,
) -> ApiResult<Envelope<Vec<ScoredTodo>>> {
    const FAILED: &str = "search failed";
    let Path(query) = accept(query, FAILED)?;
    let hits = state.service.search(&query).await.context(FAILED)?;
    Ok(Envelope::counted(hits).with_query(query))
}

pub async fn stats_overview(State(state): State<AppState>) -> ApiResult<Envelope<StatsOverview>> {
    let stats = state
        .service
        .stats()
        .await
        .context("failed to fetch stats")?;
    Ok(Envelope::ok(stats))
}
