//! HTTP surface for the todo service.
//!
//! # Design
//! Routes map one-to-one onto `TodoService` operations. Every response uses
//! the `{ success, message?, data?, error? }` envelope; `error::ApiError`
//! picks the status code from the core's tagged failure.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;

use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, patch},
    Router,
};
use todo_core::{Clock, MemoryStore, SystemClock, TodoService};
use tokio::net::TcpListener;
use tracing::{info, warn};

use handlers::*;

pub type SharedService = Arc<TodoService<MemoryStore>>;

#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
    pub started: Instant,
}

/// Router over a fresh in-memory store on the system clock.
pub fn app() -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = TodoService::new(MemoryStore::new(clock.clone()), clock);
    app_with(Arc::new(service))
}

pub fn app_with(service: SharedService) -> Router {
    let state = AppState {
        service,
        started: Instant::now(),
    };
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/completed/all", get(completed_todos))
        .route("/api/todos/pending/all", get(pending_todos))
        .route("/api/todos/urgent/all", get(urgent_todos))
        .route("/api/todos/stats/overview", get(stats_overview))
        .route("/api/todos/category/{category}", get(todos_by_category))
        .route("/api/todos/priority/{priority}", get(todos_by_priority))
        .route("/api/todos/search/{query}", get(search_todos))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(toggle_todo))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
