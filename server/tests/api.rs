use std::sync::Arc;

use axum::{
    http::{self, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todo_core::{ManualClock, MemoryStore, TodoService};
use todo_server::{app, app_with};
use tower::ServiceExt;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn frozen_app() -> Router {
    let clock = Arc::new(ManualClock::new(start()));
    let service = TodoService::new(MemoryStore::new(clock.clone()), clock);
    app_with(Arc::new(service))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn empty(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

/// Sends `request` through a clone of `app` and returns status and body.
async fn send(app: &Router, request: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, json_request("POST", "/api/todos", &body.to_string())).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"].clone()
}

// --- root / health ---

#[tokio::test]
async fn root_banner_and_health() {
    let app = app();
    let (status, json) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));

    let (status, json) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["todos"], 0);
}

#[tokio::test]
async fn unknown_route_returns_404_envelope() {
    let (status, json) = send(&app(), get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "/api/nope");
}

// --- list ---

#[tokio::test]
async fn list_empty_has_pagination() {
    let (status, json) = send(&app(), get("/api/todos")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "success": true,
            "data": [],
            "pagination": {
                "currentPage": 1,
                "totalPages": 0,
                "totalItems": 0,
                "itemsPerPage": 10
            }
        })
    );
}

#[tokio::test]
async fn list_pages_filters_and_decorates_with_kst() {
    let app = frozen_app();
    for i in 0..15 {
        let priority = if i % 3 == 0 { "high" } else { "low" };
        create(&app, json!({ "title": format!("t{i}"), "priority": priority })).await;
    }

    let (_, json) = send(&app, get("/api/todos?page=2&limit=10")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["pagination"]["currentPage"], 2);
    assert_eq!(json["pagination"]["totalPages"], 2);
    assert_eq!(json["pagination"]["totalItems"], 15);
    assert!(json["data"][0]["createdAtKST"].is_string());

    let (_, json) = send(&app, get("/api/todos?priority=high&limit=abc")).await;
    assert_eq!(json["pagination"]["totalItems"], 5);
    assert_eq!(json["pagination"]["itemsPerPage"], 10);
}

#[tokio::test]
async fn malformed_query_string_uses_failure_envelope() {
    let (status, json) = send(&frozen_app(), get("/api/todos?page=1&page=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "failed to fetch todos");
    assert!(json["error"].as_str().unwrap().contains("page"));
}

#[tokio::test]
async fn huge_page_is_empty_not_the_first_page() {
    let app = frozen_app();
    create(&app, json!({ "title": "only" })).await;
    let (status, json) = send(&app, get("/api/todos?page=99999999999999999999999")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["pagination"]["totalItems"], 1);
    assert_eq!(json["pagination"]["currentPage"], u64::MAX);
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_derived_fields() {
    let app = frozen_app();
    let todo = create(
        &app,
        json!({
            "title": "Buy milk",
            "priority": "high",
            "dueDate": "2025-06-01T14:00:00Z"
        }),
    )
    .await;

    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["completed"], false);
    assert_eq!(todo["priority"], "high");
    assert_eq!(todo["isUrgent"], true);
    assert_eq!(todo["timeRemaining"], "2시간 남음");
    assert!(todo["createdAtKST"].is_string());
    assert!(todo["id"].is_string());
}

#[tokio::test]
async fn create_without_due_date_has_null_time_remaining() {
    let todo = create(&frozen_app(), json!({ "title": "someday" })).await;
    assert_eq!(todo["timeRemaining"], Value::Null);
    assert_eq!(todo["isUrgent"], false);
    assert_eq!(todo["priority"], "medium");
}

#[tokio::test]
async fn create_rejects_invalid_payloads_with_400() {
    let app = frozen_app();
    let cases = [
        json!({ "title": "   " }),
        json!({ "description": "no title" }),
        json!({ "title": "x", "priority": "urgent" }),
        json!({ "title": "x", "dueDate": "2020-01-01T00:00:00Z" }),
        json!({ "title": "x".repeat(201) }),
    ];
    for body in cases {
        let (status, json) = send(&app, json_request("POST", "/api/todos", &body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "failed to create todo");
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn create_rejects_malformed_json_with_400() {
    let (status, json) = send(&frozen_app(), json_request("POST", "/api/todos", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

// --- single todo ---

#[tokio::test]
async fn malformed_id_is_400_and_unknown_id_is_404() {
    let app = frozen_app();
    let (status, _) = send(&app, get("/api/todos/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, get("/api/todos/%FF")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "failed to fetch todo");

    let missing = "/api/todos/00000000-0000-4000-8000-000000000000";
    let (status, json) = send(&app, get(missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({ "success": false, "message": "todo not found" }));

    let (status, _) = send(&app, empty("DELETE", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, empty("PATCH", &format!("{missing}/toggle"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crud_lifecycle() {
    let app = frozen_app();
    let todo = create(&app, json!({ "title": "Write report", "category": "work" })).await;
    let uri = format!("/api/todos/{}", todo["id"].as_str().unwrap());

    let (status, json) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Write report");
    assert!(json["data"].get("createdAtKST").is_none());

    let (status, json) = send(
        &app,
        json_request("PUT", &uri, r#"{"title":"Write final report","category":null}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "todo updated");
    assert_eq!(json["data"]["title"], "Write final report");
    assert!(json["data"].get("category").is_none());

    let (status, _) = send(&app, json_request("PUT", &uri, r#"{"priority":"urgent"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, json_request("PUT", &uri, r#"{"title":null}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "title is required");

    let (_, json) = send(&app, empty("PATCH", &format!("{uri}/toggle"))).await;
    assert_eq!(json["message"], "todo marked as completed");
    assert_eq!(json["data"]["completed"], true);
    let (_, json) = send(&app, empty("PATCH", &format!("{uri}/toggle"))).await;
    assert_eq!(json["message"], "todo marked as pending");
    assert_eq!(json["data"]["completed"], false);

    let (status, json) = send(&app, empty("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "todo deleted");
    assert_eq!(json["data"]["title"], "Write final report");

    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- views ---

#[tokio::test]
async fn fixed_views_carry_count() {
    let app = frozen_app();
    let done = create(&app, json!({ "title": "done", "category": "home" })).await;
    create(
        &app,
        json!({ "title": "soon", "priority": "low", "dueDate": "2025-06-01T18:00:00Z" }),
    )
    .await;
    create(&app, json!({ "title": "later", "priority": "high", "category": "home" })).await;
    let toggle = format!("/api/todos/{}/toggle", done["id"].as_str().unwrap());
    send(&app, empty("PATCH", &toggle)).await;

    let (_, json) = send(&app, get("/api/todos/completed/all")).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["title"], "done");

    let (_, json) = send(&app, get("/api/todos/pending/all")).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["data"][0]["title"], "later");

    let (_, json) = send(&app, get("/api/todos/urgent/all")).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["title"], "soon");

    let (_, json) = send(&app, get("/api/todos/category/home")).await;
    assert_eq!(json["count"], 2);

    let (_, json) = send(&app, get("/api/todos/priority/high")).await;
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn by_priority_rejects_unknown_values() {
    let (status, json) = send(&frozen_app(), get("/api/todos/priority/urgent")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn search_echoes_query_and_ranks() {
    let app = frozen_app();
    create(&app, json!({ "title": "write report for the quarterly review" })).await;
    create(&app, json!({ "title": "report" })).await;
    create(&app, json!({ "title": "buy milk" })).await;

    let (status, json) = send(&app, get("/api/todos/search/report")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "report");
    assert_eq!(json["count"], 2);
    assert_eq!(json["data"][0]["title"], "report");
    assert!(json["data"][0]["score"].as_f64().unwrap() > json["data"][1]["score"].as_f64().unwrap());

    let (_, json) = send(&app, get("/api/todos/search/report%20-quarterly")).await;
    assert_eq!(json["query"], "report -quarterly");
    assert_eq!(json["count"], 1);
}

// --- stats ---

#[tokio::test]
async fn stats_on_empty_store() {
    let (status, json) = send(&frozen_app(), get("/api/todos/stats/overview")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"],
        json!({
            "total": 0,
            "completed": 0,
            "pending": 0,
            "urgent": 0,
            "completionRate": 0,
            "priorityStats": [],
            "categoryStats": []
        })
    );
}

#[tokio::test]
async fn stats_counts_groups() {
    let app = frozen_app();
    let a = create(&app, json!({ "title": "a", "priority": "high", "category": "work" })).await;
    create(&app, json!({ "title": "b", "priority": "high" })).await;
    create(&app, json!({ "title": "c", "priority": "low", "category": "work" })).await;
    send(&app, empty("PATCH", &format!("/api/todos/{}/toggle", a["id"].as_str().unwrap()))).await;

    let (_, json) = send(&app, get("/api/todos/stats/overview")).await;
    let stats = &json["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["pending"], 2);
    assert_eq!(stats["completionRate"], 33);
    assert_eq!(
        stats["priorityStats"],
        json!([{ "_id": "high", "count": 2 }, { "_id": "low", "count": 1 }])
    );
    assert_eq!(
        stats["categoryStats"],
        json!([{ "_id": "work", "count": 2 }, { "_id": null, "count": 1 }])
    );
}
