mod common;

use std::sync::Arc;

use common::CountingDatabase;
use rested_core::http::Router;
use rested_core::{CorsMode, ResponseHeaders, RestedConfig};
use rested_data::Database;
use rested_resource::{resource_router, ResourceConfig, ResourceController};
use rested_security::{Sessions, TokenSession};
use rested_test::TestApp;
use serde_json::json;

fn app(db: CountingDatabase, headers: ResponseHeaders) -> TestApp {
    let controller = ResourceController::new(Database::new(db), ResourceConfig::new("Tasks"));
    TestApp::new(headers.install(resource_router(Arc::new(controller))))
}

#[tokio::test]
async fn unserved_combinations_are_empty_not_found() {
    let db = CountingDatabase::new();
    let app = app(db.clone(), ResponseHeaders::new());

    app.put("/").json(&json!({})).send().await.assert_not_found();
    app.patch("/").json(&json!({})).send().await.assert_not_found();
    app.delete("/").send().await.assert_not_found();
    app.post("/some-id").json(&json!({})).send().await.assert_not_found();
    app.head("/").send().await.assert_not_found();
    app.get("/a/b").send().await.assert_not_found();
    assert_eq!(db.calls(), 0);
}

#[tokio::test]
async fn preflight_is_no_content_on_both_shapes() {
    let db = CountingDatabase::new();
    let app = app(db.clone(), ResponseHeaders::new());
    app.options("/").send().await.assert_no_content();
    app.options("/some-id").send().await.assert_no_content();
    assert_eq!(db.calls(), 0);
}

#[tokio::test]
async fn malformed_body_is_bad_request_before_database() {
    let db = CountingDatabase::new();
    let app = app(db.clone(), ResponseHeaders::new());

    app.post("/")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .assert_bad_request();
    app.post("/").json(&json!([1, 2])).send().await.assert_bad_request();
    app.patch("/some-id").json(&json!("text")).send().await.assert_bad_request();
    assert_eq!(db.calls(), 0);
}

#[tokio::test]
async fn static_headers_reach_every_response() {
    let headers = ResponseHeaders::new().header("x-custom-header", "bbb");
    let app = app(CountingDatabase::new(), headers);

    let created = app.post("/").json(&json!({ "a": 1 })).send().await.assert_created();
    assert_eq!(created.header("x-custom-header"), Some("bbb"));
    let missing = app.get("/missing").send().await.assert_not_found();
    assert_eq!(missing.header("x-custom-header"), Some("bbb"));
    let fallback = app.get("/a/b").send().await.assert_not_found();
    assert_eq!(fallback.header("x-custom-header"), Some("bbb"));
}

#[tokio::test]
async fn unauthorized_responses_carry_cors_headers() {
    let controller = ResourceController::new(Database::new(CountingDatabase::new()), ResourceConfig::new("Tasks"))
        .with_sessions(Sessions::new(TokenSession::new("abc").unwrap()));
    let router = ResponseHeaders::new()
        .cors(CorsMode::On)
        .install(resource_router(Arc::new(controller)));
    let app = TestApp::new(router);

    let resp = app.get("/").send().await.assert_unauthorized();
    assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        resp.header("access-control-allow-methods"),
        Some("OPTIONS,GET,HEAD,POST,PUT,PATCH,DELETE")
    );
}

#[tokio::test]
async fn dev_cors_echoes_origin() {
    let app = app(CountingDatabase::new(), ResponseHeaders::new().cors(CorsMode::Dev));
    let resp = app
        .options("/")
        .header("origin", "http://localhost:8080")
        .send()
        .await
        .assert_no_content();
    assert_eq!(resp.header("access-control-allow-origin"), Some("http://localhost:8080"));
    assert_eq!(resp.header("vary"), Some("Origin"));
    assert_eq!(resp.header("access-control-allow-headers"), Some("X-Requested-With,Content-Type"));
    assert_eq!(resp.header("access-control-allow-credentials"), Some("true"));
    assert_eq!(resp.header("access-control-max-age"), Some("86400"));
}

#[tokio::test]
async fn resources_nest_side_by_side() {
    let tasks = ResourceController::new(Database::new(CountingDatabase::new()), ResourceConfig::new("Tasks"));
    let notes = ResourceController::new(Database::new(CountingDatabase::new()), ResourceConfig::new("Notes"));
    let router = Router::new()
        .nest("/tasks", resource_router(Arc::new(tasks)))
        .nest("/notes", resource_router(Arc::new(notes)));
    let app = TestApp::new(router);

    let created: serde_json::Value = app
        .post("/tasks")
        .json(&json!({ "a": 1 }))
        .send()
        .await
        .assert_created()
        .json();
    let id = created["id"].as_str().unwrap();
    app.get(&format!("/tasks/{id}")).send().await.assert_ok();
    app.get(&format!("/notes/{id}")).send().await.assert_not_found();
    app.get("/notes").send().await.assert_ok().assert_json_path("len()", 0);
}

#[tokio::test]
async fn resource_configs_load_from_yaml() {
    let config = RestedConfig::from_yaml(
        r#"
resources:
  - table: Users
    timestamps: { created: createdAt, updated: updatedAt }
    unique: [username]
    updateOnConflict: true
  - table: Tasks
"#,
    )
    .unwrap();
    let resources: Vec<ResourceConfig> = config.get("resources").unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(
        resources[0],
        ResourceConfig::new("Users")
            .timestamps("createdAt", "updatedAt")
            .unique(["username"])
            .update_on_conflict(true)
    );
    assert_eq!(resources[1], ResourceConfig::new("Tasks"));
}
