use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use rested_core::{CorsMode, HttpError, ResponseHeaders};
use tower::ServiceExt;

fn router(headers: ResponseHeaders) -> Router {
    let router = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/fail",
            get(|| async { Err::<&'static str, _>(HttpError::Internal("x".into())) }),
        );
    headers.install(router)
}

#[tokio::test]
async fn static_headers_on_success() {
    let app = router(ResponseHeaders::new().header("x-custom-header", "bbb"));
    let resp = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-custom-header").unwrap(), "bbb");
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn headers_on_errors_and_fallback() {
    let app = router(ResponseHeaders::new().cors(CorsMode::On));
    let resp = app
        .clone()
        .oneshot(Request::get("/fail").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");

    let resp = app
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get("access-control-allow-methods").unwrap(),
        "OPTIONS,GET,HEAD,POST,PUT,PATCH,DELETE"
    );
}

#[tokio::test]
async fn dev_cors_echoes_request_origin() {
    let app = router(ResponseHeaders::new().cors(CorsMode::Dev));
    let resp = app
        .oneshot(
            Request::get("/")
                .header("origin", "http://localhost:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:8080"
    );
    assert_eq!(resp.headers().get("vary").unwrap(), "Origin");
    assert_eq!(resp.headers().get("access-control-allow-credentials").unwrap(), "true");
}
