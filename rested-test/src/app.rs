use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, IntoHeaderName, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use rested_core::http::{Body, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

use crate::json_path::resolve_path;

/// In-process HTTP test client wrapping an Axum `Router`.
///
/// Uses `tower::ServiceExt::oneshot` to dispatch requests without binding
/// to a TCP port.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn head(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::HEAD, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }

    pub fn options(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::OPTIONS, path)
    }

    /// Start building a request with an arbitrary HTTP method.
    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Builder for constructing and sending a test HTTP request.
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl TestRequest<'_> {
    /// Add a Bearer token authorization header.
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION, format!("Bearer {token}"))
    }

    pub fn header(mut self, name: impl IntoHeaderName, value: impl AsRef<str>) -> Self {
        self.headers
            .insert(name, value.as_ref().parse().expect("invalid header value"));
        self
    }

    /// Set the request body as JSON. Also sets Content-Type to `application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = Some(serde_json::to_vec(body).expect("body must serialize"));
        self.header(CONTENT_TYPE, "application/json")
    }

    /// Set a raw request body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub async fn send(self) -> TestResponse {
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        let mut request = Request::builder()
            .method(self.method)
            .uri(&self.path)
            .body(body)
            .expect("invalid request");
        *request.headers_mut() = self.headers;

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();

        TestResponse { status, headers, body }
    }
}

/// Response wrapper with status assertions, JSON-path assertions, and body helpers.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    /// Assert 204 with an empty body.
    pub fn assert_no_content(self) -> Self {
        self.assert_status(StatusCode::NO_CONTENT).assert_empty()
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    /// Assert 401 with an empty body.
    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED).assert_empty()
    }

    /// Assert 404 with an empty body.
    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND).assert_empty()
    }

    /// Assert 409 with an empty body.
    pub fn assert_conflict(self) -> Self {
        self.assert_status(StatusCode::CONFLICT).assert_empty()
    }

    /// Assert 500 carrying the opaque `INTERNAL_ERROR` code.
    pub fn assert_internal_error(self) -> Self {
        self.assert_status(StatusCode::INTERNAL_SERVER_ERROR)
            .assert_json_path("code", rested_core::INTERNAL_ERROR_CODE)
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_empty(self) -> Self {
        assert!(self.body.is_empty(), "Expected empty body, got: {}", self.text());
        self
    }

    /// Assert that a JSON path resolves to the expected value.
    ///
    /// ```ignore
    /// resp.assert_json_path("[1].metadata.b[0]", 5)
    ///     .assert_json_path("len()", 2);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let actual = resolve_path(&root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    /// Assert that a JSON path is absent (resolves to `null`).
    pub fn assert_json_path_absent(self, path: &str) -> Self {
        self.assert_json_path(path, Value::Null)
    }

    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root: Value = self.json();
        let value = resolve_path(&root, path);
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            panic!("Failed to deserialize JSON path \"{path}\": {e}\n  Value: {value}\n  Body: {root}")
        })
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        let name: HeaderName = name.as_ref().parse().ok()?;
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON: {e}\nBody: {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn app() -> TestApp {
        let router = Router::new()
            .route("/", get(|| async { axum::Json(serde_json::json!({ "items": [1, 2, 3] })) }))
            .route(
                "/echo",
                axum::routing::post(|headers: axum::http::HeaderMap, body: String| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    axum::Json(serde_json::json!({ "auth": auth, "body": body }))
                }),
            );
        TestApp::new(router)
    }

    #[tokio::test]
    async fn json_path_assertions() {
        app()
            .get("/")
            .send()
            .await
            .assert_ok()
            .assert_json_path("items.len()", 3)
            .assert_json_path("items[2]", 3)
            .assert_json_path_absent("missing");
    }

    #[tokio::test]
    async fn sends_headers_and_body() {
        let resp = app()
            .post("/echo")
            .bearer("t0k")
            .json(&serde_json::json!({ "a": 1 }))
            .send()
            .await
            .assert_ok();
        assert_eq!(resp.json_path::<String>("auth"), "Bearer t0k");
        assert_eq!(resp.json_path::<String>("body"), "{\"a\":1}");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        app().get("/nope").send().await.assert_not_found();
    }
}
