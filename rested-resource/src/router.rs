use std::sync::Arc;

use rested_core::http::{
    routing::any, Bytes, HeaderMap, IntoResponse, Method, Path, Response, Router, State, StatusCode,
};
use rested_core::HttpError;
use rested_data::{into_record, Record};
use serde_json::Value;
use tracing::debug;

use crate::controller::{ResourceController, ResourceRequest};
use crate::operation::Operation;

/// Routes serving one resource: `/` for the collection, `/{id}` for members.
///
/// Unknown verb/path combinations answer 404 with no body. Nest the result
/// under a prefix to serve several resources from one application:
///
/// ```ignore
/// let app = Router::new()
///     .nest("/tasks", resource_router(tasks))
///     .nest("/users", resource_router(users));
/// let app = config.response_headers()?.install(app);
/// ```
pub fn resource_router(controller: Arc<ResourceController>) -> Router {
    Router::new()
        .route("/", any(collection))
        .route("/{id}", any(member))
        .fallback(not_found)
        .with_state(controller)
}

async fn collection(
    State(controller): State<Arc<ResourceController>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle(&controller, method, headers, None, body).await
}

async fn member(
    State(controller): State<Arc<ResourceController>>,
    Path(id): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle(&controller, method, headers, Some(id), body).await
}

async fn handle(
    controller: &ResourceController,
    method: Method,
    headers: HeaderMap,
    id: Option<String>,
    body: Bytes,
) -> Response {
    let Some(operation) = Operation::resolve(&method, id.is_some()) else {
        return not_found().await;
    };
    debug!(operation = operation.name(), id = ?id, "Dispatching");

    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(err) => return err.respond(operation.name()),
    };
    let request = ResourceRequest { headers, id, body };
    match controller.dispatch(operation, request).await {
        Ok(reply) => reply.into_response(),
        Err(err) => err.respond(operation.name()),
    }
}

pub(crate) async fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

/// Parse a request body into a record. An empty body is no body; anything
/// else must be a JSON object.
pub(crate) fn parse_body(bytes: &Bytes) -> Result<Option<Record>, HttpError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| HttpError::BadRequest(e.to_string()))?;
    into_record(value)
        .map(Some)
        .ok_or_else(|| HttpError::BadRequest("body must be a JSON object".into()))
}
