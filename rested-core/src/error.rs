use crate::http::{IntoResponse, Json, Response, StatusCode};

/// Body sent with every 500 response. Error details are logged, never exposed.
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

/// Error translation boundary between operations and the HTTP response.
///
/// The string payloads are diagnostic context for logs. Only the status code
/// (and, for `Internal`, the fixed `{"code":"INTERNAL_ERROR"}` body) reaches
/// the client.
pub enum HttpError {
    /// No authorization context could be established for the request.
    Unauthorized(String),
    /// The targeted identifier does not exist.
    NotFound(String),
    /// A unique field collides with an existing record.
    Conflict(String),
    /// The request body could not be understood.
    BadRequest(String),
    /// Anything else: capability failures, unexpected states.
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The status-level code name of this error (`"NOT_FOUND"`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            HttpError::Unauthorized(_) => "UNAUTHORIZED",
            HttpError::NotFound(_) => "NOT_FOUND",
            HttpError::Conflict(_) => "CONFLICT",
            HttpError::BadRequest(_) => "BAD_REQUEST",
            HttpError::Internal(_) => INTERNAL_ERROR_CODE,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, HttpError::Internal(_))
    }

    /// Convert into a response, logging unexpected failures with the name of
    /// the operation they originated from.
    pub fn respond(self, source: &str) -> Response {
        match &self {
            HttpError::Internal(msg) => {
                tracing::error!(operation = source, error = %msg, "Operation failed");
            }
            other => {
                tracing::debug!(operation = source, code = other.code(), "Operation rejected");
            }
        }
        self.into_response()
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::Internal(_) => {
                let body = serde_json::json!({ "code": INTERNAL_ERROR_CODE });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            other => other.status().into_response(),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            HttpError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            HttpError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            HttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for HttpError {}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Internal(err.to_string())
    }
}
