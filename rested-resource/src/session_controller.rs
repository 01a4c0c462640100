use std::sync::Arc;

use rested_core::http::{
    routing::any, Bytes, HeaderMap, IntoResponse, Method, Response, Router, State,
};
use rested_core::{HttpError, Reply};
use rested_data::{Database, Record};
use rested_security::{Passwords, Sessions};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::router::{not_found, parse_body};
use crate::shaper::{RecordShaper, StripFields};

/// Where accounts live and which fields carry the credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionControllerConfig {
    /// Table holding the accounts.
    pub table: String,
    #[serde(alias = "loginField")]
    pub login_field: String,
    /// Field holding the password hash on the account and the plaintext in
    /// the sign-in body.
    #[serde(alias = "passwordField")]
    pub password_field: String,
}

impl Default for SessionControllerConfig {
    fn default() -> Self {
        Self {
            table: "Users".to_string(),
            login_field: "username".to_string(),
            password_field: "password".to_string(),
        }
    }
}

/// Sign-in, session info and sign-out over an account table.
///
/// | Verb    | Operation  | Success |
/// |---------|------------|---------|
/// | POST    | `sign_in`  | 201 + account + credential headers |
/// | GET     | `info`     | 200 + session data |
/// | HEAD    | `empty`    | 204 |
/// | DELETE  | `sign_out` | 204 |
/// | OPTIONS | preflight  | 204 |
///
/// Accounts are shaped with [`StripFields`] on the password field unless
/// another shaper is installed.
pub struct SessionController {
    database: Database,
    sessions: Sessions,
    passwords: Passwords,
    shaper: Arc<dyn RecordShaper>,
    config: SessionControllerConfig,
}

impl SessionController {
    pub fn new(
        database: Database,
        sessions: Sessions,
        passwords: Passwords,
        config: SessionControllerConfig,
    ) -> Self {
        Self {
            shaper: Arc::new(StripFields::outbound([config.password_field.clone()])),
            database,
            sessions,
            passwords,
            config,
        }
    }

    pub fn with_shaper(mut self, shaper: impl RecordShaper) -> Self {
        self.shaper = Arc::new(shaper);
        self
    }

    pub fn config(&self) -> &SessionControllerConfig {
        &self.config
    }

    /// Verify the credentials in `body` and open a session for the account.
    pub async fn sign_in(&self, headers: &HeaderMap, body: Option<Record>) -> Result<Reply, HttpError> {
        let body = body.unwrap_or_default();
        let login = body
            .get(&self.config.login_field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| HttpError::Unauthorized("missing login".into()))?;
        let plain = body
            .get(&self.config.password_field)
            .and_then(Value::as_str)
            .ok_or_else(|| HttpError::Unauthorized("missing password".into()))?;

        let account = self
            .database
            .find_by_field(&self.config.table, &self.config.login_field, login)
            .await?
            .ok_or_else(|| HttpError::Unauthorized("unknown account".into()))?;
        let hash = account
            .get(&self.config.password_field)
            .and_then(Value::as_str)
            .ok_or_else(|| HttpError::Unauthorized("account has no password".into()))?;

        if !self.passwords.verify(plain, hash).await? {
            warn!(table = %self.config.table, "Rejected sign-in attempt");
            return Err(HttpError::Unauthorized("wrong password".into()));
        }

        let grant = self.sessions.create(headers, &account).await?;
        debug!(subject = ?grant.session.subject(), "Session opened");
        let shaped = Value::Object(self.shaper.outbound(account));
        Ok(Reply::created(shaped).with_headers(grant.headers))
    }

    /// The data of the current session.
    pub async fn info(&self, headers: &HeaderMap) -> Result<Reply, HttpError> {
        let session = self
            .sessions
            .load(headers)
            .await?
            .ok_or_else(|| HttpError::Unauthorized("no session".into()))?;
        Ok(Reply::ok(Value::Object(session.into_data())))
    }

    /// Liveness probe that still exercises the session backend.
    pub async fn empty(&self, headers: &HeaderMap) -> Result<Reply, HttpError> {
        self.sessions.load(headers).await?;
        Ok(Reply::no_content())
    }

    pub async fn sign_out(&self, headers: &HeaderMap) -> Result<Reply, HttpError> {
        let session = self
            .sessions
            .load(headers)
            .await?
            .ok_or_else(|| HttpError::Unauthorized("no session".into()))?;
        self.sessions.destroy(headers, &session).await?;
        debug!(subject = ?session.subject(), "Session closed");
        Ok(Reply::no_content())
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Routes serving a [`SessionController`] at `/`.
pub fn session_router(controller: Arc<SessionController>) -> Router {
    Router::new()
        .route("/", any(handle))
        .fallback(not_found)
        .with_state(controller)
}

async fn handle(
    State(controller): State<Arc<SessionController>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (name, result) = match method.as_str() {
        "POST" => {
            let result = match parse_body(&body) {
                Ok(body) => controller.sign_in(&headers, body).await,
                Err(err) => Err(err),
            };
            ("sign_in", result)
        }
        "GET" => ("info", controller.info(&headers).await),
        "HEAD" => ("empty", controller.empty(&headers).await),
        "DELETE" => ("sign_out", controller.sign_out(&headers).await),
        "OPTIONS" => ("preflight", Ok(Reply::no_content())),
        _ => return not_found().await,
    };
    match result {
        Ok(reply) => reply.into_response(),
        Err(err) => err.respond(name),
    }
}
