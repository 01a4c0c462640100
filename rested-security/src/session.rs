use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rested_core::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SecurityError;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Authorization context established for one request.
///
/// Holds the account fields the session backend chose to expose.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    data: Map<String, Value>,
}

impl Session {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// The account identifier, when exposed as `id`.
    pub fn subject(&self) -> Option<&str> {
        self.data.get("id").and_then(Value::as_str)
    }
}

/// Result of attaching a new identity: the session plus the headers that
/// carry its credential back to the caller (e.g. `x-token`).
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub session: Session,
    pub headers: HeaderMap,
}

/// Session capability consumed by controllers.
///
/// `load` must never fail because of a missing or invalid credential:
/// returning `Ok(None)` is the "not authorized" signal. Errors are reserved
/// for backend failures.
pub trait SessionAdapter: Send + Sync + 'static {
    /// Establish the authorization context of a request, if any.
    fn load(
        &self,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Option<Session>, SecurityError>> + Send;

    /// Attach an identity derived from `account` and emit its credential.
    fn create(
        &self,
        headers: &HeaderMap,
        account: &Map<String, Value>,
    ) -> impl Future<Output = Result<SessionGrant, SecurityError>> + Send;

    /// Clear the authorization context.
    fn destroy(
        &self,
        headers: &HeaderMap,
        session: &Session,
    ) -> impl Future<Output = Result<(), SecurityError>> + Send;
}

/// Object-safe wrapper for `SessionAdapter`.
#[doc(hidden)]
pub trait ErasedSession: Send + Sync {
    fn load<'a>(&'a self, headers: &'a HeaderMap) -> BoxFuture<'a, Result<Option<Session>, SecurityError>>;
    fn create<'a>(
        &'a self,
        headers: &'a HeaderMap,
        account: &'a Map<String, Value>,
    ) -> BoxFuture<'a, Result<SessionGrant, SecurityError>>;
    fn destroy<'a>(
        &'a self,
        headers: &'a HeaderMap,
        session: &'a Session,
    ) -> BoxFuture<'a, Result<(), SecurityError>>;
}

impl<T: SessionAdapter> ErasedSession for T {
    fn load<'a>(&'a self, headers: &'a HeaderMap) -> BoxFuture<'a, Result<Option<Session>, SecurityError>> {
        Box::pin(SessionAdapter::load(self, headers))
    }

    fn create<'a>(
        &'a self,
        headers: &'a HeaderMap,
        account: &'a Map<String, Value>,
    ) -> BoxFuture<'a, Result<SessionGrant, SecurityError>> {
        Box::pin(SessionAdapter::create(self, headers, account))
    }

    fn destroy<'a>(
        &'a self,
        headers: &'a HeaderMap,
        session: &'a Session,
    ) -> BoxFuture<'a, Result<(), SecurityError>> {
        Box::pin(SessionAdapter::destroy(self, headers, session))
    }
}

/// Shared, type-erased handle to a session backend.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<dyn ErasedSession>,
}

impl Sessions {
    pub fn new(adapter: impl SessionAdapter) -> Self {
        Self {
            inner: Arc::new(adapter),
        }
    }

    pub async fn load(&self, headers: &HeaderMap) -> Result<Option<Session>, SecurityError> {
        self.inner.load(headers).await
    }

    pub async fn create(
        &self,
        headers: &HeaderMap,
        account: &Map<String, Value>,
    ) -> Result<SessionGrant, SecurityError> {
        self.inner.create(headers, account).await
    }

    pub async fn destroy(&self, headers: &HeaderMap, session: &Session) -> Result<(), SecurityError> {
        self.inner.destroy(headers, session).await
    }
}

impl std::fmt::Debug for Sessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sessions").finish_non_exhaustive()
    }
}
