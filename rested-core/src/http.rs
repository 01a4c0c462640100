//! Re-exports of the HTTP types Rested crates build on.
//!
//! Downstream crates import from here instead of depending on axum paths
//! directly, so the transport stays swappable in one place.

pub use axum::body::Body;
pub use axum::extract::{Path, Request, State};
pub use axum::http::header::{self, AUTHORIZATION, CONTENT_TYPE, ORIGIN, VARY};
pub use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
pub use axum::middleware::Next;
pub use axum::response::{IntoResponse, Response};
pub use axum::routing;
pub use axum::{serve, Json, Router};
pub use bytes::Bytes;
