//! Response header layer: static headers plus optional CORS headers.
//!
//! Every response leaving the router (including error responses and the
//! 404 fallback) passes through this layer.
//!
//! # CORS modes
//!
//! | Mode  | `Access-Control-Allow-Origin`     | Fixed CORS headers |
//! |-------|-----------------------------------|--------------------|
//! | `off` | none                              | no                 |
//! | `on`  | `*`                               | yes                |
//! | `dev` | request `Origin` + `Vary: Origin` | yes                |
//!
//! Static headers are written after the CORS headers and win on collision.
//!
//! # Usage
//!
//! ```ignore
//! let router = ResponseHeaders::new()
//!     .cors(CorsMode::Dev)
//!     .header("x-powered-by", "rested")
//!     .install(router);
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::http::{HeaderMap, HeaderName, HeaderValue, Next, Request, Response, Router, ORIGIN, VARY};

const CORS_HEADERS: [(&str, &str); 4] = [
    (
        "access-control-allow-methods",
        "OPTIONS,GET,HEAD,POST,PUT,PATCH,DELETE",
    ),
    ("access-control-allow-headers", "X-Requested-With,Content-Type"),
    ("access-control-allow-credentials", "true"),
    ("access-control-max-age", "86400"),
];

const ALLOW_ORIGIN: &str = "access-control-allow-origin";

/// How CORS headers are emitted.
///
/// Deserializes from `false`/`true`, or from the strings `"off"`, `"on"`, `"dev"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CorsRepr")]
pub enum CorsMode {
    #[default]
    Off,
    /// Wildcard origin.
    On,
    /// Echo the request origin.
    Dev,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorsRepr {
    Flag(bool),
    Mode(String),
}

impl TryFrom<CorsRepr> for CorsMode {
    type Error = String;

    fn try_from(repr: CorsRepr) -> Result<Self, Self::Error> {
        match repr {
            CorsRepr::Flag(false) => Ok(CorsMode::Off),
            CorsRepr::Flag(true) => Ok(CorsMode::On),
            CorsRepr::Mode(mode) => match mode.to_ascii_lowercase().as_str() {
                "off" | "false" => Ok(CorsMode::Off),
                "on" | "true" => Ok(CorsMode::On),
                "dev" => Ok(CorsMode::Dev),
                other => Err(format!("unknown cors mode '{other}'")),
            },
        }
    }
}

/// Static + CORS response headers.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
    cors: CorsMode,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a static header. Invalid names or values are skipped with a warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            _ => tracing::warn!(header = name, "Skipping invalid static header"),
        }
        self
    }

    /// Add every `(name, value)` pair as a static header.
    pub fn headers<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .fold(self, |acc, (k, v)| acc.header(k.as_ref(), v.as_ref()))
    }

    /// Set the CORS mode.
    pub fn cors(mut self, mode: CorsMode) -> Self {
        self.cors = mode;
        self
    }

    pub fn cors_mode(&self) -> CorsMode {
        self.cors
    }

    /// Returns the static headers.
    pub fn static_headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.headers
    }

    /// Write the configured headers into `response`, given the request's
    /// `Origin` (only consulted in [`CorsMode::Dev`]).
    pub fn apply(&self, origin: Option<&HeaderValue>, response: &mut HeaderMap) {
        if self.cors != CorsMode::Off {
            for (name, value) in CORS_HEADERS {
                response.insert(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                );
            }
            match self.cors {
                CorsMode::On => {
                    response.insert(HeaderName::from_static(ALLOW_ORIGIN), HeaderValue::from_static("*"));
                }
                CorsMode::Dev => {
                    if let Some(origin) = origin {
                        response.insert(HeaderName::from_static(ALLOW_ORIGIN), origin.clone());
                    }
                    response.insert(VARY, HeaderValue::from_static("Origin"));
                }
                CorsMode::Off => {}
            }
        }
        for (name, value) in &self.headers {
            response.insert(name.clone(), value.clone());
        }
    }

    /// Wrap `router` so that every response carries these headers.
    pub fn install<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let config = Arc::new(self);
        router.layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let config = config.clone();
                async move {
                    let origin = req.headers().get(ORIGIN).cloned();
                    let mut response: Response = next.run(req).await;
                    config.apply(origin.as_ref(), response.headers_mut());
                    response
                }
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_mode_only_writes_static_headers() {
        let headers = ResponseHeaders::new().header("x-custom-header", "bbb");
        let mut out = HeaderMap::new();
        headers.apply(None, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("x-custom-header").unwrap(), "bbb");
    }

    #[test]
    fn on_mode_uses_wildcard_origin() {
        let headers = ResponseHeaders::new().cors(CorsMode::On);
        let mut out = HeaderMap::new();
        headers.apply(Some(&HeaderValue::from_static("http://a.test")), &mut out);
        assert_eq!(out.get(ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(out.get("access-control-max-age").unwrap(), "86400");
        assert!(out.get(VARY).is_none());
    }

    #[test]
    fn dev_mode_echoes_origin() {
        let headers = ResponseHeaders::new().cors(CorsMode::Dev);
        let mut out = HeaderMap::new();
        headers.apply(Some(&HeaderValue::from_static("http://a.test")), &mut out);
        assert_eq!(out.get(ALLOW_ORIGIN).unwrap(), "http://a.test");
        assert_eq!(out.get(VARY).unwrap(), "Origin");
    }

    #[test]
    fn static_header_overrides_cors_header() {
        let headers = ResponseHeaders::new()
            .cors(CorsMode::On)
            .header("access-control-max-age", "60");
        let mut out = HeaderMap::new();
        headers.apply(None, &mut out);
        assert_eq!(out.get("access-control-max-age").unwrap(), "60");
    }

    #[test]
    fn invalid_header_is_skipped() {
        let headers = ResponseHeaders::new().header("bad header", "x").header("ok", "y");
        assert_eq!(headers.static_headers().len(), 1);
    }

    #[test]
    fn cors_mode_deserializes_from_bool_and_string() {
        let on: CorsMode = serde_json::from_value(serde_json::json!(true)).unwrap();
        let off: CorsMode = serde_json::from_value(serde_json::json!(false)).unwrap();
        let dev: CorsMode = serde_json::from_value(serde_json::json!("dev")).unwrap();
        assert_eq!(on, CorsMode::On);
        assert_eq!(off, CorsMode::Off);
        assert_eq!(dev, CorsMode::Dev);
        assert!(serde_json::from_value::<CorsMode>(serde_json::json!("sometimes")).is_err());
    }
}
