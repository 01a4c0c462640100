use crate::http::{HeaderMap, HeaderName, HeaderValue, IntoResponse, Json, Response, StatusCode};

/// The single terminal response produced by an operation.
///
/// A `Reply` is plain data until the transport turns it into a [`Response`],
/// which keeps operations testable without going through a router.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl Reply {
    /// A reply with a JSON body.
    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    /// 200 with a JSON body.
    pub fn ok(body: serde_json::Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// 201 with a JSON body.
    pub fn created(body: serde_json::Value) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    /// 204 without a body.
    pub fn no_content() -> Self {
        Self::empty(StatusCode::NO_CONTENT)
    }

    /// Any status without a body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a response header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a set of headers into the reply, replacing existing names.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<serde_json::Value> {
        self.body
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        response.headers_mut().extend(self.headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_headers_replaces_existing_names() {
        let mut extra = HeaderMap::new();
        extra.insert("x-token", HeaderValue::from_static("second"));
        let reply = Reply::no_content()
            .with_header(HeaderName::from_static("x-token"), HeaderValue::from_static("first"))
            .with_headers(extra);
        assert_eq!(reply.headers().get("x-token").unwrap(), "second");
        assert_eq!(reply.headers().len(), 1);
    }

    #[test]
    fn empty_reply_has_no_body() {
        let reply = Reply::empty(StatusCode::ACCEPTED);
        assert_eq!(reply.status(), StatusCode::ACCEPTED);
        assert!(reply.body().is_none());
    }
}
