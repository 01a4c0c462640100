use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rested_core::http::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SecurityError;
use crate::session::{Session, SessionAdapter, SessionGrant};

/// `session` configuration section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenSessionConfig {
    /// HMAC secret used to sign tokens.
    pub secret: String,
    /// Account fields copied into the session.
    pub expose: Vec<String>,
    /// Token lifetime in seconds.
    pub ttl_secs: u64,
    /// Response header carrying freshly issued tokens.
    pub header: String,
}

impl Default for TokenSessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expose: vec!["id".to_string()],
            ttl_secs: 3600,
            header: "x-token".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    data: Map<String, Value>,
    iat: u64,
    exp: u64,
}

/// Stateless session backend built on HS256 JWTs.
///
/// Tokens are read from the `Authorization` header, with or without a
/// `Bearer ` prefix. Missing, malformed, expired, or foreign tokens simply
/// leave the request without a session.
pub struct TokenSession {
    config: TokenSessionConfig,
    header: HeaderName,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenSession {
    /// Create a token session signing with `secret`, exposing only `id`.
    pub fn new(secret: impl Into<String>) -> Result<Self, SecurityError> {
        Self::from_config(TokenSessionConfig {
            secret: secret.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: TokenSessionConfig) -> Result<Self, SecurityError> {
        if config.secret.is_empty() {
            return Err(SecurityError::Backend("session secret must not be empty".into()));
        }
        let header = HeaderName::from_bytes(config.header.as_bytes())
            .map_err(|e| SecurityError::Backend(format!("invalid token header name: {e}")))?;
        Ok(Self {
            header,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        })
    }

    /// Set the account fields exposed in the session.
    pub fn expose<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.expose = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the token lifetime in seconds.
    pub fn ttl(mut self, secs: u64) -> Self {
        self.config.ttl_secs = secs;
        self
    }

    pub fn config(&self) -> &TokenSessionConfig {
        &self.config
    }

    /// Sign a token carrying `data`.
    pub fn issue(&self, data: Map<String, Value>) -> Result<String, SecurityError> {
        let now = unix_now()?;
        let claims = TokenClaims {
            data,
            iat: now,
            exp: now.saturating_add(self.config.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SecurityError::Backend(format!("failed to sign token: {e}")))
    }

    /// Decode and validate a token, returning its session data.
    pub fn verify(&self, token: &str) -> Result<Map<String, Value>, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;
        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.data)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
                _ => SecurityError::InvalidToken(e.to_string()),
            })
    }

    fn exposed_fields(&self, account: &Map<String, Value>) -> Map<String, Value> {
        self.config
            .expose
            .iter()
            .map(|field| {
                let value = account.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect()
    }
}

fn unix_now() -> Result<u64, SecurityError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SecurityError::Backend(format!("system clock error: {e}")))
}

/// Extract the raw token from the `Authorization` header.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

impl SessionAdapter for TokenSession {
    fn load(
        &self,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Option<Session>, SecurityError>> + Send {
        let session = extract_token(headers).and_then(|token| match self.verify(token) {
            Ok(data) => Some(Session::new(data)),
            Err(err) => {
                // ignored as bad token
                debug!(error = %err, "Rejected session token");
                None
            }
        });
        async move { Ok(session) }
    }

    fn create(
        &self,
        _headers: &HeaderMap,
        account: &Map<String, Value>,
    ) -> impl Future<Output = Result<SessionGrant, SecurityError>> + Send {
        let data = self.exposed_fields(account);
        let result = self.issue(data.clone()).and_then(|token| {
            let value = HeaderValue::from_str(&token)
                .map_err(|e| SecurityError::Backend(format!("token is not a valid header value: {e}")))?;
            let mut headers = HeaderMap::new();
            headers.insert(self.header.clone(), value);
            Ok(SessionGrant {
                session: Session::new(data),
                headers,
            })
        });
        async move { result }
    }

    fn destroy(
        &self,
        _headers: &HeaderMap,
        _session: &Session,
    ) -> impl Future<Output = Result<(), SecurityError>> + Send {
        // Nothing to do
        async { Ok(()) }
    }
}
