/// Errors raised by session and password backends.
#[derive(Debug)]
pub enum SecurityError {
    /// Credentials were presented but rejected (bad password, unknown account).
    InvalidCredentials(String),

    /// A presented token could not be decoded.
    InvalidToken(String),

    /// The token has expired.
    TokenExpired,

    /// Hashing or verification could not run.
    Hashing(String),

    /// The session backend failed.
    Backend(String),
}

impl std::fmt::Display for SecurityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityError::InvalidCredentials(msg) => write!(f, "Invalid credentials: {msg}"),
            SecurityError::InvalidToken(msg) => write!(f, "Invalid token: {msg}"),
            SecurityError::TokenExpired => write!(f, "Token expired"),
            SecurityError::Hashing(msg) => write!(f, "Password hashing error: {msg}"),
            SecurityError::Backend(msg) => write!(f, "Session backend error: {msg}"),
        }
    }
}

impl std::error::Error for SecurityError {}

impl SecurityError {
    /// Whether the error means "the caller is not who they claim".
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SecurityError::InvalidCredentials(_)
                | SecurityError::InvalidToken(_)
                | SecurityError::TokenExpired
        )
    }
}

impl From<SecurityError> for rested_core::HttpError {
    fn from(err: SecurityError) -> Self {
        if err.is_rejection() {
            rested_core::HttpError::Unauthorized(err.to_string())
        } else {
            rested_core::HttpError::Internal(err.to_string())
        }
    }
}
