use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::SecurityError;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Password capability: secret hashing and verification.
pub trait PasswordAdapter: Send + Sync + 'static {
    /// Hash a plaintext secret into a storable string.
    fn hash(&self, plain: &str) -> impl Future<Output = Result<String, SecurityError>> + Send;

    /// Check a plaintext secret against a stored hash.
    fn verify(
        &self,
        plain: &str,
        hash: &str,
    ) -> impl Future<Output = Result<bool, SecurityError>> + Send;
}

/// Object-safe wrapper for `PasswordAdapter`.
#[doc(hidden)]
pub trait ErasedPassword: Send + Sync {
    fn hash<'a>(&'a self, plain: &'a str) -> BoxFuture<'a, Result<String, SecurityError>>;
    fn verify<'a>(&'a self, plain: &'a str, hash: &'a str) -> BoxFuture<'a, Result<bool, SecurityError>>;
}

impl<T: PasswordAdapter> ErasedPassword for T {
    fn hash<'a>(&'a self, plain: &'a str) -> BoxFuture<'a, Result<String, SecurityError>> {
        Box::pin(PasswordAdapter::hash(self, plain))
    }

    fn verify<'a>(&'a self, plain: &'a str, hash: &'a str) -> BoxFuture<'a, Result<bool, SecurityError>> {
        Box::pin(PasswordAdapter::verify(self, plain, hash))
    }
}

/// Shared, type-erased handle to a password backend.
#[derive(Clone)]
pub struct Passwords {
    inner: Arc<dyn ErasedPassword>,
}

impl Passwords {
    pub fn new(adapter: impl PasswordAdapter) -> Self {
        Self {
            inner: Arc::new(adapter),
        }
    }

    pub async fn hash(&self, plain: &str) -> Result<String, SecurityError> {
        self.inner.hash(plain).await
    }

    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, SecurityError> {
        self.inner.verify(plain, hash).await
    }
}

impl std::fmt::Debug for Passwords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passwords").finish_non_exhaustive()
    }
}

/// Argon2id password hashing with random salts, stored as PHC strings.
///
/// Both operations run in a blocking task to avoid stalling the async runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Password;

impl Argon2Password {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordAdapter for Argon2Password {
    fn hash(&self, plain: &str) -> impl Future<Output = Result<String, SecurityError>> + Send {
        let plain = plain.to_string();
        async move {
            tokio::task::spawn_blocking(move || {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(plain.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| SecurityError::Hashing(e.to_string()))
            })
            .await
            .map_err(|e| SecurityError::Hashing(format!("hashing task failed: {e}")))?
        }
    }

    fn verify(
        &self,
        plain: &str,
        hash: &str,
    ) -> impl Future<Output = Result<bool, SecurityError>> + Send {
        let plain = plain.to_string();
        let hash = hash.to_string();
        async move {
            tokio::task::spawn_blocking(move || {
                let Ok(parsed) = PasswordHash::new(&hash) else {
                    tracing::warn!("Stored password hash is not a valid PHC string");
                    return false;
                };
                Argon2::default()
                    .verify_password(plain.as_bytes(), &parsed)
                    .is_ok()
            })
            .await
            .map_err(|e| SecurityError::Hashing(format!("verification task failed: {e}")))
        }
    }
}
