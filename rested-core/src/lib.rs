pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod layers;
pub mod reply;

pub use config::{ConfigError, DefaultSecretResolver, RestedConfig, SecretResolver, ServerConfig};
pub use error::{HttpError, INTERNAL_ERROR_CODE};
pub use headers::{CorsMode, ResponseHeaders};
pub use layers::{init_tracing, init_tracing_json};
pub use reply::Reply;

pub mod prelude {
    //! Re-exports of the most commonly used core types.
    pub use crate::http::{HeaderMap, IntoResponse, Json, Router, StatusCode};
    pub use crate::{CorsMode, HttpError, Reply, ResponseHeaders, RestedConfig};
}
