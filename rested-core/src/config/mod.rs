mod loader;
pub mod secrets;

use std::net::SocketAddr;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::headers::{CorsMode, ResponseHeaders};

pub use secrets::{DefaultSecretResolver, SecretResolver};

/// Env var selecting the active profile.
pub const PROFILE_ENV: &str = "RESTED_PROFILE";

/// Prefix of env vars overlaid onto the configuration tree.
pub const ENV_PREFIX: &str = "RESTED__";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, message: String },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, message } => {
                write!(f, "Config type mismatch for '{key}': {message}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from YAML files, `.env` files, and environment variables.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml` (base)
/// 2. `application-{profile}.yaml` (profile override, deep-merged)
/// 3. `.env` / `.env.{profile}` (loaded into the process environment, never overwriting)
/// 4. `${...}` placeholders in string values
/// 5. `RESTED__*` environment variables (`RESTED__SERVER__ADDR` overrides `server.addr`)
///
/// Profile is determined by: `RESTED_PROFILE` env var > argument > default `"dev"`.
#[derive(Debug, Clone)]
pub struct RestedConfig {
    root: serde_yaml::Value,
    profile: String,
}

impl RestedConfig {
    /// Load configuration from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."), profile, &DefaultSecretResolver)
    }

    /// Load configuration from `dir` with a custom secret resolver.
    pub fn load_from_dir(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| {
            if profile.is_empty() {
                "dev".to_string()
            } else {
                profile.to_string()
            }
        });

        let mut root = loader::load_yaml_file(&dir.join("application.yaml"))?
            .unwrap_or_else(|| serde_yaml::Value::Mapping(Default::default()));
        if let Some(overlay) =
            loader::load_yaml_file(&dir.join(format!("application-{profile}.yaml")))?
        {
            loader::merge(&mut root, overlay);
        }

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{profile}")));

        loader::resolve_strings(&mut root, resolver)?;
        loader::overlay_env(&mut root, ENV_PREFIX, std::env::vars());

        tracing::debug!(%profile, "Configuration loaded");
        Ok(Self { root, profile })
    }

    /// Build a configuration from a YAML string (no files, no env overlay).
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut root = loader::load_yaml_str(content)?;
        loader::resolve_strings(&mut root, &DefaultSecretResolver)?;
        Ok(Self {
            root,
            profile: "dev".to_string(),
        })
    }

    /// An empty configuration; every typed section falls back to its default.
    pub fn empty() -> Self {
        Self {
            root: serde_yaml::Value::Mapping(Default::default()),
            profile: "dev".to_string(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn contains_key(&self, key: &str) -> bool {
        loader::lookup(&self.root, key).is_some_and(|v| !v.is_null())
    }

    /// Deserialize the value at a dot-separated key.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = loader::lookup(&self.root, key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        serde_yaml::from_value(value.clone()).map_err(|e| ConfigError::TypeMismatch {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Like [`get`](Self::get), but a missing key yields `None`.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The `server` section, defaulted when absent.
    pub fn server(&self) -> Result<ServerConfig, ConfigError> {
        Ok(self.get_opt("server")?.unwrap_or_default())
    }

    /// Response headers built from the `headers` and `cors` keys.
    pub fn response_headers(&self) -> Result<ResponseHeaders, ConfigError> {
        let pairs: Vec<(String, String)> = self.get_opt("headers")?.unwrap_or_default();
        let cors: CorsMode = self.get_opt("cors")?.unwrap_or_default();
        Ok(ResponseHeaders::new().cors(cors).headers(pairs))
    }
}

/// `server` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}
