use super::ConfigError;

/// Trait for secret resolution backends.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Default resolver: env vars and file references.
///
/// Supports the following reference formats:
/// - `${VAR_NAME}`: resolves from environment variable
/// - `${VAR_NAME:fallback}`: environment variable with a fallback value
/// - `${env:VAR_NAME}`: explicit env var resolution
/// - `${file:/path/to/secret}`: reads from file (trimmed)
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        if let Some(path) = reference.strip_prefix("file:") {
            return std::fs::read_to_string(path.trim())
                .map(|s| s.trim().to_string())
                .map_err(|e| ConfigError::Load(format!("Secret file '{}': {}", path.trim(), e)));
        }
        let var = reference.strip_prefix("env:").unwrap_or(reference);
        let (name, fallback) = match var.split_once(':') {
            Some((name, fallback)) => (name.trim(), Some(fallback)),
            None => (var.trim(), None),
        };
        match (std::env::var(name), fallback) {
            (Ok(value), _) => Ok(value),
            (Err(_), Some(fallback)) => Ok(fallback.to_string()),
            (Err(_), None) => Err(ConfigError::NotFound(name.to_string())),
        }
    }
}

/// Resolve `${...}` placeholders in a string value.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let end = rest[start..]
            .find('}')
            .ok_or_else(|| ConfigError::Load(format!("Unclosed placeholder in: {value}")))?;
        result.push_str(&rest[..start]);
        result.push_str(&resolver.resolve(&rest[start + 2..start + end])?);
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_env_var_resolution() {
        unsafe { std::env::set_var("TEST_RESTED_DB_URL", "memory://tasks") };
        let result = resolve_placeholders("${TEST_RESTED_DB_URL}", &DefaultSecretResolver).unwrap();
        assert_eq!(result, "memory://tasks");
        unsafe { std::env::remove_var("TEST_RESTED_DB_URL") };
    }

    #[test]
    #[serial_test::serial]
    fn test_explicit_env_and_surrounding_text() {
        unsafe { std::env::set_var("TEST_RESTED_HOST", "localhost") };
        let result =
            resolve_placeholders("http://${env:TEST_RESTED_HOST}:8080/api", &DefaultSecretResolver)
                .unwrap();
        assert_eq!(result, "http://localhost:8080/api");
        unsafe { std::env::remove_var("TEST_RESTED_HOST") };
    }

    #[test]
    fn test_fallback_value() {
        let result =
            resolve_placeholders("${TEST_RESTED_SURELY_UNSET:abc}", &DefaultSecretResolver).unwrap();
        assert_eq!(result, "abc");
    }

    #[test]
    fn test_missing_var_is_not_found() {
        let err = resolve_placeholders("${TEST_RESTED_SURELY_UNSET}", &DefaultSecretResolver)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_unclosed_placeholder() {
        let err = resolve_placeholders("${OOPS", &DefaultSecretResolver).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_file_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.txt");
        std::fs::write(&path, "  s3cret\n").unwrap();
        let reference = format!("${{file:{}}}", path.display());
        let result = resolve_placeholders(&reference, &DefaultSecretResolver).unwrap();
        assert_eq!(result, "s3cret");
    }
}
