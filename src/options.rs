//! Client configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

/// Environment variable holding the API base URL.
pub const ENV_API_ENDPOINT: &str = "DOCLINE_API_ENDPOINT";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "DOCLINE_TIMEOUT_SECS";
/// Environment variable holding an HTTP proxy URL.
pub const ENV_PROXY: &str = "DOCLINE_PROXY";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// A secret string type for sensitive data like bearer tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Options for talking to the document-QA API.
///
/// # Example
/// ```rust
/// use docline::options::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new("http://127.0.0.1:8081")
///     .with_timeout(Duration::from_secs(30))
///     .with_header("x-client".to_string(), "docline".to_string());
/// assert_eq!(options.base_url, "http://127.0.0.1:8081");
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL for API endpoints
    pub base_url: String,

    /// Timeout for regular JSON requests. Streaming requests are not bounded by it.
    pub timeout: Option<Duration>,

    /// Timeout for the health probe
    pub health_timeout: Duration,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ClientOptions {
    /// Create options for the given API base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Some(DEFAULT_TIMEOUT),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            proxy: None,
            extra_headers: None,
        }
    }

    /// Read options from the environment.
    ///
    /// - `DOCLINE_API_ENDPOINT` (required) for the API base URL
    /// - `DOCLINE_TIMEOUT_SECS` to override the 10 second request timeout
    /// - `DOCLINE_PROXY` for an HTTP proxy
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let base_url = lookup(ENV_API_ENDPOINT)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Config(format!("{ENV_API_ENDPOINT} is not set")))?;

        let mut options = Self::new(base_url);

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {secs:?}")))?;
            options.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(proxy) = lookup(ENV_PROXY) {
            options.proxy = Some(proxy);
        }

        Ok(options)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the request timeout.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Set the health probe timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_secret_string_is_redacted() {
        let secret = SecretString::from("id-token");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.expose_secret(), "id-token");
    }

    #[test]
    fn test_defaults() {
        let options = ClientOptions::new("http://localhost:8081");
        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.health_timeout, Duration::from_secs(5));
        assert!(options.proxy.is_none());
    }

    #[test]
    fn test_from_env() {
        let options = ClientOptions::from_lookup(env(&[
            (ENV_API_ENDPOINT, "http://api.example.com"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_PROXY, "http://proxy:8080"),
        ]))
        .unwrap();
        assert_eq!(options.base_url, "http://api.example.com");
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.proxy.as_deref(), Some("http://proxy:8080"));
    }

    #[test]
    fn test_from_env_requires_endpoint() {
        let err = ClientOptions::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        let err = ClientOptions::from_lookup(env(&[
            (ENV_API_ENDPOINT, "http://api.example.com"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
    }
}
