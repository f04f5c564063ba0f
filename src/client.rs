//! Core API client and error types.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::TokenSource;
use crate::http::{add_extra_headers, build_http_client, with_bearer};
use crate::options::{ClientOptions, SecretString};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or(.body.as_str()))]
    Status {
        status: StatusCode,
        detail: Option<String>,
        body: String,
    },

    #[error("empty response body")]
    EmptyBody,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("must have access token")]
    Unauthenticated,
}

impl ClientError {
    /// Build a status error from a non-success response body.
    ///
    /// A JSON string body is the message itself. Otherwise the body's
    /// `detail` field becomes the human-readable message when present.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let detail = match serde_json::from_str::<Value>(&body) {
            Ok(Value::String(message)) => Some(message),
            Ok(value) => detail_of(&value),
            Err(_) => None,
        };
        ClientError::Status {
            status,
            detail,
            body,
        }
    }

    /// The user-facing failure message for this error.
    pub fn message(&self) -> String {
        match self {
            ClientError::Status {
                status,
                detail,
                body,
            } => match (detail, body.trim()) {
                (Some(detail), _) => detail.clone(),
                (None, "") => status.to_string(),
                (None, body) => body.to_string(),
            },
            other => other.to_string(),
        }
    }
}

/// Pull the `detail` field out of an error body.
///
/// FastAPI reports validation failures with a list of objects under
/// `detail`, so anything that is not a plain string is re-serialized.
fn detail_of(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

/// Check the response status, turning anything above 2xx into a `ClientError::Status`.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.as_u16() > 299 {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::from_status(status, body));
    }
    Ok(response)
}

/// Shared HTTP client for the document-QA API.
///
/// Holds one pooled `reqwest::Client`, the API base URL and the source of
/// bearer tokens. Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    options: ClientOptions,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from options and a token source.
    pub fn new(options: ClientOptions, tokens: Arc<dyn TokenSource>) -> Result<Self, ClientError> {
        if options.base_url.trim().is_empty() {
            return Err(ClientError::Config("API endpoint is required".to_string()));
        }
        let http = build_http_client(&options)?;
        Ok(Self {
            http,
            options,
            tokens,
        })
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The options this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Current bearer token, if the token source has one.
    pub fn token(&self) -> Option<SecretString> {
        self.tokens.bearer()
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.options.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Start a request with the standard headers and the current bearer token.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, self.url(path))
            .header(ACCEPT, "application/json");
        if let Some(timeout) = self.options.timeout {
            req = req.timeout(timeout);
        }
        req = add_extra_headers(req, &self.options.extra_headers);
        if let Some(token) = self.token() {
            req = with_bearer(req, &token);
        }
        req
    }

    /// Send a request and decode a JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let response = ensure_success(req.send().await?).await?;
        let body = response.text().await?;
        // Endpoints that return nothing still decode into `Value::Null` / `()`
        let body = if body.trim().is_empty() { "null" } else { &body };
        Ok(serde_json::from_str(body)?)
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(self.request(reqwest::Method::GET, path)).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .request(reqwest::Method::POST, path)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send_json(req).await
    }

    /// DELETE a resource, returning whatever JSON the server answers with.
    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send_json(self.request(reqwest::Method::DELETE, path)).await
    }
}
