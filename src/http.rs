//! HTTP client utilities.
//!
//! Reusable client construction and request decoration shared by the
//! repositories and the stream reader.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::options::{ClientOptions, SecretString};

/// Build a configured HTTP client from client options.
///
/// The configured timeout only bounds connection setup here. Whole-request
/// timeouts are applied per request so event streams can stay open.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&options)?;
/// ```
pub fn build_http_client(options: &ClientOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.connect_timeout(timeout);
    }

    if let Some(proxy_url) = &options.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Add extra headers to a request if specified in the options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Attach `Authorization: Bearer <token>`.
pub fn with_bearer(request: RequestBuilder, token: &SecretString) -> RequestBuilder {
    request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_http_client() {
        let options = ClientOptions::new("http://localhost").with_timeout(Duration::from_secs(30));
        assert!(build_http_client(&options).is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let options = ClientOptions::new("http://localhost")
            .with_proxy("http://proxy.example.com:8080".to_string());
        assert!(build_http_client(&options).is_ok());
    }

    #[test]
    fn test_bearer_and_extra_headers() {
        let client = Client::new();
        let mut headers = HashMap::new();
        headers.insert("x-client".to_string(), "docline".to_string());

        let req = client.get("http://localhost/usage/last_10");
        let req = add_extra_headers(req, &Some(headers));
        let req = with_bearer(req, &SecretString::from("tok"))
            .build()
            .unwrap();

        assert_eq!(req.headers()[AUTHORIZATION], "Bearer tok");
        assert_eq!(req.headers()["x-client"], "docline");
    }
}
