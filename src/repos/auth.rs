//! Server-side auth endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiClient, ClientError};
use crate::options::SecretString;

#[derive(Serialize)]
struct SetInternalToken<'a> {
    token: &'a str,
}

/// Client for `/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthRepo {
    client: ApiClient,
}

impl AuthRepo {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Register an internal access token for the signed-in user.
    pub async fn set_internal_token(&self, token: &SecretString) -> Result<Value, ClientError> {
        let body = SetInternalToken {
            token: token.expose_secret(),
        };
        self.client.post_json("/auth/set_internal_token", &body).await
    }
}
