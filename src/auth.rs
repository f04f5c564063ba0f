//! Identity provider seam and bearer-token sources.
//!
//! The messaging platform's SDK is not part of this crate. It is plugged in
//! through [`IdentityProvider`]; [`Session`] layers the ID-token expiry policy
//! on top and hands tokens to the API client via [`TokenSource`].

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::ClientError;
use crate::model::LineProfile;
use crate::options::SecretString;

/// Claims of a decoded ID token that the session cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdTokenClaims {
    /// Expiry, seconds since the Unix epoch
    pub exp: Option<i64>,
}

impl IdTokenClaims {
    /// A token without an expiry counts as expired.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        match self.exp {
            Some(exp) => exp < now_secs,
            None => true,
        }
    }
}

/// Operations the identity-provider SDK must offer.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Initialise the SDK. Called once before anything else.
    async fn init(&self) -> Result<(), ClientError>;

    fn is_logged_in(&self) -> bool;

    async fn profile(&self) -> Result<LineProfile, ClientError>;

    /// Claims of the current ID token, if there is one.
    fn decoded_id_token(&self) -> Option<IdTokenClaims>;

    /// The raw, encoded ID token.
    fn raw_id_token(&self) -> Option<String>;

    /// Start a login, typically redirecting back to the current page.
    fn login(&self);

    fn logout(&self);
}

/// Anything that can supply a bearer token for API calls.
pub trait TokenSource: Send + Sync {
    fn bearer(&self) -> Option<SecretString>;
}

/// Token source for unauthenticated calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn bearer(&self) -> Option<SecretString> {
        None
    }
}

impl TokenSource for SecretString {
    fn bearer(&self) -> Option<SecretString> {
        Some(self.clone())
    }
}

/// A signed-in (or signing-in) user backed by an identity provider.
#[derive(Debug)]
pub struct Session<P> {
    provider: P,
}

impl<P: IdentityProvider> Session<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current ID token, or `None` after kicking off a fresh login when the
    /// token is missing or expired.
    pub fn id_token(&self) -> Option<SecretString> {
        self.id_token_at(Utc::now().timestamp())
    }

    fn id_token_at(&self, now_secs: i64) -> Option<SecretString> {
        let usable = self
            .provider
            .decoded_id_token()
            .is_some_and(|claims| !claims.is_expired_at(now_secs));

        if !usable {
            warn!("ID token missing or expired, logging in again");
            self.provider.logout();
            self.provider.login();
            return None;
        }

        self.provider.raw_id_token().map(SecretString::from)
    }
}

impl<P: IdentityProvider> TokenSource for Session<P> {
    fn bearer(&self) -> Option<SecretString> {
        self.id_token()
    }
}
