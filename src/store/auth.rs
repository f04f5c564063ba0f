use std::sync::Arc;

use crate::auth::{IdentityProvider, Session};
use crate::model::LineProfile;
use crate::options::SecretString;
use crate::repos::AuthRepo;
use crate::store::Loadable;

/// Sign-in state.
///
/// The session is shared with the API client, which pulls bearer tokens
/// from it.
#[derive(Debug)]
pub struct AuthStore<P> {
    session: Arc<Session<P>>,
    repo: AuthRepo,
    pub profile: Loadable<Option<LineProfile>>,
    pub internal_token: Loadable<()>,
}

impl<P: IdentityProvider> AuthStore<P> {
    pub fn new(session: Arc<Session<P>>, repo: AuthRepo) -> Self {
        Self {
            session,
            repo,
            profile: Loadable::new(None),
            internal_token: Loadable::default(),
        }
    }

    /// Initialise the provider and load the profile when already signed in.
    pub async fn init(&mut self) {
        self.profile.set_loading();
        let provider = self.session.provider();

        if let Err(e) = provider.init().await {
            self.profile.set_error(e.message());
            return;
        }

        if !provider.is_logged_in() {
            self.profile.set_value(None);
            return;
        }

        // Expired tokens trigger a fresh login here rather than on the first API call
        let _ = self.session.id_token();

        let result = provider.profile().await;
        self.profile.settle(result.map(Some));
    }

    pub fn is_logged_in(&self) -> bool {
        self.profile.has_data() && self.profile.value().is_some()
    }

    pub fn login(&self) {
        self.session.provider().login();
    }

    pub fn logout(&mut self) {
        self.session.provider().logout();
        self.profile.set_value(None);
    }

    pub async fn set_internal_token(&mut self, token: &SecretString) {
        self.internal_token.set_loading();
        let result = self.repo.set_internal_token(token).await;
        self.internal_token.settle(result.map(|_| ()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::FakeProvider;
    use crate::auth::NoToken;
    use crate::client::ApiClient;
    use crate::options::ClientOptions;
    use std::sync::atomic::Ordering;

    fn store(provider: FakeProvider) -> AuthStore<FakeProvider> {
        let client = ApiClient::new(ClientOptions::new("http://127.0.0.1:1"), Arc::new(NoToken)).unwrap();
        AuthStore::new(Arc::new(Session::new(provider)), AuthRepo::new(client))
    }

    #[tokio::test]
    async fn test_init_loads_profile_when_logged_in() {
        let mut auth = store(FakeProvider::signed_in("id-token", i64::MAX));
        auth.init().await;

        assert!(auth.is_logged_in());
        assert_eq!(auth.profile.value().as_ref().unwrap().user_id, "U123");
    }

    #[tokio::test]
    async fn test_init_when_logged_out() {
        let mut auth = store(FakeProvider::default());
        auth.init().await;

        assert!(auth.profile.has_data());
        assert!(!auth.is_logged_in());
    }

    #[tokio::test]
    async fn test_init_with_expired_token_starts_login() {
        let mut auth = store(FakeProvider::signed_in("id-token", 0));
        auth.init().await;

        assert_eq!(auth.session.provider().logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_profile() {
        let mut auth = store(FakeProvider::signed_in("id-token", i64::MAX));
        auth.init().await;
        auth.logout();

        assert!(!auth.is_logged_in());
        assert_eq!(auth.session.provider().logouts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_internal_token_failure_is_recorded() {
        let mut auth = store(FakeProvider::default());
        auth.set_internal_token(&SecretString::from("internal")).await;

        assert!(auth.internal_token.has_error());
    }
}
