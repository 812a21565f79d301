use async_trait::async_trait;

use crate::domain::session::{Session, User};
use crate::error::AppResult;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;

    /// URL the user opens in a browser to start a third-party sign-in.
    fn oauth_authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> AppResult<String>;

    /// Builds a session from an access token handed back by an OAuth redirect.
    async fn session_from_access_token(&self, access_token: &str) -> AppResult<Session>;

    /// `Ok(None)` when the provider rejects the session.
    async fn current_user(&self, session: &Session) -> AppResult<Option<User>>;

    async fn refresh(&self, session: &Session) -> AppResult<Session>;

    async fn sign_out(&self, session: &Session) -> AppResult<()>;

    /// Identifies the provider instance; sessions are stored per key.
    fn endpoint_key(&self) -> String;

    /// True for the offline provider used when no endpoint is configured.
    fn is_local_preview(&self) -> bool {
        false
    }
}
