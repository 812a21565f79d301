use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::session::{Session, User};
use crate::error::{AppError, AppResult};
use crate::services::IdentityProvider;
use crate::session_store::SessionStore;

const PREVIEW_ENDPOINT: &str = "local-preview";
const PREVIEW_TOKEN_PREFIX: &str = "preview.";
const SESSION_HOURS: i64 = 12;

/// Stand-in identity provider for running without a hosted identity service.
/// Any non-empty email signs in; passwords are not checked.
pub struct PreviewIdentity {
    api_key: SecretString,
}

impl PreviewIdentity {
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }

    fn issue(&self, email: &str) -> AppResult<Session> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::InvalidInput("an email is required".to_string()));
        }
        let digest = blake3::hash(email.to_lowercase().as_bytes()).to_hex();
        let user_id = digest.as_str()[..16].to_string();
        let expires_at = Timestamp::now()
            .checked_add(SignedDuration::from_hours(SESSION_HOURS))
            .map_err(|err| AppError::Identity(format!("failed to compute expiry: {err}")))?;
        Ok(Session {
            access_token: SecretString::from(format!("{PREVIEW_TOKEN_PREFIX}{user_id}")),
            refresh_token: None,
            expires_at: Some(expires_at),
            user: User {
                id: user_id,
                email: Some(email.to_string()),
                name: None,
            },
        })
    }
}

#[async_trait]
impl IdentityProvider for PreviewIdentity {
    async fn sign_in_with_password(&self, email: &str, _password: &str) -> AppResult<Session> {
        self.issue(email)
    }

    fn oauth_authorize_url(&self, provider: &str, _redirect_to: Option<&str>) -> AppResult<String> {
        Err(AppError::Configuration(format!(
            "signing in with {provider} needs an identity provider URL (DESKBOARD_AUTH_URL)"
        )))
    }

    async fn session_from_access_token(&self, _access_token: &str) -> AppResult<Session> {
        Err(AppError::Configuration(
            "access tokens need an identity provider URL (DESKBOARD_AUTH_URL)".to_string(),
        ))
    }

    async fn current_user(&self, session: &Session) -> AppResult<Option<User>> {
        let token = session.access_token.expose_secret();
        let valid = token
            .strip_prefix(PREVIEW_TOKEN_PREFIX)
            .is_some_and(|id| id == session.user.id)
            && !session.is_expired(Timestamp::now());
        Ok(valid.then(|| session.user.clone()))
    }

    async fn refresh(&self, session: &Session) -> AppResult<Session> {
        let email = session
            .user
            .email
            .as_deref()
            .ok_or_else(|| AppError::Identity("preview session has no email".to_string()))?;
        self.issue(email)
    }

    async fn sign_out(&self, _session: &Session) -> AppResult<()> {
        Ok(())
    }

    fn endpoint_key(&self) -> String {
        SessionStore::compute_key(PREVIEW_ENDPOINT, self.api_key.expose_secret())
    }

    fn is_local_preview(&self) -> bool {
        true
    }
}
