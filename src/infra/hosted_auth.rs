use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::session::{Session, User, token_expiry};
use crate::error::{AppError, AppResult};
use crate::services::IdentityProvider;
use crate::session_store::SessionStore;

/// Client for a GoTrue-compatible hosted identity API (`/auth/v1/...`).
pub struct HostedAuthClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl HostedAuthClient {
    pub fn new(base_url: String, api_key: SecretString, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.api_key.expose_secret())
            .header(ACCEPT, "application/json")
    }

    async fn token_grant<B: Serialize + Sync>(&self, grant_type: &str, body: &B) -> AppResult<Session> {
        let response = self
            .with_key(self.http.post(self.endpoint("token")))
            .query(&[("grant_type", grant_type)])
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::Identity(format!("failed to reach identity provider: {err}")))?;

        let payload: TokenResponse = parse_success(response).await?;
        Ok(payload.into_session())
    }
}

#[async_trait]
impl IdentityProvider for HostedAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }
        self.token_grant(
            "password",
            &PasswordGrant {
                email: email.trim(),
                password,
            },
        )
        .await
    }

    fn oauth_authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> AppResult<String> {
        let provider = provider.trim();
        if provider.is_empty() {
            return Err(AppError::InvalidInput(
                "an OAuth provider name is required".to_string(),
            ));
        }
        let mut params = vec![("provider", provider)];
        if let Some(redirect) = redirect_to {
            params.push(("redirect_to", redirect));
        }
        let url = Url::parse_with_params(&self.endpoint("authorize"), &params)
            .map_err(|err| AppError::Configuration(format!("invalid identity URL: {err}")))?;
        Ok(url.to_string())
    }

    async fn session_from_access_token(&self, access_token: &str) -> AppResult<Session> {
        let access_token = access_token.trim();
        let probe = Session {
            access_token: SecretString::from(access_token.to_string()),
            refresh_token: None,
            expires_at: token_expiry(access_token),
            user: User {
                id: String::new(),
                email: None,
                name: None,
            },
        };
        let user = self
            .current_user(&probe)
            .await?
            .ok_or_else(|| AppError::Identity("access token was rejected".to_string()))?;
        Ok(Session { user, ..probe })
    }

    async fn current_user(&self, session: &Session) -> AppResult<Option<User>> {
        let response = self
            .with_key(self.http.get(self.endpoint("user")))
            .header(
                AUTHORIZATION,
                format!("Bearer {}", session.access_token.expose_secret()),
            )
            .send()
            .await
            .map_err(|err| AppError::Identity(format!("failed to reach identity provider: {err}")))?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let payload: UserPayload = parse_success(response).await?;
        Ok(Some(payload.into_user()))
    }

    async fn refresh(&self, session: &Session) -> AppResult<Session> {
        let refresh_token = session
            .refresh_token
            .as_ref()
            .ok_or_else(|| AppError::Identity("session has no refresh token".to_string()))?;
        self.token_grant(
            "refresh_token",
            &RefreshGrant {
                refresh_token: refresh_token.expose_secret(),
            },
        )
        .await
    }

    async fn sign_out(&self, session: &Session) -> AppResult<()> {
        let response = self
            .with_key(self.http.post(self.endpoint("logout")))
            .header(
                AUTHORIZATION,
                format!("Bearer {}", session.access_token.expose_secret()),
            )
            .send()
            .await
            .map_err(|err| AppError::Identity(format!("failed to reach identity provider: {err}")))?;

        let status = response.status();
        // An already revoked token is as good as a successful sign-out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(AppError::Identity(format!(
            "sign-out failed with {status}: {}",
            error_message(response).await
        )))
    }

    fn endpoint_key(&self) -> String {
        SessionStore::compute_key(&self.base_url, self.api_key.expose_secret())
    }
}

async fn parse_success<T: for<'de> Deserialize<'de>>(response: Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Identity(format!(
            "identity provider responded with {status}: {}",
            error_message(response).await
        )));
    }
    response
        .json()
        .await
        .map_err(|err| AppError::Identity(format!("failed to parse identity response: {err}")))
}

async fn error_message(response: Response) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unable to read response>".to_string());
    match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => payload
            .error_description
            .or(payload.msg)
            .or(payload.message)
            .or(payload.error)
            .unwrap_or(body),
        Err(_) => body,
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: UserPayload,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|at| Timestamp::from_second(at).ok())
            .or_else(|| {
                self.expires_in.and_then(|seconds| {
                    Timestamp::now()
                        .checked_add(SignedDuration::from_secs(seconds))
                        .ok()
                })
            })
            .or_else(|| token_expiry(&self.access_token));

        Session {
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at,
            user: self.user.into_user(),
        }
    }
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
}

impl UserPayload {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email.filter(|email| !email.is_empty()),
            name: self.user_metadata.full_name.or(self.user_metadata.name),
        }
    }
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}
