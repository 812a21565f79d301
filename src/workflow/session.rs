use jiff::Timestamp;

use crate::context::AppContext;
use crate::domain::route::Route;
use crate::domain::session::{Session, User};
use crate::error::{AppError, AppResult};
use crate::session_store::SessionStore;

fn remember(ctx: &AppContext, session: &Session) -> AppResult<()> {
    let mut store = SessionStore::load(&ctx.config.state_dir)?;
    store.insert(ctx.identity.endpoint_key(), session);
    store.save()
}

fn forget(ctx: &AppContext) -> AppResult<bool> {
    let mut store = SessionStore::load(&ctx.config.state_dir)?;
    let removed = store.remove(&ctx.identity.endpoint_key());
    if removed {
        store.save()?;
    }
    Ok(removed)
}

pub async fn sign_in_with_password(
    ctx: &AppContext,
    email: &str,
    password: &str,
) -> AppResult<User> {
    let session = ctx.identity.sign_in_with_password(email, password).await?;
    remember(ctx, &session)?;
    tracing::info!(user = %session.user.id, "signed in");
    Ok(session.user)
}

pub async fn sign_in_with_access_token(ctx: &AppContext, access_token: &str) -> AppResult<User> {
    let session = ctx.identity.session_from_access_token(access_token).await?;
    remember(ctx, &session)?;
    tracing::info!(user = %session.user.id, "signed in with access token");
    Ok(session.user)
}

/// Asks the identity provider whether the stored session still belongs to a
/// user. Expired sessions are refreshed once; rejected ones are dropped. An
/// unreachable provider counts as anonymous and keeps the stored session.
pub async fn current_user(ctx: &AppContext) -> AppResult<Option<User>> {
    let store = SessionStore::load(&ctx.config.state_dir)?;
    let Some(mut session) = store.get(&ctx.identity.endpoint_key()) else {
        return Ok(None);
    };

    if session.is_expired(Timestamp::now()) {
        if session.refresh_token.is_none() {
            tracing::debug!("stored session expired");
            forget(ctx)?;
            return Ok(None);
        }
        match ctx.identity.refresh(&session).await {
            Ok(renewed) => {
                remember(ctx, &renewed)?;
                session = renewed;
            }
            Err(err) => {
                tracing::warn!("session refresh failed: {err}");
                forget(ctx)?;
                return Ok(None);
            }
        }
    }

    match ctx.identity.current_user(&session).await {
        Ok(Some(user)) => Ok(Some(user)),
        Ok(None) => {
            tracing::debug!("identity provider rejected stored session");
            forget(ctx)?;
            Ok(None)
        }
        Err(AppError::Identity(detail)) => {
            tracing::warn!("could not check stored session, continuing signed out: {detail}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Returns `true` when a session was removed.
pub async fn sign_out(ctx: &AppContext) -> AppResult<bool> {
    let store = SessionStore::load(&ctx.config.state_dir)?;
    let Some(session) = store.get(&ctx.identity.endpoint_key()) else {
        return Ok(false);
    };
    if let Err(err) = ctx.identity.sign_out(&session).await {
        tracing::warn!("remote sign-out failed, dropping local session anyway: {err}");
    }
    tracing::info!(user = %session.user.id, "signed out");
    forget(ctx)
}

/// Applies the route guard for the current visitor.
pub async fn navigate(ctx: &AppContext, requested: Route) -> AppResult<(Route, Option<User>)> {
    let user = current_user(ctx).await?;
    let resolved = requested.resolve(user.is_some());
    Ok((resolved, user))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::config::{AppConfig, StoredConfig};
    use crate::infra::hosted_auth::HostedAuthClient;
    use crate::infra::preview_auth::PreviewIdentity;
    use crate::infra::sample::SampleTickets;

    fn context(state_dir: &Path) -> AppContext {
        let config =
            AppConfig::resolve(StoredConfig::default(), state_dir.to_path_buf(), |_| None)
                .unwrap();
        AppContext::new(
            config,
            Arc::new(SampleTickets),
            Arc::new(PreviewIdentity::new(SecretString::from("pk".to_string()))),
        )
    }

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let (route, user) = navigate(&ctx, Route::Dashboard).await.unwrap();
        assert_eq!(route, Route::Login);
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn sign_in_persists_until_sign_out() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        let user = sign_in_with_password(&ctx, "agent@example.com", "")
            .await
            .unwrap();
        assert_eq!(current_user(&ctx).await.unwrap(), Some(user.clone()));

        let (route, _) = navigate(&ctx, Route::Home).await.unwrap();
        assert_eq!(route, Route::Dashboard);
        let (route, _) = navigate(&ctx, Route::TicketDetail("2".to_string()))
            .await
            .unwrap();
        assert_eq!(route, Route::TicketDetail("2".to_string()));

        assert!(sign_out(&ctx).await.unwrap());
        assert!(!sign_out(&ctx).await.unwrap());
        assert_eq!(current_user(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_provider_leaves_visitor_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            AppConfig::resolve(StoredConfig::default(), dir.path().to_path_buf(), |_| None)
                .unwrap();
        let identity = HostedAuthClient::new(
            "http://127.0.0.1:1".to_string(),
            SecretString::from("pk".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let ctx = AppContext::new(config, Arc::new(SampleTickets), Arc::new(identity));
        let session = Session {
            access_token: SecretString::from("live-token".to_string()),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: "agent".to_string(),
                email: Some("agent@example.com".to_string()),
                name: None,
            },
        };
        remember(&ctx, &session).unwrap();

        assert_eq!(navigate(&ctx, Route::Home).await.unwrap(), (Route::Home, None));
        assert_eq!(
            navigate(&ctx, Route::Dashboard).await.unwrap(),
            (Route::Login, None)
        );
        let store = SessionStore::load(dir.path()).unwrap();
        assert!(store.get(&ctx.identity.endpoint_key()).is_some());
    }

    #[tokio::test]
    async fn expired_session_without_refresh_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let session = Session {
            access_token: SecretString::from("preview.abc".to_string()),
            refresh_token: None,
            expires_at: Some(Timestamp::constant(1_705_314_600, 0)),
            user: User {
                id: "abc".to_string(),
                email: Some("a@b.io".to_string()),
                name: None,
            },
        };
        remember(&ctx, &session).unwrap();

        assert_eq!(current_user(&ctx).await.unwrap(), None);
        let store = SessionStore::load(dir.path()).unwrap();
        assert!(store.get(&ctx.identity.endpoint_key()).is_none());
    }

    #[tokio::test]
    async fn expired_session_with_refresh_token_is_renewed() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let session = Session {
            access_token: SecretString::from("preview.stale".to_string()),
            refresh_token: Some(SecretString::from("r".to_string())),
            expires_at: Some(Timestamp::constant(1_705_314_600, 0)),
            user: User {
                id: "stale".to_string(),
                email: Some("a@b.io".to_string()),
                name: None,
            },
        };
        remember(&ctx, &session).unwrap();

        let user = current_user(&ctx).await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("a@b.io"));
        let stored = SessionStore::load(dir.path())
            .unwrap()
            .get(&ctx.identity.endpoint_key())
            .unwrap();
        assert!(!stored.is_expired(Timestamp::now()));
    }
}
