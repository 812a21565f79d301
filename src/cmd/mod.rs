pub mod analytics;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod open;
pub mod ticket;

use std::io::{self, Write};

use serde::Serialize;

use crate::context::AppContext;
use crate::domain::route::Route;
use crate::domain::session::User;
use crate::error::{AppError, AppResult};
use crate::workflow::session::navigate;
use crate::workflow::tickets::{TicketLoad, TicketView};

/// Runs the route guard for a protected view.
pub async fn require_user(ctx: &AppContext, route: Route) -> AppResult<User> {
    match navigate(ctx, route.clone()).await? {
        (resolved, Some(user)) if resolved == route => Ok(user),
        _ => Err(AppError::Identity(format!(
            "sign in required to open {route}; run `deskboard login` first"
        ))),
    }
}

/// Loads tickets for a view. Only a load with no data at all is an error.
pub async fn fetch_tickets(ctx: &AppContext) -> AppResult<TicketLoad> {
    let mut view = TicketView::fetch(ctx).await;
    if let Some(message) = view.error.take() {
        return Err(AppError::DataSource(message));
    }
    view.load
        .ok_or_else(|| AppError::DataSource("ticket load did not finish".to_string()))
}

pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn ask(label: &str) -> AppResult<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Like [`ask`], without echoing the answer to the terminal.
pub fn ask_secret(label: &str) -> AppResult<String> {
    let input = rpassword::prompt_password(format!("{label}: "))?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::config::{AppConfig, StoredConfig};
    use crate::infra::hosted_table::HostedTableClient;
    use crate::infra::preview_auth::PreviewIdentity;

    fn unconfigured_context(fallback_to_sample: bool) -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let mut config =
            AppConfig::resolve(StoredConfig::default(), dir.path().to_path_buf(), |_| None)
                .unwrap();
        config.fallback_to_sample = fallback_to_sample;
        let tickets = HostedTableClient::new(
            None,
            None,
            "tickets".to_string(),
            "id".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        let ctx = AppContext::new(
            config,
            Arc::new(tickets),
            Arc::new(PreviewIdentity::new(SecretString::from("pk".to_string()))),
        );
        (dir, ctx)
    }

    #[tokio::test]
    async fn disabled_fallback_surfaces_data_source_error() {
        let (_dir, ctx) = unconfigured_context(false);
        let err = fetch_tickets(&ctx).await.unwrap_err();
        match err {
            AppError::DataSource(message) => assert!(message.contains("not configured")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn enabled_fallback_returns_sample_tickets() {
        let (_dir, ctx) = unconfigured_context(true);
        let load = fetch_tickets(&ctx).await.unwrap();
        assert_eq!(load.origin(), "sample");
        assert_eq!(load.tickets().len(), 4);
    }
}
