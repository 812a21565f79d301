use clap::Args;
use owo_colors::OwoColorize;

use crate::cmd::analytics::{self, AnalyticsArgs};
use crate::cmd::auth::{self, LoginArgs};
use crate::cmd::dashboard::{self, DashboardArgs};
use crate::cmd::ticket::{self, TicketArgs};
use crate::context::AppContext;
use crate::domain::route::Route;
use crate::error::AppResult;
use crate::workflow::session::navigate;

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Route to open: /, /login, /dashboard, /ticket/<id> or /analytics.
    pub path: String,
    /// Print views that support it as JSON.
    #[arg(long)]
    pub json: bool,
}

fn render_home() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "deskboard".bold()));
    out.push_str("Every customer conversation in one inbox.\n\n");
    out.push_str("  - Unified ticket list across email, chat, phone and social\n");
    out.push_str("  - Suggested responses on every ticket\n");
    out.push_str("  - Response and resolution analytics\n\n");
    out.push_str("Get started with `deskboard login`.\n");
    out
}

pub async fn home(ctx: &AppContext) -> AppResult<()> {
    open_route(ctx, Route::Home, false).await
}

pub async fn run(ctx: &AppContext, args: OpenArgs) -> AppResult<()> {
    let route = Route::parse(&args.path)?;
    open_route(ctx, route, args.json).await
}

async fn open_route(ctx: &AppContext, requested: Route, json: bool) -> AppResult<()> {
    let (resolved, _) = navigate(ctx, requested.clone()).await?;
    if resolved != requested {
        tracing::debug!(from = %requested, to = %resolved, "route guard redirect");
        eprintln!("Redirecting to {resolved}");
    }

    match resolved {
        Route::Home => {
            print!("{}", render_home());
            Ok(())
        }
        Route::Login => auth::login(ctx, LoginArgs::default()).await,
        Route::Dashboard => {
            dashboard::run(
                ctx,
                DashboardArgs {
                    json,
                    ..DashboardArgs::default()
                },
            )
            .await
        }
        Route::TicketDetail(id) => {
            ticket::run(
                ctx,
                TicketArgs {
                    id,
                    json,
                    ..TicketArgs::default()
                },
            )
            .await
        }
        Route::Analytics => analytics::run(ctx, AnalyticsArgs { json }).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_points_to_login() {
        let out = render_home();
        assert!(out.contains("deskboard login"));
    }
}
