use std::env;

use clap::Args;

use crate::cmd::{ask, ask_secret};
use crate::context::AppContext;
use crate::domain::route::Route;
use crate::domain::session::User;
use crate::error::{AppError, AppResult};
use crate::workflow::session::{
    current_user, navigate, sign_in_with_access_token, sign_in_with_password, sign_out,
};

const PASSWORD_ENV: &str = "DESKBOARD_PASSWORD";

#[derive(Args, Debug, Clone, Default)]
pub struct LoginArgs {
    /// Account email; prompted for when omitted.
    #[arg(short, long)]
    pub email: Option<String>,
    /// Sign in through a third-party OAuth provider (e.g. google).
    #[arg(long, conflicts_with_all = ["email", "token"])]
    pub provider: Option<String>,
    /// Access token returned by a completed OAuth redirect.
    #[arg(long, conflicts_with = "email")]
    pub token: Option<String>,
}

fn describe(user: &User) -> String {
    match &user.email {
        Some(email) if user.name.is_some() => format!("{} <{email}>", user.display_name()),
        _ => user.display_name().to_string(),
    }
}

pub async fn login(ctx: &AppContext, args: LoginArgs) -> AppResult<()> {
    if let (Route::Dashboard, Some(user)) = navigate(ctx, Route::Login).await? {
        println!("Already signed in as {}.", describe(&user));
        return Ok(());
    }

    if ctx.identity.is_local_preview() {
        println!("No identity provider configured; signing in to a local preview session.");
    }

    let user = if let Some(token) = args.token {
        sign_in_with_access_token(ctx, &token).await?
    } else if let Some(provider) = args.provider {
        let url = ctx
            .identity
            .oauth_authorize_url(&provider, ctx.config.oauth_redirect.as_deref())?;
        println!("Open this URL in a browser to sign in with {provider}:\n\n  {url}\n");
        println!("After signing in, copy the access_token value from the redirect URL.");
        let token = ask_secret("Access token")?;
        if token.is_empty() {
            return Err(AppError::InvalidInput("no access token entered".to_string()));
        }
        sign_in_with_access_token(ctx, &token).await?
    } else {
        let email = match args.email {
            Some(email) => email,
            None => ask("Email")?,
        };
        let password = if ctx.identity.is_local_preview() {
            String::new()
        } else {
            match env::var(PASSWORD_ENV) {
                Ok(password) if !password.is_empty() => password,
                _ => ask_secret("Password")?,
            }
        };
        sign_in_with_password(ctx, &email, &password).await?
    };

    println!("Signed in as {}.", describe(&user));
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> AppResult<()> {
    if sign_out(ctx).await? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> AppResult<()> {
    match current_user(ctx).await? {
        Some(user) => {
            let suffix = if ctx.identity.is_local_preview() {
                " (local preview session)"
            } else {
                ""
            };
            println!("Signed in as {}{suffix}.", describe(&user));
        }
        None => println!("Not signed in. Run `deskboard login`."),
    }
    Ok(())
}
