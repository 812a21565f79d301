mod cmd;
mod config;
mod context;
mod display;
mod domain;
mod error;
mod infra;
mod services;
mod session_store;
mod workflow;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::analytics::{self, AnalyticsArgs};
use crate::cmd::auth::{self, LoginArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::dashboard::{self, DashboardArgs};
use crate::cmd::open::{self, OpenArgs};
use crate::cmd::ticket::{self, TicketArgs};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;

const LOG_ENV: &str = "DESKBOARD_LOG";

#[derive(Parser)]
#[command(
    name = "deskboard",
    author,
    version,
    about = "Customer support ticket dashboard"
)]
struct Cli {
    /// Read tickets from the built-in sample set instead of the data source.
    #[arg(long, global = true)]
    sample: bool,

    /// Fail instead of substituting the sample set when the data source
    /// cannot be read.
    #[arg(long, global = true, conflicts_with = "sample")]
    no_fallback: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Landing page; goes to the dashboard when already signed in.
    Home,
    /// Sign in with email and password, or through an OAuth provider.
    Login(LoginArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List tickets with summary counts and filters.
    Dashboard(DashboardArgs),
    /// Show one ticket and preview status, priority and response changes.
    Ticket(TicketArgs),
    /// Aggregate support analytics.
    Analytics(AnalyticsArgs),
    /// Open a view by route path, e.g. /ticket/3.
    Open(OpenArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        command => run_view(command, cli.sample, cli.no_fallback).await,
    }
}

async fn run_view(command: Commands, sample: bool, no_fallback: bool) -> AppResult<()> {
    let mut config = AppConfig::load()?;
    if no_fallback {
        config.fallback_to_sample = false;
    }
    if !sample && !config.has_data_source() {
        tracing::info!("data source not configured; tickets come from the built-in sample set");
    }
    let ctx = AppContext::from_config(config, sample)?;

    match command {
        Commands::Home => open::home(&ctx).await,
        Commands::Login(args) => auth::login(&ctx, args).await,
        Commands::Logout => auth::logout(&ctx).await,
        Commands::Whoami => auth::whoami(&ctx).await,
        Commands::Dashboard(args) => dashboard::run(&ctx, args).await,
        Commands::Ticket(args) => ticket::run(&ctx, args).await,
        Commands::Analytics(args) => analytics::run(&ctx, args).await,
        Commands::Open(args) => open::run(&ctx, args).await,
        Commands::Config(args) => config_cmd::run(args.command),
    }
}
