use clap::Args;
use jiff::Timestamp;

use crate::cmd::{fetch_tickets, print_json, require_user};
use crate::context::AppContext;
use crate::display::dashboard::{DashboardReport, render_dashboard};
use crate::domain::filter::{SearchScope, TicketFilter};
use crate::domain::route::Route;
use crate::error::AppResult;

#[derive(Args, Debug, Clone, Default)]
pub struct DashboardArgs {
    /// Status to show: all, open, in-progress, resolved or closed.
    #[arg(short, long)]
    pub status: Option<String>,
    /// Priority to show: all, low, medium, high or urgent.
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Case-insensitive text to look for in ticket titles.
    #[arg(short, long)]
    pub query: Option<String>,
    /// Also match the query against customer names.
    #[arg(long)]
    pub include_customer: bool,
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &AppContext, args: DashboardArgs) -> AppResult<()> {
    require_user(ctx, Route::Dashboard).await?;

    let scope = if args.include_customer {
        SearchScope::TitleAndCustomer
    } else {
        SearchScope::Title
    };
    let filter = TicketFilter::from_input(
        args.status.as_deref(),
        args.priority.as_deref(),
        args.query.as_deref(),
        scope,
    )?;

    let load = fetch_tickets(ctx).await?;
    let report = DashboardReport::build(&load, &filter);

    if args.json {
        return print_json(&report);
    }
    print!("{}", render_dashboard(&report, &load, Timestamp::now()));
    Ok(())
}
