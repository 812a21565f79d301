use clap::Args;

use crate::cmd::{fetch_tickets, print_json, require_user};
use crate::context::AppContext;
use crate::display::analytics::render_analytics;
use crate::domain::analytics::AnalyticsReport;
use crate::domain::route::Route;
use crate::error::AppResult;

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyticsArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(ctx: &AppContext, args: AnalyticsArgs) -> AppResult<()> {
    require_user(ctx, Route::Analytics).await?;

    let load = fetch_tickets(ctx).await?;
    let report = AnalyticsReport::compute(load.tickets());

    if args.json {
        return print_json(&report);
    }
    print!("{}", render_analytics(&report, &load));
    Ok(())
}
