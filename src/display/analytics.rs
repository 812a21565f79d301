use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::display::{bar, load_banner};
use crate::domain::analytics::{AnalyticsReport, Share, compact_number};
use crate::workflow::tickets::TicketLoad;

const BAR_WIDTH: usize = 24;

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Name")]
    label: String,
    #[tabled(rename = "Tickets")]
    count: usize,
    #[tabled(rename = "Share")]
    percent: String,
    #[tabled(rename = "")]
    bar: String,
}

fn share_table(shares: &[Share]) -> String {
    let max = shares.iter().map(|s| s.count).max().unwrap_or_default() as f64;
    let rows = shares.iter().map(|share| ShareRow {
        label: share.label.clone(),
        count: share.count,
        percent: format!("{}%", share.percent),
        bar: bar(share.count as f64, max, BAR_WIDTH),
    });
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

fn hours(value: Option<f64>) -> String {
    value
        .map(|hours| format!("{hours:.1}h"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn render_analytics(report: &AnalyticsReport, load: &TicketLoad) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Analytics".bold()));
    out.push_str("Support performance across all tickets\n");
    if let Some(banner) = load_banner(load) {
        out.push_str(&banner);
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&format!(
        "Total tickets: {}   Open: {}   Resolved: {}   Resolution rate: {}%\n",
        compact_number(report.total).bold(),
        report.open,
        report.resolved,
        report.resolution_rate
    ));
    out.push_str(&format!(
        "Avg response time: {}   Avg resolution time: {}\n\n",
        hours(report.avg_response_hours),
        hours(report.avg_resolution_hours)
    ));

    out.push_str(&format!("{}\n", "Trends".bold()));
    if report.daily.is_empty() {
        out.push_str("No ticket activity.\n");
    } else {
        let max = report.daily.iter().map(|p| p.tickets).max().unwrap_or_default() as f64;
        for point in &report.daily {
            out.push_str(&format!(
                "  {}  {:>4}  {:<width$}  response {}\n",
                point.date.strftime("%b %d"),
                point.tickets,
                bar(point.tickets as f64, max, BAR_WIDTH),
                hours(point.avg_response_hours),
                width = BAR_WIDTH
            ));
        }
    }
    out.push('\n');

    if !report.by_category.is_empty() {
        out.push_str(&format!("{}\n", "Tickets by category".bold()));
        out.push_str(&share_table(&report.by_category));
        out.push_str("\n\n");
    }

    out.push_str(&format!(
        "{}\n",
        "Priority distribution (open tickets)".bold()
    ));
    out.push_str(&share_table(&report.open_by_priority));
    out.push_str("\n\n");

    if !report.by_channel.is_empty() {
        out.push_str(&format!("{}\n", "Channel performance".bold()));
        out.push_str(&share_table(&report.by_channel));
        out.push('\n');
    }
    out
}
