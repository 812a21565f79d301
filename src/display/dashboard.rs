use jiff::Timestamp;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::display::{channel_label, load_banner, time_ago};
use crate::domain::filter::TicketFilter;
use crate::domain::metrics::TicketStats;
use crate::domain::ticket::Ticket;
use crate::workflow::tickets::TicketLoad;

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Suggestions")]
    suggestions: String,
}

impl TicketRow {
    fn from_ticket(ticket: &Ticket, now: Timestamp) -> Self {
        Self {
            id: format!("#{}", ticket.id),
            priority: ticket.priority.to_string(),
            status: ticket
                .status
                .map(|status| status.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            title: ticket.title.clone(),
            customer: ticket.customer_name().unwrap_or("-").to_string(),
            channel: channel_label(ticket.channel).to_string(),
            created: time_ago(ticket.created_at, now),
            assignee: ticket
                .assignee
                .as_ref()
                .map(|assignee| assignee.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            suggestions: match ticket.suggestions.len() {
                0 => String::new(),
                count => count.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
pub struct DashboardReport<'a> {
    pub origin: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub stats: TicketStats,
    pub tickets: Vec<&'a Ticket>,
}

impl<'a> DashboardReport<'a> {
    pub fn build(load: &'a TicketLoad, filter: &TicketFilter) -> Self {
        Self {
            origin: load.origin(),
            fallback_reason: load.fallback_reason().map(|reason| reason.to_string()),
            stats: TicketStats::compute(load.tickets()),
            tickets: filter.apply(load.tickets()),
        }
    }
}

pub fn render_dashboard(report: &DashboardReport<'_>, load: &TicketLoad, now: Timestamp) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Dashboard".bold()));
    out.push_str("Unified inbox for all customer support tickets\n");
    if let Some(banner) = load_banner(load) {
        out.push_str(&banner);
        out.push('\n');
    }
    out.push('\n');

    let cards = report
        .stats
        .cards()
        .iter()
        .map(|(label, count)| format!("{label}: {}", count.bold()))
        .collect::<Vec<_>>()
        .join("   ");
    out.push_str(&cards);
    out.push_str("\n\n");

    out.push_str(&format!(
        "Tickets ({} of {})\n",
        report.tickets.len(),
        report.stats.total
    ));
    if report.tickets.is_empty() {
        out.push_str("No tickets found matching your filters.\n");
        return out;
    }

    let rows = report
        .tickets
        .iter()
        .map(|ticket| TicketRow::from_ticket(ticket, now));
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    out.push_str(&table.to_string());
    out.push('\n');
    out
}
