use owo_colors::OwoColorize;
use serde::Serialize;

use crate::display::{
    channel_label, format_datetime, notification_line, priority_badge, status_badge,
};
use crate::domain::analytics::capitalize;
use crate::domain::preview::{DetailDraft, Notification};
use crate::domain::ticket::Ticket;

#[derive(Serialize)]
pub struct DetailReport<'a> {
    pub origin: &'static str,
    pub ticket: &'a Ticket,
    pub draft: &'a DetailDraft,
    pub notifications: &'a [Notification],
}

pub fn render_not_found(id: &str) -> String {
    format!(
        "{}\nNo ticket with id '{id}' exists. Run `deskboard dashboard` to list tickets.\n",
        "Ticket not found".bold()
    )
}

pub fn render_detail(report: &DetailReport<'_>) -> String {
    let ticket = report.ticket;
    let draft = report.draft;
    let mut out = String::new();

    out.push_str(&format!("{}\n", format!("Ticket #{}", ticket.id).bold()));
    out.push_str(&format!("{}\n", ticket.title));
    out.push_str(&format!(
        "{} {}  via {}\n\n",
        priority_badge(draft.priority),
        status_badge(Some(draft.status)),
        channel_label(ticket.channel)
    ));

    if !ticket.description.is_empty() {
        out.push_str(&format!("{}\n{}\n\n", "Description".bold(), ticket.description));
    }

    out.push_str(&format!("Created:      {}\n", format_datetime(ticket.created_at)));
    if let Some(updated_at) = ticket.updated_at {
        out.push_str(&format!("Last updated: {}\n", format_datetime(updated_at)));
    }
    if let Some(category) = &ticket.category {
        out.push_str(&format!("Category:     {}\n", capitalize(category)));
    }
    if !ticket.tags.is_empty() {
        out.push_str(&format!("Tags:         {}\n", ticket.tags.join(", ")));
    }
    out.push('\n');

    if let Some(customer) = &ticket.customer {
        out.push_str(&format!(
            "{}\n{} <{}>\n\n",
            "Customer".bold(),
            customer.name,
            customer.email
        ));
    }
    if let Some(assignee) = &ticket.assignee {
        out.push_str(&format!(
            "{}\n{} (Support Agent)\n\n",
            "Assigned agent".bold(),
            assignee.name
        ));
    }

    if !ticket.suggestions.is_empty() {
        out.push_str(&format!("{}\n", "Suggested responses".bold()));
        for (index, suggestion) in ticket.suggestions.iter().enumerate() {
            out.push_str(&format!("  {}. {suggestion}\n", index + 1));
        }
        out.push('\n');
    }

    if ticket.response_time_hours.is_some() || ticket.resolution_time_hours.is_some() {
        out.push_str(&format!("{}\n", "Metrics".bold()));
        if let Some(hours) = ticket.response_time_hours {
            out.push_str(&format!("  Response time:   {hours}h\n"));
        }
        if let Some(hours) = ticket.resolution_time_hours {
            out.push_str(&format!("  Resolution time: {hours}h\n"));
        }
        out.push('\n');
    }

    if !draft.response.is_empty() {
        out.push_str(&format!(
            "{}\n{}\n\n",
            "Response draft (not sent)".bold(),
            draft.response
        ));
    }

    for notification in report.notifications {
        out.push_str(&notification_line(notification));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preview::PreviewAction;
    use crate::domain::ticket::Status;
    use crate::infra::sample::sample_tickets;

    #[test]
    fn renders_rich_ticket() {
        let ticket = sample_tickets().remove(3);
        let draft = DetailDraft::from_ticket(&ticket);
        let out = render_detail(&DetailReport {
            origin: "sample",
            ticket: &ticket,
            draft: &draft,
            notifications: &[],
        });
        assert!(out.contains("Ticket #4"));
        assert!(out.contains("Lisa Thompson <lisa.thompson@startup.io>"));
        assert!(out.contains("Emma Wilson (Support Agent)"));
        assert!(out.contains("Response time:   2.5h"));
        assert!(out.contains("Resolution time: 18.25h"));
        assert!(out.contains("Category:     Feedback"));
    }

    #[test]
    fn renders_preview_notifications() {
        let ticket = sample_tickets().remove(0);
        let mut draft = DetailDraft::from_ticket(&ticket);
        let note = draft
            .apply(&ticket, PreviewAction::ChangeStatus(Status::Resolved))
            .unwrap()
            .unwrap();
        let notes = vec![note];
        let out = render_detail(&DetailReport {
            origin: "sample",
            ticket: &ticket,
            draft: &draft,
            notifications: &notes,
        });
        assert!(out.contains("not saved"));
        assert!(out.contains("Ticket status changed to resolved."));
        assert!(out.contains("1. Check if payment method is still valid"));
    }

    #[test]
    fn not_found_names_the_id() {
        assert!(render_not_found("99").contains("'99'"));
    }
}
