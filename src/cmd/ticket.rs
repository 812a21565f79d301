use clap::Args;

use crate::cmd::{fetch_tickets, print_json, require_user};
use crate::context::AppContext;
use crate::display::detail::{DetailReport, render_detail, render_not_found};
use crate::domain::preview::{DetailDraft, Notification, PreviewAction};
use crate::domain::route::Route;
use crate::domain::ticket::{Priority, Status, Ticket};
use crate::error::{AppError, AppResult};

/// Ticket detail view. Every action here only changes a local preview and is
/// never written back to the data source.
#[derive(Args, Debug, Clone, Default)]
pub struct TicketArgs {
    /// Ticket identifier.
    pub id: String,
    /// Preview a status change (open, in-progress, resolved, closed).
    #[arg(long)]
    pub status: Option<String>,
    /// Preview a priority change (low, medium, high, urgent).
    #[arg(long)]
    pub priority: Option<String>,
    /// Start the response from suggestion N (1-based).
    #[arg(long, value_name = "N")]
    pub use_suggestion: Option<usize>,
    /// Response text to draft.
    #[arg(long, value_name = "TEXT")]
    pub respond: Option<String>,
    /// Preview sending the drafted response.
    #[arg(long)]
    pub send: bool,
    /// Print the ticket and preview state as JSON.
    #[arg(long)]
    pub json: bool,
}

impl TicketArgs {
    fn actions(&self) -> AppResult<Vec<PreviewAction>> {
        let mut actions = Vec::new();
        if let Some(raw) = &self.status {
            let status = Status::parse(raw)
                .ok_or_else(|| AppError::InvalidInput(format!("unknown status '{raw}'")))?;
            actions.push(PreviewAction::ChangeStatus(status));
        }
        if let Some(raw) = &self.priority {
            let priority = Priority::parse(raw)
                .ok_or_else(|| AppError::InvalidInput(format!("unknown priority '{raw}'")))?;
            actions.push(PreviewAction::ChangePriority(priority));
        }
        if let Some(index) = self.use_suggestion {
            actions.push(PreviewAction::UseSuggestion(index));
        }
        if let Some(text) = &self.respond {
            actions.push(PreviewAction::SetResponse(text.clone()));
        }
        if self.send {
            actions.push(PreviewAction::SendResponse);
        }
        Ok(actions)
    }
}

pub fn find_ticket<'a>(tickets: &'a [Ticket], id: &str) -> Option<&'a Ticket> {
    tickets.iter().find(|ticket| ticket.id == id.trim())
}

pub fn preview(ticket: &Ticket, actions: Vec<PreviewAction>) -> AppResult<(DetailDraft, Vec<Notification>)> {
    let mut draft = DetailDraft::from_ticket(ticket);
    let mut notifications = Vec::new();
    for action in actions {
        if let Some(notification) = draft.apply(ticket, action)? {
            notifications.push(notification);
        }
    }
    Ok((draft, notifications))
}

pub async fn run(ctx: &AppContext, args: TicketArgs) -> AppResult<()> {
    require_user(ctx, Route::TicketDetail(args.id.clone())).await?;
    let actions = args.actions()?;

    let load = fetch_tickets(ctx).await?;

    let Some(ticket) = find_ticket(load.tickets(), &args.id) else {
        if !args.json {
            print!("{}", render_not_found(&args.id));
        }
        return Err(AppError::NotFound(format!("ticket '{}'", args.id)));
    };

    let (draft, notifications) = preview(ticket, actions)?;
    let report = DetailReport {
        origin: load.origin(),
        ticket,
        draft: &draft,
        notifications: &notifications,
    };

    if args.json {
        return print_json(&report);
    }
    print!("{}", render_detail(&report));
    Ok(())
}
