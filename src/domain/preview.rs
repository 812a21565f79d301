use serde::Serialize;

use crate::domain::ticket::{Priority, Status, Ticket};
use crate::error::{AppError, AppResult};

/// Detail-view edits. Nothing here is written back to the ticket source.
#[derive(Debug, Clone)]
pub enum PreviewAction {
    ChangeStatus(Status),
    ChangePriority(Priority),
    /// 1-based index into the ticket's suggestions.
    UseSuggestion(usize),
    SetResponse(String),
    SendResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    /// Always true: every notification describes a change that was not saved.
    pub local_only: bool,
}

impl Notification {
    fn local(title: &str, description: String) -> Self {
        Self {
            title: title.to_string(),
            description,
            local_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailDraft {
    pub status: Status,
    pub priority: Priority,
    pub response: String,
}

impl DetailDraft {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            status: ticket.status.unwrap_or(Status::Open),
            priority: ticket.priority,
            response: String::new(),
        }
    }

    /// Applies one action. Returns `None` when the action is a no-op, which is
    /// the case for sending a blank response.
    pub fn apply(
        &mut self,
        ticket: &Ticket,
        action: PreviewAction,
    ) -> AppResult<Option<Notification>> {
        match action {
            PreviewAction::ChangeStatus(status) => {
                self.status = status;
                Ok(Some(Notification::local(
                    "Status updated",
                    format!("Ticket status changed to {}.", status.label()),
                )))
            }
            PreviewAction::ChangePriority(priority) => {
                self.priority = priority;
                Ok(Some(Notification::local(
                    "Priority updated",
                    format!("Ticket priority changed to {priority}."),
                )))
            }
            PreviewAction::UseSuggestion(index) => {
                let suggestion = index
                    .checked_sub(1)
                    .and_then(|i| ticket.suggestions.get(i))
                    .ok_or_else(|| {
                        AppError::InvalidInput(format!(
                            "ticket #{} has {} suggestion(s), no suggestion {index}",
                            ticket.id,
                            ticket.suggestions.len()
                        ))
                    })?;
                self.response = suggestion.clone();
                Ok(Some(Notification::local(
                    "Suggestion applied",
                    "The suggestion has been added to your response.".to_string(),
                )))
            }
            PreviewAction::SetResponse(text) => {
                self.response = text;
                Ok(None)
            }
            PreviewAction::SendResponse => {
                if self.response.trim().is_empty() {
                    return Ok(None);
                }
                self.response.clear();
                let recipient = ticket
                    .customer
                    .as_ref()
                    .map(|customer| customer.email.as_str())
                    .unwrap_or("the customer");
                Ok(Some(Notification::local(
                    "Response drafted",
                    format!("Your response to {recipient} was not sent."),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::sample::sample_tickets;

    fn payment_ticket() -> Ticket {
        sample_tickets().remove(0)
    }

    #[test]
    fn draft_starts_from_ticket_values() {
        let ticket = payment_ticket();
        let draft = DetailDraft::from_ticket(&ticket);
        assert_eq!(draft.status, Status::Open);
        assert_eq!(draft.priority, Priority::High);
        assert!(draft.response.is_empty());
    }

    #[test]
    fn status_change_is_labeled_local() {
        let ticket = payment_ticket();
        let mut draft = DetailDraft::from_ticket(&ticket);
        let note = draft
            .apply(&ticket, PreviewAction::ChangeStatus(Status::InProgress))
            .unwrap()
            .unwrap();
        assert_eq!(draft.status, Status::InProgress);
        assert_eq!(note.title, "Status updated");
        assert_eq!(note.description, "Ticket status changed to in progress.");
        assert!(note.local_only);
        assert_eq!(ticket.status, Some(Status::Open));
    }

    #[test]
    fn blank_response_is_not_sent() {
        let ticket = payment_ticket();
        let mut draft = DetailDraft::from_ticket(&ticket);
        draft
            .apply(&ticket, PreviewAction::SetResponse("   ".to_string()))
            .unwrap();
        assert_eq!(draft.apply(&ticket, PreviewAction::SendResponse).unwrap(), None);
    }

    #[test]
    fn suggestion_then_send_clears_response() {
        let ticket = payment_ticket();
        let mut draft = DetailDraft::from_ticket(&ticket);
        draft
            .apply(&ticket, PreviewAction::UseSuggestion(2))
            .unwrap();
        assert_eq!(draft.response, "Verify billing address matches card details");

        let note = draft
            .apply(&ticket, PreviewAction::SendResponse)
            .unwrap()
            .unwrap();
        assert!(draft.response.is_empty());
        assert!(note.description.contains("sarah.johnson@email.com"));
    }

    #[test]
    fn out_of_range_suggestion_is_rejected() {
        let ticket = payment_ticket();
        let mut draft = DetailDraft::from_ticket(&ticket);
        assert!(draft.apply(&ticket, PreviewAction::UseSuggestion(0)).is_err());
        assert!(draft.apply(&ticket, PreviewAction::UseSuggestion(4)).is_err());
    }
}
