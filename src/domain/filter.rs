use crate::domain::ticket::{Priority, Status, Ticket};
use crate::error::{AppError, AppResult};

/// Which ticket fields the free-text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    Title,
    TitleAndCustomer,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    /// `None` means "all".
    pub status: Option<Status>,
    /// `None` means "all".
    pub priority: Option<Priority>,
    pub query: String,
    pub scope: SearchScope,
}

impl TicketFilter {
    /// Builds a filter from raw user input, where `all` (or nothing) disables a
    /// constraint.
    pub fn from_input(
        status: Option<&str>,
        priority: Option<&str>,
        query: Option<&str>,
        scope: SearchScope,
    ) -> AppResult<Self> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(value) if value.eq_ignore_ascii_case("all") => None,
            Some(value) => Some(Status::parse(value).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "unknown status '{value}' (expected all, open, in-progress, resolved or closed)"
                ))
            })?),
        };
        let priority = match priority.map(str::trim) {
            None | Some("") => None,
            Some(value) if value.eq_ignore_ascii_case("all") => None,
            Some(value) => Some(Priority::parse(value).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "unknown priority '{value}' (expected all, low, medium, high or urgent)"
                ))
            })?),
        };

        Ok(Self {
            status,
            priority,
            query: query.unwrap_or_default().to_string(),
            scope,
        })
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(status) = self.status {
            if ticket.status != Some(status) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if ticket.priority != priority {
                return false;
            }
        }
        self.matches_query(ticket)
    }

    fn matches_query(&self, ticket: &Ticket) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        if ticket.title.to_lowercase().contains(&needle) {
            return true;
        }
        match self.scope {
            SearchScope::Title => false,
            SearchScope::TitleAndCustomer => ticket
                .customer_name()
                .is_some_and(|name| name.to_lowercase().contains(&needle)),
        }
    }

    /// Keeps the input order.
    pub fn apply<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|ticket| self.matches(ticket)).collect()
    }
}
