use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::ticket::{Priority, Status, Ticket};

/// Summary card values for the dashboard. Computed from the unfiltered
/// collection on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketStats {
    pub total: usize,
    pub by_status: BTreeMap<Status, usize>,
    /// Tickets that carry no status at all.
    pub unspecified_status: usize,
    pub by_priority: BTreeMap<Priority, usize>,
}

impl TicketStats {
    pub fn compute(tickets: &[Ticket]) -> Self {
        let mut by_status: BTreeMap<Status, usize> =
            Status::ALL.iter().map(|status| (*status, 0)).collect();
        let mut by_priority: BTreeMap<Priority, usize> =
            Priority::ALL.iter().map(|priority| (*priority, 0)).collect();
        let mut unspecified_status = 0;

        for ticket in tickets {
            match ticket.status {
                Some(status) => *by_status.entry(status).or_default() += 1,
                None => unspecified_status += 1,
            }
            *by_priority.entry(ticket.priority).or_default() += 1;
        }

        Self {
            total: tickets.len(),
            by_status,
            unspecified_status,
            by_priority,
        }
    }

    pub fn status(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or_default()
    }

    pub fn priority(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or_default()
    }

    /// The five dashboard cards, in display order.
    pub fn cards(&self) -> [(&'static str, usize); 5] {
        [
            ("Total Tickets", self.total),
            ("Open", self.status(Status::Open)),
            ("In Progress", self.status(Status::InProgress)),
            ("Resolved", self.status(Status::Resolved)),
            ("Urgent", self.priority(Priority::Urgent)),
        ]
    }
}
