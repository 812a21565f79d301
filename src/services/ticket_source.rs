use async_trait::async_trait;

use crate::domain::ticket::Ticket;
use crate::error::AppResult;

#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>>;

    /// Short label for logs and view headers.
    fn describe(&self) -> String;

    /// True for the built-in sample set, so its rows are never reported as
    /// live data.
    fn is_sample(&self) -> bool {
        false
    }
}
