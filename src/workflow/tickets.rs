use std::fmt;

use crate::context::AppContext;
use crate::domain::ticket::Ticket;
use crate::error::AppError;
use crate::infra::sample::sample_tickets;
use crate::services::TicketSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredentials(String),
    QueryFailed(String),
    EmptyResult,
    Requested,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredentials(detail) => {
                write!(f, "data source not configured ({detail})")
            }
            FallbackReason::QueryFailed(detail) => write!(f, "query failed ({detail})"),
            FallbackReason::EmptyResult => f.write_str("data source returned no tickets"),
            FallbackReason::Requested => f.write_str("sample set requested"),
        }
    }
}

/// Outcome of reading tickets, so callers can tell live data from the
/// sample set.
#[derive(Debug)]
pub enum TicketLoad {
    Live(Vec<Ticket>),
    Fallback {
        tickets: Vec<Ticket>,
        reason: FallbackReason,
    },
    Failed(AppError),
}

impl TicketLoad {
    pub fn tickets(&self) -> &[Ticket] {
        match self {
            TicketLoad::Live(tickets) | TicketLoad::Fallback { tickets, .. } => tickets,
            TicketLoad::Failed(_) => &[],
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            TicketLoad::Fallback { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn origin(&self) -> &'static str {
        match self {
            TicketLoad::Live(_) => "live",
            TicketLoad::Fallback { .. } => "sample",
            TicketLoad::Failed(_) => "unavailable",
        }
    }
}

pub async fn load_tickets(source: &dyn TicketSource, fallback_to_sample: bool) -> TicketLoad {
    if source.is_sample() {
        return TicketLoad::Fallback {
            tickets: sample_tickets(),
            reason: FallbackReason::Requested,
        };
    }

    let reason = match source.fetch_tickets().await {
        Ok(tickets) if !tickets.is_empty() => {
            tracing::debug!(count = tickets.len(), source = %source.describe(), "loaded tickets");
            return TicketLoad::Live(tickets);
        }
        Ok(_) => FallbackReason::EmptyResult,
        Err(AppError::Configuration(detail)) => FallbackReason::MissingCredentials(detail),
        Err(err) => FallbackReason::QueryFailed(err.to_string()),
    };

    if !fallback_to_sample {
        tracing::warn!(source = %source.describe(), "ticket load failed: {reason}");
        return TicketLoad::Failed(AppError::DataSource(reason.to_string()));
    }

    tracing::warn!(source = %source.describe(), "using sample tickets: {reason}");
    TicketLoad::Fallback {
        tickets: sample_tickets(),
        reason,
    }
}

/// View state around a ticket load: `loading` while the fetch is pending and
/// an `error` only when no data could be shown at all.
#[derive(Debug)]
pub struct TicketView {
    pub loading: bool,
    pub error: Option<String>,
    pub load: Option<TicketLoad>,
}

impl TicketView {
    pub fn pending() -> Self {
        Self {
            loading: true,
            error: None,
            load: None,
        }
    }

    pub fn finish(&mut self, load: TicketLoad) {
        self.loading = false;
        self.error = match &load {
            TicketLoad::Failed(err) => Some(err.to_string()),
            _ => None,
        };
        self.load = Some(load);
    }

    pub async fn fetch(ctx: &AppContext) -> Self {
        let mut view = Self::pending();
        let load = load_tickets(ctx.tickets.as_ref(), ctx.config.fallback_to_sample).await;
        view.finish(load);
        view
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::ticket::Priority;
    use crate::error::AppResult;
    use crate::infra::sample::SampleTickets;

    enum FakeSource {
        Rows(Vec<Ticket>),
        Unconfigured,
        Broken,
    }

    #[async_trait]
    impl TicketSource for FakeSource {
        async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>> {
            match self {
                FakeSource::Rows(rows) => Ok(rows.clone()),
                FakeSource::Unconfigured => Err(AppError::Configuration(
                    "data source URL not configured".to_string(),
                )),
                FakeSource::Broken => Err(AppError::DataSource("connection refused".to_string())),
            }
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn live_ticket() -> Ticket {
        Ticket::new(
            "live-1",
            "From the table",
            Priority::Low,
            "2024-02-01T00:00:00Z".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn live_rows_are_returned_as_is() {
        let load = load_tickets(&FakeSource::Rows(vec![live_ticket()]), true).await;
        assert!(matches!(load, TicketLoad::Live(_)));
        assert_eq!(load.tickets()[0].id, "live-1");
        assert_eq!(load.origin(), "live");
    }

    #[tokio::test]
    async fn failures_fall_back_to_sample_set() {
        let load = load_tickets(&FakeSource::Broken, true).await;
        assert_eq!(load.tickets(), sample_tickets().as_slice());
        assert!(matches!(
            load.fallback_reason(),
            Some(FallbackReason::QueryFailed(detail)) if detail.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn distinguishes_fallback_reasons() {
        let missing = load_tickets(&FakeSource::Unconfigured, true).await;
        assert!(matches!(
            missing.fallback_reason(),
            Some(FallbackReason::MissingCredentials(_))
        ));

        let empty = load_tickets(&FakeSource::Rows(Vec::new()), true).await;
        assert_eq!(empty.fallback_reason(), Some(&FallbackReason::EmptyResult));
        assert_eq!(empty.tickets().len(), 4);
    }

    #[tokio::test]
    async fn sample_source_is_never_live() {
        let load = load_tickets(&SampleTickets, false).await;
        assert_eq!(load.fallback_reason(), Some(&FallbackReason::Requested));
        assert_eq!(load.origin(), "sample");
    }

    #[tokio::test]
    async fn disabled_fallback_reports_failure() {
        let load = load_tickets(&FakeSource::Rows(Vec::new()), false).await;
        assert!(matches!(load, TicketLoad::Failed(AppError::DataSource(_))));
        assert!(load.tickets().is_empty());
    }

    #[tokio::test]
    async fn view_flags_after_fallback() {
        let mut view = TicketView::pending();
        assert!(view.loading);
        view.finish(load_tickets(&FakeSource::Broken, true).await);
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.load.as_ref().map(|load| load.tickets().len()), Some(4));
    }

    #[tokio::test]
    async fn view_flags_after_failure() {
        let mut view = TicketView::pending();
        view.finish(load_tickets(&FakeSource::Broken, false).await);
        assert!(!view.loading);
        assert!(view.error.as_deref().is_some_and(|e| e.contains("connection refused")));
    }
}
