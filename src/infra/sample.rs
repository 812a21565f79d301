use async_trait::async_trait;
use jiff::Timestamp;

use crate::domain::ticket::{Assignee, Channel, Customer, Priority, Status, Ticket};
use crate::error::AppResult;
use crate::services::TicketSource;

const AVATAR_BASE: &str = "https://images.unsplash.com";

fn avatar(photo: &str) -> Option<String> {
    Some(format!(
        "{AVATAR_BASE}/{photo}?w=32&h=32&fit=crop&crop=face"
    ))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn emma() -> Assignee {
    Assignee {
        id: "agent1".to_string(),
        name: "Emma Wilson".to_string(),
        avatar: avatar("photo-1438761681033-6461ffad8d80"),
    }
}

/// The built-in collection shown when the hosted table is unavailable.
pub fn sample_tickets() -> Vec<Ticket> {
    vec![
        Ticket {
            id: "1".to_string(),
            title: "Unable to process payment".to_string(),
            description: "Customer is getting an error when trying to complete checkout. \
                          Error message: \"Payment method declined\""
                .to_string(),
            priority: Priority::High,
            created_at: Timestamp::constant(1_705_314_600, 0),
            updated_at: Some(Timestamp::constant(1_705_314_600, 0)),
            status: Some(Status::Open),
            category: Some("billing".to_string()),
            channel: Some(Channel::Email),
            tags: strings(&["payment", "checkout", "urgent"]),
            customer: Some(Customer {
                name: "Sarah Johnson".to_string(),
                email: "sarah.johnson@email.com".to_string(),
                avatar: avatar("photo-1494790108755-2616b2df3648"),
            }),
            assignee: None,
            response_time_hours: None,
            resolution_time_hours: None,
            suggestions: strings(&[
                "Check if payment method is still valid",
                "Verify billing address matches card details",
                "Suggest alternative payment method",
            ]),
        },
        Ticket {
            id: "2".to_string(),
            title: "Feature request: Dark mode".to_string(),
            description: "Would love to have a dark mode option in the dashboard for better \
                          user experience during night time work."
                .to_string(),
            priority: Priority::Medium,
            created_at: Timestamp::constant(1_705_242_000, 0),
            updated_at: Some(Timestamp::constant(1_705_310_100, 0)),
            status: Some(Status::InProgress),
            category: Some("product".to_string()),
            channel: Some(Channel::Chat),
            tags: strings(&["enhancement", "ui"]),
            customer: Some(Customer {
                name: "Mike Chen".to_string(),
                email: "mike.chen@company.com".to_string(),
                avatar: avatar("photo-1472099645785-5658abf4ff4e"),
            }),
            assignee: Some(emma()),
            response_time_hours: None,
            resolution_time_hours: None,
            suggestions: strings(&[
                "Add to product roadmap",
                "Estimate development effort",
                "Check user demand for this feature",
            ]),
        },
        Ticket {
            id: "3".to_string(),
            title: "Login issues with SSO".to_string(),
            description: "Multiple users reporting they cannot login using single sign-on. \
                          Getting timeout errors."
                .to_string(),
            priority: Priority::Urgent,
            created_at: Timestamp::constant(1_705_308_300, 0),
            updated_at: Some(Timestamp::constant(1_705_317_600, 0)),
            status: Some(Status::Open),
            category: Some("technical".to_string()),
            channel: Some(Channel::Phone),
            tags: strings(&["sso", "authentication", "outage"]),
            customer: Some(Customer {
                name: "David Park".to_string(),
                email: "david.park@enterprise.com".to_string(),
                avatar: avatar("photo-1507003211169-0a1dd7228f2d"),
            }),
            assignee: Some(Assignee {
                id: "agent2".to_string(),
                name: "James Rodriguez".to_string(),
                avatar: avatar("photo-1500648767791-00dcc994a43e"),
            }),
            response_time_hours: None,
            resolution_time_hours: None,
            suggestions: strings(&[
                "Check SSO provider status",
                "Verify SSL certificates",
                "Test connection timeout settings",
            ]),
        },
        Ticket {
            id: "4".to_string(),
            title: "Great product, minor suggestion".to_string(),
            description: "Love the new update! Just wondering if you could add export \
                          functionality to reports."
                .to_string(),
            priority: Priority::Low,
            created_at: Timestamp::constant(1_705_163_400, 0),
            updated_at: Some(Timestamp::constant(1_705_229_100, 0)),
            status: Some(Status::Resolved),
            category: Some("feedback".to_string()),
            channel: Some(Channel::Social),
            tags: strings(&["feedback", "export", "reports"]),
            customer: Some(Customer {
                name: "Lisa Thompson".to_string(),
                email: "lisa.thompson@startup.io".to_string(),
                avatar: avatar("photo-1487412720507-e7ab37603c6f"),
            }),
            assignee: Some(emma()),
            response_time_hours: Some(2.5),
            resolution_time_hours: Some(18.25),
            suggestions: Vec::new(),
        },
    ]
}

pub struct SampleTickets;

#[async_trait]
impl TicketSource for SampleTickets {
    async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>> {
        Ok(sample_tickets())
    }

    fn describe(&self) -> String {
        "built-in sample tickets".to_string()
    }

    fn is_sample(&self) -> bool {
        true
    }
}
