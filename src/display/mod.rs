pub mod analytics;
pub mod dashboard;
pub mod detail;

use jiff::Timestamp;
use owo_colors::OwoColorize;

use crate::domain::preview::Notification;
use crate::domain::ticket::{Channel, Priority, Status};
use crate::workflow::tickets::TicketLoad;

pub fn priority_badge(priority: Priority) -> String {
    let label = format!("[{priority}]");
    match priority {
        Priority::Low => label.blue().to_string(),
        Priority::Medium => label.yellow().to_string(),
        Priority::High => label.bright_red().to_string(),
        Priority::Urgent => label.red().bold().to_string(),
    }
}

pub fn status_badge(status: Option<Status>) -> String {
    let Some(status) = status else {
        return "[no status]".dimmed().to_string();
    };
    let label = format!("[{}]", status.label());
    match status {
        Status::Open => label.blue().to_string(),
        Status::InProgress => label.yellow().to_string(),
        Status::Resolved => label.green().to_string(),
        Status::Closed => label.dimmed().to_string(),
    }
}

pub fn channel_label(channel: Option<Channel>) -> &'static str {
    match channel {
        Some(Channel::Email) => "email",
        Some(Channel::Chat) => "chat",
        Some(Channel::Phone) => "phone",
        Some(Channel::Social) => "social",
        Some(Channel::Form) => "form",
        None => "-",
    }
}

/// `Just now`, `5h ago` or `3d ago`, counted in whole hours.
pub fn time_ago(then: Timestamp, now: Timestamp) -> String {
    let hours = now.duration_since(then).as_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

pub fn format_datetime(timestamp: Timestamp) -> String {
    timestamp.strftime("%Y-%m-%d %H:%M UTC").to_string()
}

/// Names the fallback reason when the sample set is shown. A failed load
/// never reaches rendering; it exits through the command's error instead.
pub fn load_banner(load: &TicketLoad) -> Option<String> {
    load.fallback_reason().map(|reason| {
        format!("Showing sample tickets: {reason}")
            .yellow()
            .to_string()
    })
}

pub fn notification_line(notification: &Notification) -> String {
    let tag = if notification.local_only {
        "[preview, not saved] ".dimmed().to_string()
    } else {
        String::new()
    };
    format!(
        "{tag}{}: {}",
        notification.title.bold(),
        notification.description
    )
}

pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round().max(1.0) as usize;
    "█".repeat(filled.min(width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> Timestamp {
        value.parse().unwrap()
    }

    #[test]
    fn formats_relative_time() {
        let now = ts("2024-01-16T10:30:00Z");
        assert_eq!(time_ago(ts("2024-01-16T10:00:00Z"), now), "Just now");
        assert_eq!(time_ago(ts("2024-01-16T05:29:00Z"), now), "5h ago");
        assert_eq!(time_ago(ts("2024-01-13T10:30:00Z"), now), "3d ago");
        assert_eq!(time_ago(ts("2024-01-17T10:30:00Z"), now), "Just now");
    }

    #[test]
    fn formats_absolute_time() {
        assert_eq!(
            format_datetime(ts("2024-01-15T10:30:00Z")),
            "2024-01-15 10:30 UTC"
        );
    }

    #[test]
    fn banner_only_for_sample_tickets() {
        use crate::infra::sample::sample_tickets;
        use crate::workflow::tickets::FallbackReason;

        assert!(load_banner(&TicketLoad::Live(sample_tickets())).is_none());
        let banner = load_banner(&TicketLoad::Fallback {
            tickets: sample_tickets(),
            reason: FallbackReason::EmptyResult,
        })
        .unwrap();
        assert!(banner.contains("data source returned no tickets"));
    }

    #[test]
    fn bars_scale_to_width() {
        assert_eq!(bar(5.0, 10.0, 10).chars().count(), 5);
        assert_eq!(bar(10.0, 10.0, 10).chars().count(), 10);
        assert_eq!(bar(0.1, 10.0, 10).chars().count(), 1);
        assert_eq!(bar(0.0, 10.0, 10), "");
    }
}
