use std::collections::BTreeMap;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::Serialize;

use crate::domain::ticket::{Priority, Ticket};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: Date,
    pub tickets: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_response_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total: usize,
    pub open: usize,
    pub resolved: usize,
    pub resolution_rate: u32,
    pub avg_response_hours: Option<f64>,
    pub avg_resolution_hours: Option<f64>,
    pub by_category: Vec<Share>,
    pub by_channel: Vec<Share>,
    /// Active tickets only, most severe first.
    pub open_by_priority: Vec<Share>,
    pub daily: Vec<DailyPoint>,
}

impl AnalyticsReport {
    pub fn compute(tickets: &[Ticket]) -> Self {
        let total = tickets.len();
        let open = tickets
            .iter()
            .filter(|t| t.status.is_some_and(|s| s.is_active()))
            .count();
        let resolved = tickets
            .iter()
            .filter(|t| t.status.is_some_and(|s| !s.is_active()))
            .count();

        let by_category = shares(
            tickets.iter().filter_map(|t| t.category.as_deref()),
            total,
        );
        let by_channel = shares(tickets.iter().filter_map(|t| t.channel.map(|c| c.as_str())), total);

        let active: Vec<&Ticket> = tickets
            .iter()
            .filter(|t| t.status.is_some_and(|s| s.is_active()))
            .collect();
        let open_by_priority = Priority::ALL
            .iter()
            .rev()
            .map(|priority| {
                let count = active.iter().filter(|t| t.priority == *priority).count();
                Share {
                    label: capitalize(priority.as_str()),
                    count,
                    percent: percent(count, active.len()),
                }
            })
            .collect();

        Self {
            total,
            open,
            resolved,
            resolution_rate: percent(resolved, total),
            avg_response_hours: average(tickets.iter().filter_map(|t| t.response_time_hours)),
            avg_resolution_hours: average(tickets.iter().filter_map(|t| t.resolution_time_hours)),
            by_category,
            by_channel,
            open_by_priority,
            daily: daily_points(tickets),
        }
    }
}

fn shares<'a>(labels: impl Iterator<Item = &'a str>, total: usize) -> Vec<Share> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label.to_lowercase()).or_default() += 1;
    }
    let mut result: Vec<Share> = counts
        .into_iter()
        .map(|(label, count)| Share {
            label: capitalize(&label),
            count,
            percent: percent(count, total),
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    result
}

fn daily_points(tickets: &[Ticket]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<Date, (usize, Vec<f64>)> = BTreeMap::new();
    for ticket in tickets {
        let date = ticket.created_at.to_zoned(TimeZone::UTC).date();
        let entry = days.entry(date).or_default();
        entry.0 += 1;
        if let Some(hours) = ticket.response_time_hours {
            entry.1.push(hours);
        }
    }
    days.into_iter()
        .map(|(date, (tickets, responses))| DailyPoint {
            date,
            tickets,
            avg_response_hours: average(responses.into_iter()),
        })
        .collect()
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `1247` renders as `1.2K`; anything below a thousand is printed as is.
pub fn compact_number(value: usize) -> String {
    if value >= 1000 {
        format!("{:.1}K", value as f64 / 1000.0)
    } else {
        value.to_string()
    }
}
