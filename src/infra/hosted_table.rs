use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use crate::domain::ticket::{Assignee, Channel, Customer, Priority, Status, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::TicketSource;

type Row = Map<String, Value>;

/// Reads tickets from a hosted table exposed through a PostgREST-style API
/// (`GET /rest/v1/<table>?select=...`). Read only.
pub struct HostedTableClient {
    http: Client,
    base_url: Option<String>,
    api_key: Option<SecretString>,
    table: String,
    select: String,
}

impl HostedTableClient {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<SecretString>,
        table: String,
        select: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url,
            api_key,
            table,
            select,
        })
    }

    fn api_details(&self) -> AppResult<(&str, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::Configuration("data source URL not configured".to_string()))?;
        let api_key = self
            .api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| AppError::Configuration("data source key not configured".to_string()))?;
        Ok((base_url, api_key))
    }

    fn table_endpoint(base_url: &str, table: &str) -> String {
        format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table)
    }
}

#[async_trait]
impl TicketSource for HostedTableClient {
    async fn fetch_tickets(&self) -> AppResult<Vec<Ticket>> {
        let (base_url, api_key) = self.api_details()?;
        let endpoint = Self::table_endpoint(base_url, &self.table);
        tracing::debug!(%endpoint, select = %self.select, "querying ticket table");

        let response = self
            .http
            .get(&endpoint)
            .query(&[("select", self.select.as_str())])
            .header("apikey", api_key)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::DataSource(format!("failed to query tickets: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::DataSource(format!(
                "ticket table responded with {status}: {body}"
            )));
        }

        let rows: Vec<Row> = response
            .json()
            .await
            .map_err(|err| AppError::DataSource(format!("failed to parse ticket rows: {err}")))?;

        let mut tickets = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match ticket_from_row(row) {
                Ok(ticket) => tickets.push(ticket),
                Err(reason) => tracing::warn!(row = index, "skipping ticket row: {reason}"),
            }
        }
        Ok(tickets)
    }

    fn describe(&self) -> String {
        match &self.base_url {
            Some(url) => format!("table '{}' at {}", self.table, url.trim_end_matches('/')),
            None => format!("table '{}' (no URL configured)", self.table),
        }
    }
}

/// Column names are matched ignoring case and underscores, so `created_at`,
/// `createdAt` and `CREATEDAT` all resolve to the same field.
fn field<'a>(row: &'a Row, names: &[&str]) -> Option<&'a Value> {
    row.iter()
        .find(|(key, value)| {
            let normalized = key.replace('_', "").to_lowercase();
            !value.is_null() && names.iter().any(|name| normalized == *name)
        })
        .map(|(_, value)| value)
}

fn text(row: &Row, names: &[&str]) -> Option<String> {
    match field(row, names)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn number(row: &Row, names: &[&str]) -> Option<f64> {
    match field(row, names)? {
        Value::Number(value) => value.as_f64(),
        Value::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(row: &Row, names: &[&str]) -> Vec<String> {
    match field(row, names) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn timestamp(row: &Row, names: &[&str]) -> Result<Option<Timestamp>, String> {
    match text(row, names) {
        Some(raw) => raw
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|err| format!("invalid timestamp '{raw}': {err}")),
        None => Ok(None),
    }
}

fn customer(row: &Row) -> Option<Customer> {
    if let Some(Value::Object(nested)) = field(row, &["customer"]) {
        return Some(Customer {
            name: text(nested, &["name"])?,
            email: text(nested, &["email"]).unwrap_or_default(),
            avatar: text(nested, &["avatar"]),
        });
    }
    Some(Customer {
        name: text(row, &["customername"])?,
        email: text(row, &["customeremail"]).unwrap_or_default(),
        avatar: None,
    })
}

fn assignee(row: &Row) -> Option<Assignee> {
    let Some(Value::Object(nested)) = field(row, &["assignee"]) else {
        return None;
    };
    Some(Assignee {
        id: text(nested, &["id"])?,
        name: text(nested, &["name"])?,
        avatar: text(nested, &["avatar"]),
    })
}

fn ticket_from_row(row: &Row) -> Result<Ticket, String> {
    let id = text(row, &["id"]).ok_or("missing id")?;
    let title = text(row, &["summary", "title"]).ok_or_else(|| format!("ticket {id}: missing summary"))?;
    let raw_priority = text(row, &["priority"]).ok_or_else(|| format!("ticket {id}: missing priority"))?;
    let priority = Priority::parse(&raw_priority)
        .ok_or_else(|| format!("ticket {id}: unknown priority '{raw_priority}'"))?;
    let created_at = timestamp(row, &["createdat"])?
        .ok_or_else(|| format!("ticket {id}: missing creation timestamp"))?;

    let status = match text(row, &["status"]) {
        Some(raw) => Some(
            Status::parse(&raw).ok_or_else(|| format!("ticket {id}: unknown status '{raw}'"))?,
        ),
        None => None,
    };

    let mut ticket = Ticket::new(id, title, priority, created_at);
    ticket.description = text(row, &["description"]).unwrap_or_default();
    ticket.updated_at = timestamp(row, &["updatedat"])?;
    ticket.status = status;
    ticket.category = text(row, &["category"]);
    ticket.channel = text(row, &["channel"]).and_then(|raw| Channel::parse(&raw));
    ticket.tags = string_list(row, &["tags"]);
    ticket.customer = customer(row);
    ticket.assignee = assignee(row);
    ticket.response_time_hours = number(row, &["responsetime", "responsetimehours"]);
    ticket.resolution_time_hours = number(row, &["resolutiontime", "resolutiontimehours"]);
    ticket.suggestions = string_list(row, &["suggestions", "aisuggestions"]);
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(base_url: Option<String>, key: Option<&str>) -> HostedTableClient {
        HostedTableClient::new(
            base_url,
            key.map(|k| SecretString::from(k.to_string())),
            "tickets".to_string(),
            "id,created_at,priority,summary".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn converts_minimal_row() {
        let ticket = ticket_from_row(&row(json!({
            "id": 7,
            "created_at": "2024-01-15T10:30:00Z",
            "priority": "high",
            "summary": "Printer on fire"
        })))
        .unwrap();
        assert_eq!(ticket.id, "7");
        assert_eq!(ticket.title, "Printer on fire");
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.status, None);
        assert!(ticket.customer.is_none());
    }

    #[test]
    fn converts_uppercase_column_variant() {
        let ticket = ticket_from_row(&row(json!({
            "ID": "T-1",
            "CREATEDAT": "2024-01-15T10:30:00Z",
            "PRIORITY": "URGENT",
            "SUMMARY": "Outage"
        })))
        .unwrap();
        assert_eq!(ticket.id, "T-1");
        assert_eq!(ticket.priority, Priority::Urgent);
        assert_eq!(ticket.created_at.to_string(), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn converts_rich_row() {
        let ticket = ticket_from_row(&row(json!({
            "id": "9",
            "title": "Refund",
            "description": "Wants money back",
            "priority": "low",
            "status": "in-progress",
            "createdAt": "2024-01-15T10:30:00Z",
            "channel": "chat",
            "tags": ["refund", 3],
            "customer": {"name": "Ana", "email": "ana@example.com"},
            "assignee": {"id": "agent1", "name": "Emma Wilson"},
            "response_time": "1.5",
            "aiSuggestions": ["Offer store credit"]
        })))
        .unwrap();
        assert_eq!(ticket.status, Some(Status::InProgress));
        assert_eq!(ticket.channel, Some(Channel::Chat));
        assert_eq!(ticket.tags, vec!["refund".to_string()]);
        assert_eq!(ticket.customer_name(), Some("Ana"));
        assert_eq!(ticket.assignee.map(|a| a.name).as_deref(), Some("Emma Wilson"));
        assert_eq!(ticket.response_time_hours, Some(1.5));
        assert_eq!(ticket.suggestions.len(), 1);
    }

    #[test]
    fn rejects_rows_outside_the_enumerations() {
        let err = ticket_from_row(&row(json!({
            "id": "1",
            "created_at": "2024-01-15T10:30:00Z",
            "priority": "p0",
            "summary": "x"
        })))
        .unwrap_err();
        assert!(err.contains("unknown priority"));

        assert!(
            ticket_from_row(&row(json!({
                "id": "1",
                "created_at": "yesterday",
                "priority": "low",
                "summary": "x"
            })))
            .is_err()
        );
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let err = client(None, Some("key")).fetch_tickets().await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        let err = client(Some("http://localhost".to_string()), None)
            .fetch_tickets()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn queries_table_with_key_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/tickets")
                    .query_param("select", "id,created_at,priority,summary")
                    .header("apikey", "anon-key")
                    .header("authorization", "Bearer anon-key");
                then.status(200).json_body(json!([
                    {"id": 1, "created_at": "2024-01-15T10:30:00Z", "priority": "high", "summary": "A"},
                    {"id": 2, "created_at": "2024-01-15T11:30:00Z", "priority": "bogus", "summary": "B"},
                    {"id": 3, "created_at": "2024-01-15T12:30:00Z", "priority": "low", "summary": "C"}
                ]));
            })
            .await;

        let tickets = client(Some(server.base_url()), Some("anon-key"))
            .fetch_tickets()
            .await
            .unwrap();

        mock.assert_async().await;
        let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn surfaces_http_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/tickets");
                then.status(401).body("invalid api key");
            })
            .await;

        let err = client(Some(server.base_url()), Some("bad"))
            .fetch_tickets()
            .await
            .unwrap_err();
        match err {
            AppError::DataSource(message) => assert!(message.contains("401")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
