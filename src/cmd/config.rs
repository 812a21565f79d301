use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{
    DEFAULT_SELECT, DEFAULT_TICKETS_TABLE, DEFAULT_TIMEOUT_SECS, StoredConfig, config_file_path,
};
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring deskboard.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Leave the data source empty to run on the built-in sample tickets.");
    println!();

    apply_prompt(
        "Data source URL (e.g., https://project.supabase.co)",
        &mut cfg.data_url,
        false,
    )?;
    apply_prompt("Data source API key", &mut cfg.data_key, true)?;
    apply_prompt("Tickets table", &mut cfg.tickets_table, false)?;
    apply_prompt("Columns to select", &mut cfg.tickets_select, false)?;
    apply_prompt("Identity provider URL", &mut cfg.auth_url, false)?;
    apply_prompt("Identity provider API key", &mut cfg.auth_key, true)?;
    apply_prompt("OAuth redirect URL", &mut cfg.oauth_redirect, false)?;

    let mut fallback = cfg.fallback_to_sample.map(|value| value.to_string());
    apply_prompt("Fall back to sample tickets (true/false)", &mut fallback, false)?;
    cfg.fallback_to_sample = match fallback.as_deref().map(str::trim) {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(AppError::InvalidInput(format!(
                "expected true or false, got '{other}'"
            )));
        }
    };

    let mut timeout = cfg.request_timeout_secs.map(|value| value.to_string());
    apply_prompt("Request timeout in seconds", &mut timeout, false)?;
    cfg.request_timeout_secs = match timeout {
        None => None,
        Some(raw) => Some(raw.trim().parse().map_err(|_| {
            AppError::InvalidInput(format!("expected a number of seconds, got '{raw}'"))
        })?),
    };

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Data source URL: {}", display_value(&cfg.data_url));
    println!("Data source API key: {}", mask_secret(&cfg.data_key));
    println!(
        "Tickets table: {}",
        display_or_default(&cfg.tickets_table, DEFAULT_TICKETS_TABLE)
    );
    println!(
        "Columns: {}",
        display_or_default(&cfg.tickets_select, DEFAULT_SELECT)
    );
    println!("Identity provider URL: {}", display_value(&cfg.auth_url));
    println!("Identity provider API key: {}", mask_secret(&cfg.auth_key));
    println!("OAuth redirect URL: {}", display_value(&cfg.oauth_redirect));
    println!(
        "Fall back to sample tickets: {}",
        cfg.fallback_to_sample.unwrap_or(true)
    );
    println!(
        "Request timeout: {}s",
        cfg.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    );
    println!("Environment variables (DESKBOARD_*) override these values.");

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(PromptAction::parse(&input))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("{default} (default)"))
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret(&Some("eyJhbGciOi".to_string())), "eyJ***iOi");
        assert_eq!(mask_secret(&Some("short".to_string())), "***");
        assert_eq!(mask_secret(&None), "<not set>");
    }

    #[test]
    fn parses_prompt_answers() {
        assert_eq!(PromptAction::parse("\n"), PromptAction::Keep);
        assert_eq!(PromptAction::parse(" - \n"), PromptAction::Clear);
        assert_eq!(
            PromptAction::parse("tickets_v2\n"),
            PromptAction::Set("tickets_v2".to_string())
        );
    }

    #[test]
    fn shows_defaults_for_unset_values() {
        assert_eq!(display_or_default(&None, "tickets"), "tickets (default)");
        assert_eq!(display_value(&Some(String::new())), "<not set>");
    }
}
