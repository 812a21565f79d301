use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_ENV: &str = "DESKBOARD_CONFIG_DIR";

pub const DEFAULT_TICKETS_TABLE: &str = "tickets";
pub const DEFAULT_SELECT: &str = "id,created_at,priority,summary";
/// Non-production key used when no identity key is configured.
pub const DEFAULT_AUTH_KEY: &str = "pk_test_deskboard_preview";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings resolved from the stored config file and the environment.
/// Environment variables win.
#[derive(Debug)]
pub struct AppConfig {
    pub data_url: Option<String>,
    pub data_key: Option<SecretString>,
    pub tickets_table: String,
    pub tickets_select: String,
    pub auth_url: Option<String>,
    pub auth_key: SecretString,
    pub oauth_redirect: Option<String>,
    pub fallback_to_sample: bool,
    pub request_timeout: Duration,
    pub state_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let state_dir = config_directory()?;
        let stored = StoredConfig::load_from(&state_dir.join(CONFIG_FILE_NAME))?;
        Self::resolve(stored, state_dir, |key| env::var(key).ok())
    }

    pub fn resolve(
        stored: StoredConfig,
        state_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let fallback_to_sample = match var("DESKBOARD_NO_FALLBACK") {
            Some(value) => !parse_flag(&value)?,
            None => stored.fallback_to_sample.unwrap_or(true),
        };

        let timeout_secs = match var("DESKBOARD_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                AppError::Configuration(format!(
                    "DESKBOARD_TIMEOUT_SECS must be a number of seconds, got '{value}'"
                ))
            })?,
            None => stored.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            data_url: var("DESKBOARD_DATA_URL").or(non_empty(stored.data_url)),
            data_key: var("DESKBOARD_DATA_KEY")
                .or(non_empty(stored.data_key))
                .map(SecretString::from),
            tickets_table: var("DESKBOARD_TICKETS_TABLE")
                .or(non_empty(stored.tickets_table))
                .unwrap_or_else(|| DEFAULT_TICKETS_TABLE.to_string()),
            tickets_select: var("DESKBOARD_SELECT")
                .or(non_empty(stored.tickets_select))
                .unwrap_or_else(|| DEFAULT_SELECT.to_string()),
            auth_url: var("DESKBOARD_AUTH_URL").or(non_empty(stored.auth_url)),
            auth_key: SecretString::from(
                var("DESKBOARD_AUTH_KEY")
                    .or(non_empty(stored.auth_key))
                    .unwrap_or_else(|| DEFAULT_AUTH_KEY.to_string()),
            ),
            oauth_redirect: var("DESKBOARD_OAUTH_REDIRECT").or(non_empty(stored.oauth_redirect)),
            fallback_to_sample,
            request_timeout: Duration::from_secs(timeout_secs.max(1)),
            state_dir,
        })
    }

    pub fn has_data_source(&self) -> bool {
        self.data_url.is_some() && self.data_key.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: &str) -> AppResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Configuration(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}

/// The on-disk configuration written by `deskboard config init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets_select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_to_sample: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("dev", "deskboard", "deskboard")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            AppError::Configuration("could not determine a configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
