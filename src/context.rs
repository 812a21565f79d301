use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::infra::hosted_auth::HostedAuthClient;
use crate::infra::hosted_table::HostedTableClient;
use crate::infra::preview_auth::PreviewIdentity;
use crate::infra::sample::SampleTickets;
use crate::services::{IdentityProvider, TicketSource};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub tickets: Arc<dyn TicketSource>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        tickets: Arc<dyn TicketSource>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tickets,
            identity,
        }
    }

    /// Wires the hosted clients described by `config`. A missing data URL
    /// still yields a table client; its fetch fails with a configuration error
    /// and the loader decides whether to fall back. `sample` skips the table
    /// entirely.
    pub fn from_config(config: AppConfig, sample: bool) -> AppResult<Self> {
        let tickets: Arc<dyn TicketSource> = if sample {
            Arc::new(SampleTickets)
        } else {
            Arc::new(HostedTableClient::new(
                config.data_url.clone(),
                config
                    .data_key
                    .as_ref()
                    .map(|key| SecretString::from(key.expose_secret().to_string())),
                config.tickets_table.clone(),
                config.tickets_select.clone(),
                config.request_timeout,
            )?)
        };

        let auth_key = SecretString::from(config.auth_key.expose_secret().to_string());
        let identity: Arc<dyn IdentityProvider> = match &config.auth_url {
            Some(url) => Arc::new(HostedAuthClient::new(
                url.clone(),
                auth_key,
                config.request_timeout,
            )?),
            None => {
                tracing::debug!("no identity provider configured, using local preview sign-in");
                Arc::new(PreviewIdentity::new(auth_key))
            }
        };

        Ok(Self::new(config, tickets, identity))
    }
}
