// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Green-API WhatsApp relay adapter for the Leadwire chat front-end.
//!
//! [`GreenApiRelay`] is both the [`NotificationSource`] the intake loop
//! polls and the [`OutboundChannel`] the dialogue replies through.

pub mod client;
pub mod payload;

use std::time::Duration;

use async_trait::async_trait;
use leadwire_config::model::LeadwireConfig;
use leadwire_core::{
    AdapterType, Button, ChatId, HealthStatus, LeadwireError, Notification, NotificationSource,
    OutboundChannel, PluginAdapter, ReceiptId,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::client::{GreenApiClient, Timeouts};
use crate::payload::{
    ButtonPayload, SendFileByUrl, SendInteractiveButtons, SendMessage, Settings,
};

/// Header of interactive messages. The relay rejects an empty header.
const INTERACTIVE_HEADER: &str = " ";

/// Relay adapter bound to one Green-API instance.
pub struct GreenApiRelay {
    client: GreenApiClient,
    footer: String,
    configure_webhooks: bool,
}

impl GreenApiRelay {
    /// Creates the relay from the `[relay]` section; the brand name becomes
    /// the footer of interactive messages.
    ///
    /// # Credential Resolution
    /// 1. `relay.instance_id` / `relay.api_token` if set
    /// 2. `GREEN_API_INSTANCE_ID` / `GREEN_API_TOKEN` environment variables
    /// 3. Returns error if neither is available
    pub fn new(config: &LeadwireConfig) -> Result<Self, LeadwireError> {
        let relay = &config.relay;
        let instance_id = resolve_credential(
            &relay.instance_id,
            "GREEN_API_INSTANCE_ID",
            "relay.instance_id",
        )?;
        let token = resolve_credential(&relay.api_token, "GREEN_API_TOKEN", "relay.api_token")?;

        let client = GreenApiClient::new(
            &relay.api_url,
            &instance_id,
            SecretString::from(token),
            Timeouts {
                receive: Duration::from_secs(relay.receive_timeout_secs),
                send: Duration::from_secs(relay.send_timeout_secs),
                file: Duration::from_secs(relay.file_timeout_secs),
            },
        )?;

        info!(instance_id, "Green-API relay initialized");

        Ok(Self {
            client,
            footer: config.brand.name.clone(),
            configure_webhooks: relay.configure_webhooks,
        })
    }

    /// Enables incoming-message webhooks on the instance.
    ///
    /// Best-effort: a failure is logged and the relay stays usable.
    pub async fn connect(&self) {
        if !self.configure_webhooks {
            debug!("skipping relay webhook settings");
            return;
        }
        match self.client.set_settings(&Settings::incoming_enabled()).await {
            Ok(()) => info!("relay webhook settings applied"),
            Err(e) => warn!(error = %e, "failed to apply relay webhook settings"),
        }
    }

    #[cfg(test)]
    fn with_client(client: GreenApiClient, footer: &str) -> Self {
        Self {
            client,
            footer: footer.to_string(),
            configure_webhooks: true,
        }
    }
}

#[async_trait]
impl PluginAdapter for GreenApiRelay {
    fn name(&self) -> &str {
        "green-api"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Relay
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
        match self.client.state_instance().await {
            Ok(state) if state == "authorized" => Ok(HealthStatus::Healthy),
            Ok(state) => Ok(HealthStatus::Degraded(format!("instance state: {state}"))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), LeadwireError> {
        debug!("Green-API relay shutting down");
        Ok(())
    }
}

#[async_trait]
impl NotificationSource for GreenApiRelay {
    async fn poll(&self) -> Result<Option<Notification>, LeadwireError> {
        let raw = self.client.receive_notification().await?;
        Ok(raw.map(payload::decode_notification))
    }

    async fn acknowledge(&self, receipt: ReceiptId) -> Result<(), LeadwireError> {
        self.client.delete_notification(receipt).await
    }
}

#[async_trait]
impl OutboundChannel for GreenApiRelay {
    async fn send_text(&self, chat: &ChatId, text: &str) -> Result<(), LeadwireError> {
        self.client
            .send_message(&SendMessage {
                chat_id: chat.as_str(),
                message: text,
            })
            .await
    }

    async fn send_interactive(
        &self,
        chat: &ChatId,
        body: &str,
        buttons: &[Button],
    ) -> Result<(), LeadwireError> {
        self.client
            .send_interactive_buttons(&SendInteractiveButtons {
                chat_id: chat.as_str(),
                header: INTERACTIVE_HEADER,
                body,
                footer: &self.footer,
                buttons: buttons.iter().map(ButtonPayload::from).collect(),
            })
            .await
    }

    async fn send_file_by_url(
        &self,
        chat: &ChatId,
        url: &str,
        file_name: &str,
        caption: &str,
    ) -> Result<(), LeadwireError> {
        self.client
            .send_file_by_url(&SendFileByUrl {
                chat_id: chat.as_str(),
                url_file: url,
                file_name,
                caption,
            })
            .await
    }
}

/// Resolves a credential from config or environment.
fn resolve_credential(
    configured: &Option<String>,
    env_var: &str,
    key: &str,
) -> Result<String, LeadwireError> {
    if let Some(value) = configured
        && !value.is_empty()
    {
        return Ok(value.clone());
    }

    std::env::var(env_var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            LeadwireError::Config(format!(
                "Green-API credential not found. Set {key} in config or {env_var} environment variable."
            ))
        })
}
