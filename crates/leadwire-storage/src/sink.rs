// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook lead sink: mirrors each saved lead to an HTTP endpoint as JSON.
//!
//! Typically points at a spreadsheet bridge. The caller treats failures as
//! warnings; the primary SQLite write has already succeeded.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use leadwire_config::model::SinkConfig;
use leadwire_core::{AdapterType, HealthStatus, LeadRecord, LeadSink, LeadwireError, PluginAdapter};

/// Row layout posted to the webhook, mirroring the spreadsheet columns.
#[derive(Debug, Serialize)]
struct SinkRow<'a> {
    sender_phone: &'a str,
    chat_id: &'a str,
    name: &'a str,
    company: &'a str,
    phone: &'a str,
    task: &'a str,
    recorded_at: String,
    status: String,
}

impl<'a> From<&'a LeadRecord> for SinkRow<'a> {
    fn from(lead: &'a LeadRecord) -> Self {
        Self {
            sender_phone: &lead.sender_phone,
            chat_id: lead.chat_id.as_str(),
            name: &lead.name,
            company: &lead.company,
            phone: &lead.phone,
            task: &lead.task,
            recorded_at: lead.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: lead.status.to_string(),
        }
    }
}

/// POSTs each lead to a configured URL.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: String, timeout: Duration) -> Result<Self, LeadwireError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeadwireError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url })
    }

    /// Builds a sink from config, or `None` when no webhook is configured.
    pub fn from_config(config: &SinkConfig) -> Result<Option<Self>, LeadwireError> {
        config
            .webhook_url
            .as_ref()
            .map(|url| Self::new(url.clone(), Duration::from_secs(config.timeout_secs)))
            .transpose()
    }
}

#[async_trait]
impl PluginAdapter for WebhookSink {
    fn name(&self) -> &str {
        "webhook-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadwireError> {
        Ok(())
    }
}

#[async_trait]
impl LeadSink for WebhookSink {
    async fn forward(&self, lead: &LeadRecord) -> Result<(), LeadwireError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SinkRow::from(lead))
            .send()
            .await
            .map_err(|e| LeadwireError::Internal(format!("lead sink request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LeadwireError::Internal(format!(
                "lead sink returned {status}: {body}"
            )));
        }
        debug!(chat_id = %lead.chat_id, "lead forwarded to webhook sink");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leadwire_core::{ChatId, LeadStatus};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lead() -> LeadRecord {
        LeadRecord {
            chat_id: ChatId::from("77012223344@c.us"),
            sender_phone: "77012223344".into(),
            name: "Aliya".into(),
            company: "n/a".into(),
            phone: "+7 701 222 33 44".into(),
            task: "Booking bot".into(),
            recorded_at: Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
            status: LeadStatus::New,
        }
    }

    #[tokio::test]
    async fn forward_posts_lead_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({
                "name": "Aliya",
                "sender_phone": "77012223344",
                "recorded_at": "2026-05-04 09:30:00",
                "status": "new"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.uri()), Duration::from_secs(5)).unwrap();
        sink.forward(&lead()).await.unwrap();
    }

    #[tokio::test]
    async fn forward_reports_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("sheet locked"))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = sink.forward(&lead()).await.unwrap_err().to_string();
        assert!(err.contains("500"), "got: {err}");
        assert!(err.contains("sheet locked"), "got: {err}");
    }

    #[test]
    fn from_config_without_url_is_none() {
        let config = SinkConfig::default();
        assert!(WebhookSink::from_config(&config).unwrap().is_none());
    }
}
