// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Green-API instance endpoints.
//!
//! Every call is `{api_url}/waInstance{id}/{method}/{token}` with its own
//! timeout. Calls are not retried; the caller decides what a failure means.

use std::time::Duration;

use leadwire_core::{LeadwireError, ReceiptId};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::payload::{InstanceState, RawNotification, Settings};

/// Per-call timeouts.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub receive: Duration,
    pub send: Duration,
    pub file: Duration,
}

/// HTTP client bound to one relay instance.
#[derive(Debug, Clone)]
pub struct GreenApiClient {
    client: reqwest::Client,
    instance_url: String,
    token: SecretString,
    timeouts: Timeouts,
}

impl GreenApiClient {
    pub fn new(
        api_url: &str,
        instance_id: &str,
        token: SecretString,
        timeouts: Timeouts,
    ) -> Result<Self, LeadwireError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LeadwireError::Relay {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            instance_url: format!("{}/waInstance{instance_id}", api_url.trim_end_matches('/')),
            token,
            timeouts,
        })
    }

    fn request(&self, method: Method, api_method: &str, suffix: Option<String>) -> RequestBuilder {
        let mut url = format!(
            "{}/{api_method}/{}",
            self.instance_url,
            self.token.expose_secret()
        );
        if let Some(suffix) = suffix {
            url.push('/');
            url.push_str(&suffix);
        }
        self.client.request(method, url)
    }

    /// Sends a request and returns the body of a 2xx response.
    async fn execute(
        &self,
        api_method: &'static str,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<String, LeadwireError> {
        let response = builder.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                LeadwireError::Timeout { duration: timeout }
            } else {
                // The URL carries the token; keep it out of the error.
                let e = e.without_url();
                LeadwireError::Relay {
                    message: format!("{api_method} request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(api_method, status = %status, "relay response received");

        if !status.is_success() {
            return Err(LeadwireError::relay(format!(
                "{api_method} returned {status}: {body}"
            )));
        }
        Ok(body)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        api_method: &'static str,
        payload: &T,
        timeout: Duration,
    ) -> Result<String, LeadwireError> {
        let builder = self.request(Method::POST, api_method, None).json(payload);
        self.execute(api_method, builder, timeout).await
    }

    /// Long-polls the notification queue. `Ok(None)` when the queue is empty.
    pub async fn receive_notification(&self) -> Result<Option<RawNotification>, LeadwireError> {
        let builder = self.request(Method::GET, "receiveNotification", None);
        let body = self
            .execute("receiveNotification", builder, self.timeouts.receive)
            .await?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(Some).map_err(|e| LeadwireError::Relay {
            message: format!("malformed receiveNotification body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Removes a notification from the queue.
    pub async fn delete_notification(&self, receipt: ReceiptId) -> Result<(), LeadwireError> {
        let builder = self.request(
            Method::DELETE,
            "deleteNotification",
            Some(receipt.to_string()),
        );
        self.execute("deleteNotification", builder, self.timeouts.send)
            .await
            .map(|_| ())
    }

    pub async fn send_message<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), LeadwireError> {
        self.post_json("sendMessage", payload, self.timeouts.send)
            .await
            .map(|_| ())
    }

    pub async fn send_interactive_buttons<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<(), LeadwireError> {
        self.post_json("sendInteractiveButtonsReply", payload, self.timeouts.send)
            .await
            .map(|_| ())
    }

    pub async fn send_file_by_url<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<(), LeadwireError> {
        self.post_json("sendFileByUrl", payload, self.timeouts.file)
            .await
            .map(|_| ())
    }

    /// Applies instance settings.
    pub async fn set_settings(&self, settings: &Settings) -> Result<(), LeadwireError> {
        self.post_json("setSettings", settings, self.timeouts.send)
            .await
            .map(|_| ())
    }

    /// Returns the instance authorization state (e.g. `authorized`).
    pub async fn state_instance(&self) -> Result<String, LeadwireError> {
        let builder = self.request(Method::GET, "getStateInstance", None);
        let body = self
            .execute("getStateInstance", builder, self.timeouts.send)
            .await?;
        let state: InstanceState = serde_json::from_str(&body).map_err(|e| LeadwireError::Relay {
            message: format!("malformed getStateInstance body: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(state.state_instance)
    }
}
