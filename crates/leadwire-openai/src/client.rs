// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat-completions API.
//!
//! Provides [`OpenAiClient`] which handles bearer authentication, request
//! timeouts and a single retry on transient statuses.

use std::time::Duration;

use leadwire_core::LeadwireError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client for chat-completions calls.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    max_retries: u32,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        api_key: &SecretString,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, LeadwireError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| LeadwireError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LeadwireError::Responder {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: completions_endpoint(base_url),
            timeout,
            max_retries: 1,
        })
    }

    /// Overrides the endpoint (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.endpoint = completions_endpoint(url);
        self
    }

    /// Sends a completion request.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LeadwireError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| self.transport_error(e))?;
                return serde_json::from_str(&body).map_err(|e| LeadwireError::Responder {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(LeadwireError::responder(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(LeadwireError::responder(message));
        }

        Err(last_error
            .unwrap_or_else(|| LeadwireError::responder("completion request failed after retries")))
    }

    fn transport_error(&self, e: reqwest::Error) -> LeadwireError {
        if e.is_timeout() {
            LeadwireError::Timeout {
                duration: self.timeout,
            }
        } else {
            LeadwireError::Responder {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
