// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completions responder for the Leadwire chat front-end.
//!
//! This crate implements [`Responder`] on top of any OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use leadwire_config::model::{LeadwireConfig, ResponderConfig};
use leadwire_core::{
    AdapterType, HealthStatus, LeadwireError, PluginAdapter, Responder, ResponderRequest, Role,
};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatMessage};

/// Generative responder backed by the chat-completions API.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiResponder {
    client: OpenAiClient,
    config: ResponderConfig,
}

impl OpenAiResponder {
    /// Creates a responder from the `[responder]` section.
    pub fn new(config: &LeadwireConfig) -> Result<Self, LeadwireError> {
        let api_key = resolve_api_key(&config.responder.api_key)?;
        let client = OpenAiClient::new(
            &api_key,
            &config.responder.base_url,
            Duration::from_secs(config.responder.timeout_secs),
        )?;

        info!(model = config.responder.model, "OpenAI responder initialized");

        Ok(Self {
            client,
            config: config.responder.clone(),
        })
    }

    #[cfg(test)]
    fn with_client(client: OpenAiClient, config: ResponderConfig) -> Self {
        Self { client, config }
    }

    /// Builds the API request: system prompt, then history.
    ///
    /// `user_text` is appended only when the history does not already end with it.
    fn to_completion_request(&self, request: &ResponderRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage::new("system", &request.system_prompt));
        messages.extend(
            request
                .history
                .iter()
                .map(|turn| ChatMessage::new(turn.role.to_string(), &turn.text)),
        );

        let ends_with_user_text = request
            .history
            .last()
            .is_some_and(|turn| turn.role == Role::User && turn.text == request.user_text);
        if !ends_with_user_text {
            messages.push(ChatMessage::new("user", &request.user_text));
        }

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiResponder {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadwireError> {
        debug!("OpenAI responder shutting down");
        Ok(())
    }
}

#[async_trait]
impl Responder for OpenAiResponder {
    async fn complete(&self, request: ResponderRequest) -> Result<String, LeadwireError> {
        let api_request = self.to_completion_request(&request);
        let response = self.client.complete(&api_request).await?;

        if let Some(usage) = response.usage {
            debug!(
                model = response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        match response.first_text().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(LeadwireError::responder("empty completion")),
        }
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<SecretString, LeadwireError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(SecretString::from(key.clone()));
    }

    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            LeadwireError::Config(
                "OpenAI API key not found. Set responder.api_key in config or OPENAI_API_KEY environment variable.".into(),
            )
        })
}
