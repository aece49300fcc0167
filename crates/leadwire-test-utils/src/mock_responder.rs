// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock responder adapter for deterministic testing.
//!
//! `MockResponder` implements `Responder` with pre-configured replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadwire_core::{
    AdapterType, HealthStatus, LeadwireError, PluginAdapter, Responder, ResponderRequest,
};

/// Reply used when the queue is empty.
pub const DEFAULT_REPLY: &str = "mock response";

/// A mock generative responder.
///
/// Replies are popped from a FIFO queue; `Err` entries fail that call.
/// Every request is captured for assertions.
pub struct MockResponder {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<ResponderRequest>>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock responder pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        let responder = Self::new();
        if let Ok(mut queue) = responder.replies.try_lock() {
            queue.extend(replies.into_iter().map(Ok));
        }
        responder
    }

    pub async fn add_reply(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(text.into()));
    }

    /// Make the next call fail.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.replies.lock().await.push_back(Err(message.into()));
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<ResponderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockResponder {
    fn name(&self) -> &str {
        "mock-responder"
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
        Ok(())
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn complete(&self, request: ResponderRequest) -> Result<String, LeadwireError> {
        self.requests.lock().await.push(request);
        match self.replies.lock().await.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LeadwireError::responder(message)),
            None => Ok(DEFAULT_REPLY.to_string()),
        }
    }
}
