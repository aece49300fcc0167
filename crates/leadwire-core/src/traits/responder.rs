// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Responder trait for generative free-text answers.

use async_trait::async_trait;

use crate::error::LeadwireError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ResponderRequest;

/// Generates a reply for turns that match no structured intent.
#[async_trait]
pub trait Responder: PluginAdapter {
    /// Returns the reply text. Transport failures and timeouts surface as
    /// [`LeadwireError::Responder`] or [`LeadwireError::Timeout`].
    async fn complete(&self, request: ResponderRequest) -> Result<String, LeadwireError>;
}
