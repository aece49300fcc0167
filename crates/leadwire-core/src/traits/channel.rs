// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay traits: the inbound notification queue and the outbound message channel.

use async_trait::async_trait;

use crate::error::LeadwireError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Button, ChatId, Notification, ReceiptId};

/// Queue of pending inbound notifications held by the messaging relay.
///
/// Delivery is at-least-once: a notification stays in the queue until it is
/// acknowledged, and may be handed out again before that.
#[async_trait]
pub trait NotificationSource: PluginAdapter {
    /// Long-polls for the next pending notification. `Ok(None)` means the
    /// poll window elapsed with nothing to deliver.
    async fn poll(&self) -> Result<Option<Notification>, LeadwireError>;

    /// Removes a notification from the relay queue so it is not redelivered.
    async fn acknowledge(&self, receipt: ReceiptId) -> Result<(), LeadwireError>;
}

/// Delivery of replies to a chat.
#[async_trait]
pub trait OutboundChannel: PluginAdapter {
    /// Sends a plain text message.
    async fn send_text(&self, chat: &ChatId, text: &str) -> Result<(), LeadwireError>;

    /// Sends a message with reply buttons.
    async fn send_interactive(
        &self,
        chat: &ChatId,
        body: &str,
        buttons: &[Button],
    ) -> Result<(), LeadwireError>;

    /// Sends a file the relay downloads from a public URL.
    async fn send_file_by_url(
        &self,
        chat: &ChatId,
        url: &str,
        file_name: &str,
        caption: &str,
    ) -> Result<(), LeadwireError>;
}
