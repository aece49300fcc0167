// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock relay for deterministic testing.
//!
//! `MockRelay` implements both `NotificationSource` and `OutboundChannel`
//! with injectable notifications, captured sends and acknowledgements, and
//! switches to make individual calls fail.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadwire_core::{
    AdapterType, Button, ChatId, HealthStatus, InboundContent, InboundEvent, LeadwireError,
    MessageId, Notification, NotificationKind, NotificationSource, OutboundChannel,
    PluginAdapter, ReceiptId,
};

/// One message sent through the mock relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        chat: ChatId,
        text: String,
    },
    Interactive {
        chat: ChatId,
        body: String,
        buttons: Vec<Button>,
    },
    File {
        chat: ChatId,
        url: String,
        file_name: String,
        caption: String,
    },
}

impl SentMessage {
    pub fn chat(&self) -> &ChatId {
        match self {
            SentMessage::Text { chat, .. }
            | SentMessage::Interactive { chat, .. }
            | SentMessage::File { chat, .. } => chat,
        }
    }

    /// The user-visible text: message, interactive body or file caption.
    pub fn text(&self) -> &str {
        match self {
            SentMessage::Text { text, .. } => text,
            SentMessage::Interactive { body, .. } => body,
            SentMessage::File { caption, .. } => caption,
        }
    }
}

/// A mock messaging relay for testing.
#[derive(Default)]
pub struct MockRelay {
    inbound: Arc<Mutex<VecDeque<Notification>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    acknowledged: Arc<Mutex<Vec<ReceiptId>>>,
    failing_polls: AtomicUsize,
    fail_text: AtomicBool,
    fail_interactive: AtomicBool,
    fail_files: AtomicBool,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification for the next `poll()`.
    pub async fn inject(&self, notification: Notification) {
        self.inbound.lock().await.push_back(notification);
    }

    /// Queue an incoming text message.
    pub async fn inject_text(&self, receipt: u64, message_id: &str, chat: &str, text: &str) {
        self.inject(incoming(
            receipt,
            message_id,
            chat,
            InboundContent::Text(text.to_string()),
        ))
        .await;
    }

    /// Queue an incoming button press.
    pub async fn inject_button(&self, receipt: u64, message_id: &str, chat: &str, button_id: &str) {
        self.inject(incoming(
            receipt,
            message_id,
            chat,
            InboundContent::ButtonReply {
                id: button_id.to_string(),
                text: button_id.to_string(),
            },
        ))
        .await;
    }

    /// Number of notifications not yet polled.
    pub async fn pending(&self) -> usize {
        self.inbound.lock().await.len()
    }

    /// Make the next `count` polls fail.
    pub fn fail_polls(&self, count: usize) {
        self.failing_polls.store(count, Ordering::SeqCst);
    }

    pub fn fail_text(&self, fail: bool) {
        self.fail_text.store(fail, Ordering::SeqCst);
    }

    pub fn fail_interactive(&self, fail: bool) {
        self.fail_interactive.store(fail, Ordering::SeqCst);
    }

    pub fn fail_files(&self, fail: bool) {
        self.fail_files.store(fail, Ordering::SeqCst);
    }

    /// All messages sent so far.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to `chat`, in order.
    pub async fn sent_to(&self, chat: &str) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat().as_str() == chat)
            .cloned()
            .collect()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Receipts acknowledged so far, in order.
    pub async fn acknowledged(&self) -> Vec<ReceiptId> {
        self.acknowledged.lock().await.clone()
    }
}

/// Builds an incoming-message notification whose sender is the chat itself.
pub fn incoming(receipt: u64, message_id: &str, chat: &str, content: InboundContent) -> Notification {
    Notification {
        receipt_id: ReceiptId(receipt),
        kind: NotificationKind::Message(InboundEvent {
            message_id: (!message_id.is_empty()).then(|| MessageId(message_id.to_string())),
            chat_id: ChatId::from(chat),
            sender_phone: chat.to_string(),
            content,
            raw_payload: serde_json::Value::Null,
        }),
    }
}

fn injected_failure(call: &str) -> LeadwireError {
    LeadwireError::relay(format!("mock {call} failure"))
}

#[async_trait]
impl PluginAdapter for MockRelay {
    fn name(&self) -> &str {
        "mock-relay"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Relay
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadwireError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationSource for MockRelay {
    async fn poll(&self) -> Result<Option<Notification>, LeadwireError> {
        let failing = self.failing_polls.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_polls.store(failing - 1, Ordering::SeqCst);
            return Err(injected_failure("poll"));
        }
        Ok(self.inbound.lock().await.pop_front())
    }

    async fn acknowledge(&self, receipt: ReceiptId) -> Result<(), LeadwireError> {
        self.acknowledged.lock().await.push(receipt);
        Ok(())
    }
}

#[async_trait]
impl OutboundChannel for MockRelay {
    async fn send_text(&self, chat: &ChatId, text: &str) -> Result<(), LeadwireError> {
        if self.fail_text.load(Ordering::SeqCst) {
            return Err(injected_failure("send_text"));
        }
        self.sent.lock().await.push(SentMessage::Text {
            chat: chat.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_interactive(
        &self,
        chat: &ChatId,
        body: &str,
        buttons: &[Button],
    ) -> Result<(), LeadwireError> {
        if self.fail_interactive.load(Ordering::SeqCst) {
            return Err(injected_failure("send_interactive"));
        }
        self.sent.lock().await.push(SentMessage::Interactive {
            chat: chat.clone(),
            body: body.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn send_file_by_url(
        &self,
        chat: &ChatId,
        url: &str,
        file_name: &str,
        caption: &str,
    ) -> Result<(), LeadwireError> {
        if self.fail_files.load(Ordering::SeqCst) {
            return Err(injected_failure("send_file_by_url"));
        }
        self.sent.lock().await.push(SentMessage::File {
            chat: chat.clone(),
            url: url.to_string(),
            file_name: file_name.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}
