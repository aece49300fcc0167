// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Green-API wire types and notification decoding.

use leadwire_core::{
    Button, ChatId, InboundContent, InboundEvent, MessageId, Notification, NotificationKind,
    ReceiptId,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Webhook type of an incoming chat message.
pub const INCOMING_MESSAGE: &str = "incomingMessageReceived";

/// Envelope returned by `receiveNotification`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    pub receipt_id: u64,
    #[serde(default)]
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookBody {
    #[serde(default)]
    type_webhook: String,
    #[serde(default)]
    id_message: Option<String>,
    #[serde(default)]
    sender_data: Option<SenderData>,
    #[serde(default)]
    message_data: Option<MessageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SenderData {
    #[serde(default)]
    chat_id: String,
    #[serde(default)]
    sender: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageData {
    #[serde(default)]
    type_message: Option<String>,
    #[serde(default)]
    text_message_data: Option<TextMessageData>,
    #[serde(default)]
    extended_text_message_data: Option<ExtendedTextMessageData>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    interactive_buttons_response: Option<ButtonsResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextMessageData {
    #[serde(default)]
    text_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExtendedTextMessageData {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ButtonsResponse {
    #[serde(default)]
    selected_button_id: Option<String>,
    #[serde(default)]
    selected_button_text: Option<String>,
}

impl MessageData {
    fn is_text(&self) -> bool {
        matches!(
            self.type_message.as_deref(),
            Some("textMessage" | "extendedTextMessage")
        ) || self.text_message_data.is_some()
            || self.extended_text_message_data.is_some()
    }

    /// First non-empty of: plain text, extended text, `message`, `caption`.
    fn text(&self) -> String {
        let candidates = [
            self.text_message_data
                .as_ref()
                .and_then(|d| d.text_message.as_deref()),
            self.extended_text_message_data
                .as_ref()
                .and_then(|d| d.text.as_deref()),
            self.message.as_deref(),
            self.caption.as_deref(),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    fn content(&self) -> InboundContent {
        if self.is_text() {
            return InboundContent::Text(self.text());
        }
        let type_message = self.type_message.clone().unwrap_or_default();
        if type_message == "interactiveButtonsResponse" {
            let reply = self.interactive_buttons_response.clone().unwrap_or_default();
            if let Some(id) = reply.selected_button_id.filter(|id| !id.is_empty()) {
                return InboundContent::ButtonReply {
                    id,
                    text: reply.selected_button_text.unwrap_or_default(),
                };
            }
        }
        InboundContent::Unsupported {
            message_type: type_message,
        }
    }
}

/// Decodes a raw notification. Never fails: anything that is not a usable
/// incoming message becomes [`NotificationKind::Ignored`].
pub fn decode_notification(raw: RawNotification) -> Notification {
    let receipt_id = ReceiptId(raw.receipt_id);
    let body: WebhookBody = match serde_json::from_value(raw.body.clone()) {
        Ok(body) => body,
        Err(e) => {
            warn!(receipt_id = %receipt_id, error = %e, "malformed notification body");
            return Notification {
                receipt_id,
                kind: NotificationKind::Ignored {
                    webhook_type: "malformed".into(),
                },
            };
        }
    };

    if body.type_webhook != INCOMING_MESSAGE {
        return Notification {
            receipt_id,
            kind: NotificationKind::Ignored {
                webhook_type: body.type_webhook,
            },
        };
    }

    let sender = body.sender_data.unwrap_or_default();
    if sender.chat_id.is_empty() {
        warn!(receipt_id = %receipt_id, "incoming message without chatId");
        return Notification {
            receipt_id,
            kind: NotificationKind::Ignored {
                webhook_type: body.type_webhook,
            },
        };
    }

    let content = body.message_data.unwrap_or_default().content();
    let message_id = body
        .id_message
        .filter(|id| !id.is_empty())
        .map(MessageId);

    Notification {
        receipt_id,
        kind: NotificationKind::Message(InboundEvent {
            message_id,
            chat_id: ChatId(sender.chat_id),
            sender_phone: sender.sender,
            content,
            raw_payload: raw.body,
        }),
    }
}

/// `sendMessage` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub message: &'a str,
}

/// `sendInteractiveButtonsReply` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInteractiveButtons<'a> {
    pub chat_id: &'a str,
    pub header: &'a str,
    pub body: &'a str,
    pub footer: &'a str,
    pub buttons: Vec<ButtonPayload<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPayload<'a> {
    pub button_id: &'a str,
    pub button_text: &'a str,
}

impl<'a> From<&'a Button> for ButtonPayload<'a> {
    fn from(button: &'a Button) -> Self {
        Self {
            button_id: &button.id,
            button_text: &button.text,
        }
    }
}

/// `sendFileByUrl` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFileByUrl<'a> {
    pub chat_id: &'a str,
    pub url_file: &'a str,
    pub file_name: &'a str,
    pub caption: &'a str,
}

/// `setSettings` body enabling the webhooks the intake loop consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub incoming_webhook: &'static str,
    pub poll_message_webhook: &'static str,
}

impl Settings {
    pub fn incoming_enabled() -> Self {
        Self {
            incoming_webhook: "yes",
            poll_message_webhook: "yes",
        }
    }
}

/// `getStateInstance` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceState {
    pub state_instance: String,
}
