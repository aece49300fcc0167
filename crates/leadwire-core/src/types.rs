// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Leadwire pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Stable identifier of a chat thread as assigned by the relay (e.g. `77001234567@c.us`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Relay-assigned identifier of a single message, unique per relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Handle used to remove a notification from the relay queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId(pub u64);

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Relay,
    Responder,
    Storage,
    Sink,
}

/// Conversation language selected by the user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    Kk,
    En,
}

impl Language {
    /// Two-letter code used for persistence.
    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::Kk => "kk",
            Language::En => "en",
        }
    }

    /// Maps the digit shortcuts of the language prompt ("1", "2", "3").
    pub fn from_digit(text: &str) -> Option<Self> {
        match text {
            "1" => Some(Language::Ru),
            "2" => Some(Language::Kk),
            "3" => Some(Language::En),
            _ => None,
        }
    }

    /// Identifier of the language-selection button for this language.
    pub fn button_id(self) -> &'static str {
        match self {
            Language::Ru => "lang_ru",
            Language::Kk => "lang_kk",
            Language::En => "lang_en",
        }
    }

    /// Maps a language-selection button identifier back to a language.
    pub fn from_button_id(id: &str) -> Option<Self> {
        match id {
            "lang_ru" => Some(Language::Ru),
            "lang_kk" => Some(Language::Kk),
            "lang_en" => Some(Language::En),
            _ => None,
        }
    }
}

/// An interactive reply button: opaque id plus user-visible label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub text: String,
}

impl Button {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Decoded content of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    /// Plain or extended text (possibly empty when the relay dropped the body).
    Text(String),
    /// The user pressed an interactive button.
    ButtonReply { id: String, text: String },
    /// Media and other message types the dialogue does not handle.
    Unsupported { message_type: String },
}

/// One inbound chat message pulled from the relay.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Relay message id; `None` when the relay omitted it (cannot be deduplicated).
    pub message_id: Option<MessageId>,
    pub chat_id: ChatId,
    /// Sender phone or relay sender id (e.g. `77001234567@c.us`).
    pub sender_phone: String,
    pub content: InboundContent,
    /// Original notification body, kept for diagnostics.
    pub raw_payload: serde_json::Value,
}

/// What a notification carries.
#[derive(Debug, Clone)]
pub enum NotificationKind {
    /// An incoming chat message that the dialogue should process.
    Message(InboundEvent),
    /// Any other webhook (delivery status, outgoing echo, state change).
    Ignored { webhook_type: String },
}

/// One unit of inbound work from the relay; must be acknowledged by receipt.
#[derive(Debug, Clone)]
pub struct Notification {
    pub receipt_id: ReceiptId,
    pub kind: NotificationKind,
}

/// Speaker of a history turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of rolling conversation history sent to the responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

impl HistoryTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Request handed to the generative responder.
///
/// `history` already ends with the current user turn; `user_text` repeats it
/// for responders that take the latest message separately.
#[derive(Debug, Clone)]
pub struct ResponderRequest {
    pub system_prompt: String,
    pub history: Vec<HistoryTurn>,
    pub user_text: String,
}

/// Processing status of a captured lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
}

/// Contact and task details captured by the consultation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub chat_id: ChatId,
    /// Relay-reported phone of the sender.
    pub sender_phone: String,
    pub name: String,
    pub company: String,
    /// Phone number typed into the form.
    pub phone: String,
    pub task: String,
    pub recorded_at: DateTime<Utc>,
    pub status: LeadStatus,
}
