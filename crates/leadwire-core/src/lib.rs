// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadwire chat front-end.
//!
//! This crate provides the trait definitions for every external collaborator
//! (relay, responder, storage, lead sink), the shared error type, and the
//! common domain types passed between the intake pipeline and the dialogue.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadwireError;
pub use types::{
    AdapterType, Button, ChatId, HealthStatus, HistoryTurn, InboundContent, InboundEvent,
    Language, LeadRecord, LeadStatus, MessageId, Notification, NotificationKind, ReceiptId,
    ResponderRequest, Role,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    LeadSink, NotificationSource, OutboundChannel, PluginAdapter, Responder, StorageAdapter,
};
