// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation logic for the Leadwire chat front-end.
//!
//! - [`dedup`]: process-lifetime set of handled message ids.
//! - [`classifier`]: keyword intent classification.
//! - [`machine`]: pure phase transitions.
//! - [`store`]: per-chat state behind per-chat locks.
//! - [`controller`]: executes transitions against the relay, responder and storage.
//! - [`templates`] and [`prompts`]: trilingual reply content.

pub mod admin;
pub mod classifier;
pub mod controller;
pub mod dedup;
pub mod machine;
pub mod prompts;
pub mod store;
pub mod templates;
pub mod text;

pub use classifier::{Intent, classify};
pub use controller::{DialogSettings, DialogueController};
pub use dedup::Deduplicator;
pub use machine::{Effect, FormStep, Input, Phase, Transition, decide};
pub use store::{ChatGuard, Conversation, ConversationStore};
