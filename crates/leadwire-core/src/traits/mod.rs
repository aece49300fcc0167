// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod responder;
pub mod sink;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::{NotificationSource, OutboundChannel};
pub use responder::Responder;
pub use sink::LeadSink;
pub use storage::StorageAdapter;
