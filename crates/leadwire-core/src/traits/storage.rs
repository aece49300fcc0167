// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for durable language preferences and lead records.

use async_trait::async_trait;

use crate::error::LeadwireError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, Language, LeadRecord};

/// Adapter for the durable storage backend.
///
/// Language preferences are a key-value map that must survive a restart;
/// lead records are an append-only log.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), LeadwireError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), LeadwireError>;

    /// Loads every persisted chat language.
    async fn load_languages(&self) -> Result<Vec<(ChatId, Language)>, LeadwireError>;

    /// Inserts or replaces the language of a chat.
    async fn save_language(&self, chat: &ChatId, language: Language) -> Result<(), LeadwireError>;

    /// Forgets the language of a chat.
    async fn delete_language(&self, chat: &ChatId) -> Result<(), LeadwireError>;

    /// Appends a lead record. Returns the storage-assigned row id.
    async fn save_lead(&self, lead: &LeadRecord) -> Result<i64, LeadwireError>;

    /// Returns up to `limit` leads, newest first.
    async fn recent_leads(&self, limit: usize) -> Result<Vec<LeadRecord>, LeadwireError>;

    /// Returns the total number of stored leads.
    async fn count_leads(&self) -> Result<u64, LeadwireError>;
}
