// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optional secondary destination for saved leads.

use async_trait::async_trait;

use crate::error::LeadwireError;
use crate::traits::adapter::PluginAdapter;
use crate::types::LeadRecord;

/// Best-effort mirror of saved leads (spreadsheet bridge, CRM webhook).
///
/// Called only after the primary [`StorageAdapter`](crate::StorageAdapter)
/// write succeeded. Callers log failures and never propagate them.
#[async_trait]
pub trait LeadSink: PluginAdapter {
    async fn forward(&self, lead: &LeadRecord) -> Result<(), LeadwireError>;
}
