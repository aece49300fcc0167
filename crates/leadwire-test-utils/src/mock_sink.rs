// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock lead sink capturing forwarded leads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadwire_core::{AdapterType, HealthStatus, LeadRecord, LeadSink, LeadwireError, PluginAdapter};

#[derive(Default)]
pub struct MockSink {
    leads: Arc<Mutex<Vec<LeadRecord>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn leads(&self) -> Vec<LeadRecord> {
        self.leads.lock().await.clone()
    }

    /// Waits until at least `count` leads arrived. Forwarding runs on a
    /// spawned task, so tests cannot assert right after the confirmation.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.leads.lock().await.len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl PluginAdapter for MockSink {
    fn name(&self) -> &str {
        "mock-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadwireError> {
        Ok(())
    }
}

#[async_trait]
impl LeadSink for MockSink {
    async fn forward(&self, lead: &LeadRecord) -> Result<(), LeadwireError> {
        self.leads.lock().await.push(lead.clone());
        Ok(())
    }
}
