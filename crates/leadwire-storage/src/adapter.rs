// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use leadwire_config::model::StorageConfig;
use leadwire_core::{
    AdapterType, ChatId, HealthStatus, Language, LeadRecord, LeadwireError, PluginAdapter,
    StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, LeadwireError> {
        self.db.get().ok_or_else(|| LeadwireError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadwireError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LeadwireError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LeadwireError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadwireError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn load_languages(&self) -> Result<Vec<(ChatId, Language)>, LeadwireError> {
        queries::languages::load_languages(self.db()?).await
    }

    async fn save_language(&self, chat: &ChatId, language: Language) -> Result<(), LeadwireError> {
        queries::languages::upsert_language(self.db()?, chat, language).await
    }

    async fn delete_language(&self, chat: &ChatId) -> Result<(), LeadwireError> {
        queries::languages::delete_language(self.db()?, chat).await
    }

    async fn save_lead(&self, lead: &LeadRecord) -> Result<i64, LeadwireError> {
        queries::leads::insert_lead(self.db()?, lead).await
    }

    async fn recent_leads(&self, limit: usize) -> Result<Vec<LeadRecord>, LeadwireError> {
        queries::leads::recent_leads(self.db()?, limit).await
    }

    async fn count_leads(&self) -> Result<u64, LeadwireError> {
        queries::leads::count_leads(self.db()?).await
    }
}
