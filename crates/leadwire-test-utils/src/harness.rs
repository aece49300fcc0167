// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end dialogue testing.
//!
//! `TestHarness` assembles a dialogue controller with mock adapters and a
//! temp SQLite database. `say()` and `press()` drive single events through
//! the controller; intake-level tests reuse the same parts with the agent
//! pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use leadwire_config::model::{LeadwireConfig, StorageConfig};
use leadwire_core::{
    ChatId, InboundContent, InboundEvent, LeadSink, LeadwireError, MessageId, OutboundChannel,
    Responder, StorageAdapter,
};
use leadwire_dialog::{
    Conversation, ConversationStore, Deduplicator, DialogSettings, DialogueController,
};
use leadwire_storage::SqliteStorage;

use crate::mock_relay::{MockRelay, SentMessage};
use crate::mock_responder::MockResponder;
use crate::mock_sink::MockSink;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<String>,
    config: LeadwireConfig,
    with_sink: bool,
    database_path: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            config: LeadwireConfig::default(),
            with_sink: false,
            database_path: None,
        }
    }

    /// Set mock responder replies.
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Allow `sender` to run admin commands.
    pub fn with_admin(mut self, sender: &str) -> Self {
        self.config.admin.allowed_senders.push(sender.to_string());
        self
    }

    pub fn with_price_url(mut self, url: &str) -> Self {
        self.config.brand.price_file_url = Some(url.to_string());
        self
    }

    /// Attach a [`MockSink`] to the controller.
    pub fn with_sink(mut self) -> Self {
        self.with_sink = true;
        self
    }

    /// Reuse an existing database file instead of a fresh temp one.
    pub fn with_database(mut self, path: &str) -> Self {
        self.database_path = Some(path.to_string());
        self
    }

    /// Mutate the configuration before the controller is built.
    pub fn configure(mut self, f: impl FnOnce(&mut LeadwireConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, LeadwireError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LeadwireError::Storage { source: e.into() })?;
        let database_path = self.database_path.unwrap_or_else(|| {
            temp_dir
                .path()
                .join("test.db")
                .to_string_lossy()
                .into_owned()
        });

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path,
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let relay = Arc::new(MockRelay::new());
        let responder = Arc::new(MockResponder::with_replies(self.replies));
        let sink = self.with_sink.then(|| Arc::new(MockSink::new()));

        let store = Arc::new(ConversationStore::new(
            storage.clone(),
            config.intake.history_limit,
        ));
        store.load().await?;

        let mut controller = DialogueController::new(
            store.clone(),
            relay.clone() as Arc<dyn OutboundChannel>,
            responder.clone() as Arc<dyn Responder>,
            storage.clone(),
            DialogSettings::from_config(&config),
        );
        if let Some(sink) = &sink {
            controller = controller.with_sink(sink.clone() as Arc<dyn LeadSink>);
        }

        Ok(TestHarness {
            relay,
            responder,
            sink,
            storage,
            store,
            controller: Arc::new(controller),
            dedup: Arc::new(Deduplicator::new()),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete dialogue environment with mock adapters and temp storage.
pub struct TestHarness {
    /// Mock relay: inbound queue and captured outbound messages.
    pub relay: Arc<MockRelay>,
    pub responder: Arc<MockResponder>,
    /// Present when built with [`TestHarnessBuilder::with_sink`].
    pub sink: Option<Arc<MockSink>>,
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    pub store: Arc<ConversationStore>,
    pub controller: Arc<DialogueController>,
    pub dedup: Arc<Deduplicator>,
    pub config: LeadwireConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run a text message from `chat` through the controller and return
    /// what was sent back to that chat.
    pub async fn say(&self, chat: &str, text: &str) -> Result<Vec<SentMessage>, LeadwireError> {
        self.deliver(chat, InboundContent::Text(text.to_string()))
            .await
    }

    /// Run a button press from `chat` through the controller.
    pub async fn press(
        &self,
        chat: &str,
        button_id: &str,
    ) -> Result<Vec<SentMessage>, LeadwireError> {
        self.deliver(
            chat,
            InboundContent::ButtonReply {
                id: button_id.to_string(),
                text: button_id.to_string(),
            },
        )
        .await
    }

    async fn deliver(
        &self,
        chat: &str,
        content: InboundContent,
    ) -> Result<Vec<SentMessage>, LeadwireError> {
        let before = self.relay.sent_to(chat).await.len();
        self.controller.handle(&event(chat, content)).await?;
        let mut sent = self.relay.sent_to(chat).await;
        Ok(sent.split_off(before))
    }

    /// Snapshot of the in-memory conversation for `chat`.
    pub async fn conversation(&self, chat: &str) -> Conversation {
        self.store.get(&ChatId::from(chat)).await
    }
}

static NEXT_MESSAGE: AtomicU64 = AtomicU64::new(1);

/// Build an inbound event with a fresh message id whose sender is the chat itself.
pub fn event(chat: &str, content: InboundContent) -> InboundEvent {
    let id = NEXT_MESSAGE.fetch_add(1, Ordering::Relaxed);
    InboundEvent {
        message_id: Some(MessageId(format!("TEST{id:08X}"))),
        chat_id: ChatId::from(chat),
        sender_phone: chat.to_string(),
        content,
        raw_payload: serde_json::Value::Null,
    }
}
