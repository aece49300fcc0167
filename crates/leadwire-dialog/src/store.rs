// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat conversation state.
//!
//! One [`ConversationStore`] holds every chat. Each chat sits behind its own
//! async mutex; [`ConversationStore::lock`] hands out an owned guard and all
//! work for one event happens while holding it. Chats never lock each other.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use leadwire_core::{ChatId, HistoryTurn, Language, LeadwireError, StorageAdapter};

use crate::machine::Phase;

/// Mutable state of one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    pub language: Option<Language>,
    pub phase: Phase,
    pub history: VecDeque<HistoryTurn>,
}

impl Conversation {
    fn with_language(language: Language) -> Self {
        Self {
            language: Some(language),
            phase: Phase::Idle,
            history: VecDeque::new(),
        }
    }
}

/// Holds every chat's [`Conversation`], with durable language persistence.
pub struct ConversationStore {
    chats: DashMap<ChatId, Arc<Mutex<Conversation>>>,
    storage: Arc<dyn StorageAdapter>,
    history_limit: usize,
}

impl ConversationStore {
    pub fn new(storage: Arc<dyn StorageAdapter>, history_limit: usize) -> Self {
        Self {
            chats: DashMap::new(),
            storage,
            history_limit,
        }
    }

    /// Restores languages persisted by an earlier run. Those chats resume in `Idle`.
    pub async fn load(&self) -> Result<usize, LeadwireError> {
        let languages = self.storage.load_languages().await?;
        let count = languages.len();
        for (chat, language) in languages {
            self.chats
                .insert(chat, Arc::new(Mutex::new(Conversation::with_language(language))));
        }
        info!(count, "restored chat languages");
        Ok(count)
    }

    /// Snapshot of a chat, the default state if it was never seen.
    pub async fn get(&self, chat: &ChatId) -> Conversation {
        self.lock(chat).await.conversation().clone()
    }

    /// Waits for exclusive access to `chat`.
    pub async fn lock(&self, chat: &ChatId) -> ChatGuard {
        let cell = self
            .chats
            .entry(chat.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Conversation::default())))
            .clone();
        ChatGuard {
            chat_id: chat.clone(),
            conversation: cell.lock_owned().await,
            storage: Arc::clone(&self.storage),
            history_limit: self.history_limit,
        }
    }

    /// Number of chats held in memory.
    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}

/// Exclusive handle on one chat's state.
pub struct ChatGuard {
    chat_id: ChatId,
    conversation: OwnedMutexGuard<Conversation>,
    storage: Arc<dyn StorageAdapter>,
    history_limit: usize,
}

impl ChatGuard {
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn language(&self) -> Option<Language> {
        self.conversation.language
    }

    pub fn phase(&self) -> &Phase {
        &self.conversation.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        if self.conversation.phase != phase {
            debug!(
                chat_id = %self.chat_id,
                from = ?self.conversation.phase.form_step(),
                to = ?phase.form_step(),
                "phase change"
            );
        }
        self.conversation.phase = phase;
    }

    /// Persists the language, then records it in memory.
    ///
    /// On a storage error the in-memory state is left untouched.
    pub async fn set_language(&mut self, language: Language) -> Result<(), LeadwireError> {
        self.storage.save_language(&self.chat_id, language).await?;
        self.conversation.language = Some(language);
        info!(chat_id = %self.chat_id, language = %language, "language selected");
        Ok(())
    }

    /// Returns the chat to its initial state, forgetting the durable language too.
    pub async fn reset(&mut self) -> Result<(), LeadwireError> {
        self.storage.delete_language(&self.chat_id).await?;
        *self.conversation = Conversation::default();
        info!(chat_id = %self.chat_id, "conversation reset");
        Ok(())
    }

    /// Appends a turn, dropping the oldest beyond the history limit.
    pub fn append_history(&mut self, turn: HistoryTurn) {
        let history = &mut self.conversation.history;
        history.push_back(turn);
        while history.len() > self.history_limit {
            history.pop_front();
        }
    }

    /// The most recent `window` turns, oldest first.
    pub fn history_window(&self, window: usize) -> Vec<HistoryTurn> {
        let history = &self.conversation.history;
        let skip = history.len().saturating_sub(window);
        history.iter().skip(skip).cloned().collect()
    }
}
