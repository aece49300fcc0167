// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue controller: runs one inbound event through the state machine
//! and carries out the resulting effects.
//!
//! All work for an event happens under the chat's lock. Outbound failures
//! are logged and never retried; the phase change already happened.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use leadwire_config::model::LeadwireConfig;
use leadwire_core::{
    Button, ChatId, HistoryTurn, InboundContent, InboundEvent, Language, LeadRecord, LeadSink,
    LeadStatus, LeadwireError, OutboundChannel, Responder, ResponderRequest, StorageAdapter,
};

use crate::admin::{self, AdminCommand, AdminPolicy};
use crate::machine::{self, CompletedForm, Effect, Input};
use crate::prompts;
use crate::store::{ChatGuard, ConversationStore};
use crate::templates::{self, MessageKey};
use crate::text;

/// Language used for replies before the user picked one.
const FALLBACK_LANGUAGE: Language = Language::Ru;

/// Brand content and limits the controller needs from configuration.
#[derive(Debug, Clone)]
pub struct DialogSettings {
    pub brand: String,
    pub support_phone: String,
    pub price_file_url: Option<String>,
    pub price_file_name: String,
    pub history_window: usize,
    pub system_prompt: Option<String>,
    pub admin: AdminPolicy,
}

impl DialogSettings {
    pub fn from_config(config: &LeadwireConfig) -> Self {
        Self {
            brand: config.brand.name.clone(),
            support_phone: config.brand.support_phone.clone(),
            price_file_url: config.brand.price_file_url.clone(),
            price_file_name: config.brand.price_file_name.clone(),
            history_window: config.responder.history_window,
            system_prompt: config.responder.system_prompt.clone(),
            admin: AdminPolicy::new(&config.admin.allowed_senders),
        }
    }
}

fn admin_command(input: &Input) -> Option<AdminCommand> {
    match input {
        Input::Text(text) => AdminCommand::parse(text),
        _ => None,
    }
}

/// Drives the per-chat dialogue.
pub struct DialogueController {
    store: Arc<ConversationStore>,
    outbound: Arc<dyn OutboundChannel>,
    responder: Arc<dyn Responder>,
    storage: Arc<dyn StorageAdapter>,
    sink: Option<Arc<dyn LeadSink>>,
    settings: DialogSettings,
}

impl DialogueController {
    pub fn new(
        store: Arc<ConversationStore>,
        outbound: Arc<dyn OutboundChannel>,
        responder: Arc<dyn Responder>,
        storage: Arc<dyn StorageAdapter>,
        settings: DialogSettings,
    ) -> Self {
        Self {
            store,
            outbound,
            responder,
            storage,
            sink: None,
            settings,
        }
    }

    /// Forwards every saved lead to `sink` as well.
    pub fn with_sink(mut self, sink: Arc<dyn LeadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Processes one inbound chat message to completion.
    ///
    /// Returns an error only when the chat language could not be persisted;
    /// every other failure is handled by a reply or a log line.
    pub async fn handle(&self, event: &InboundEvent) -> Result<(), LeadwireError> {
        let input = match &event.content {
            InboundContent::Unsupported { message_type } => {
                info!(chat_id = %event.chat_id, message_type = %message_type, "dropping unsupported message");
                return Ok(());
            }
            InboundContent::ButtonReply { id, .. } => Input::Button { id: id.clone() },
            InboundContent::Text(raw) => {
                let normalized = text::normalize(raw);
                if normalized.is_empty() {
                    warn!(chat_id = %event.chat_id, "empty text in inbound message");
                    Input::Empty
                } else {
                    Input::Text(normalized)
                }
            }
        };

        let mut chat = self.store.lock(&event.chat_id).await;

        if let Some(command) = admin_command(&input) {
            self.run_admin(&mut chat, event, command).await;
            return Ok(());
        }

        let transition = machine::decide(chat.phase(), chat.language(), &input);
        debug!(
            chat_id = %event.chat_id,
            input = ?input,
            effects = transition.effects.len(),
            "transition"
        );

        for effect in &transition.effects {
            if let Effect::SelectLanguage(language) = effect {
                chat.set_language(*language).await?;
            }
        }
        chat.set_phase(transition.next);

        for effect in transition.effects {
            self.execute(&mut chat, event, effect).await;
        }
        Ok(())
    }

    async fn run_admin(&self, chat: &mut ChatGuard, event: &InboundEvent, command: AdminCommand) {
        if !self.settings.admin.is_allowed(&event.sender_phone) {
            warn!(
                chat_id = %event.chat_id,
                sender = %event.sender_phone,
                ?command,
                "admin command denied"
            );
            self.send_text(&event.chat_id, admin::DENIED).await;
            return;
        }

        match command {
            AdminCommand::Reset => {
                let language = chat.language().unwrap_or(FALLBACK_LANGUAGE);
                if let Err(e) = chat.reset().await {
                    error!(chat_id = %event.chat_id, error = %e, "failed to reset chat");
                    return;
                }
                self.send_text(
                    &event.chat_id,
                    templates::template(language, MessageKey::ResetDone),
                )
                .await;
            }
            AdminCommand::Clients => {
                let reply = match self.storage.recent_leads(admin::CLIENTS_LIMIT).await {
                    Ok(leads) => admin::format_clients(&leads),
                    Err(e) => {
                        error!(error = %e, "failed to list leads");
                        format!("Ошибка: {e}")
                    }
                };
                self.send_text(&event.chat_id, &reply).await;
            }
        }
    }

    async fn execute(&self, chat: &mut ChatGuard, event: &InboundEvent, effect: Effect) {
        let chat_id = &event.chat_id;
        let language = chat.language().unwrap_or(FALLBACK_LANGUAGE);

        match effect {
            Effect::SendLanguagePrompt => {
                self.send_interactive_or_text(
                    chat_id,
                    templates::LANGUAGE_PROMPT_BODY,
                    &templates::language_buttons(),
                    templates::LANGUAGE_PROMPT_TEXT,
                )
                .await;
            }
            Effect::SelectLanguage(language) => {
                let welcome = self.render(language, MessageKey::Welcome, &[]);
                self.send_interactive_or_text(
                    chat_id,
                    &welcome,
                    &templates::menu_buttons(language),
                    &welcome,
                )
                .await;
            }
            Effect::Say { key, vars } => {
                let text = self.render(language, key, &vars);
                self.send_text(chat_id, &text).await;
            }
            Effect::DeliverPrice => self.deliver_price(chat_id, language).await,
            Effect::Respond(text) => self.respond(chat, language, text).await,
            Effect::SubmitLead(form) => self.submit_lead(event, language, form).await,
        }
    }

    async fn deliver_price(&self, chat_id: &ChatId, language: Language) {
        let caption = self.render(language, MessageKey::PriceCaption, &[]);
        let Some(url) = self.settings.price_file_url.as_deref() else {
            let notice = self.render(language, MessageKey::PriceNotConnected, &[]);
            self.send_text(chat_id, &format!("{caption}{notice}")).await;
            return;
        };

        match self
            .outbound
            .send_file_by_url(chat_id, url, &self.settings.price_file_name, &caption)
            .await
        {
            Ok(()) => info!(chat_id = %chat_id, "price file sent"),
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "price file delivery failed, sending link");
                let link = self.render(
                    language,
                    MessageKey::PriceLinkFallback,
                    &[("url", url.to_string())],
                );
                self.send_text(chat_id, &format!("{caption}{link}")).await;
            }
        }
    }

    async fn respond(&self, chat: &mut ChatGuard, language: Language, text: String) {
        chat.append_history(HistoryTurn::user(text.clone()));

        let request = ResponderRequest {
            system_prompt: prompts::system_prompt(
                language,
                &self.settings.brand,
                &self.settings.support_phone,
                self.settings.system_prompt.as_deref(),
            ),
            history: chat.history_window(self.settings.history_window),
            user_text: text,
        };

        let reply = match self.responder.complete(request).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!(chat_id = %chat.chat_id(), "responder returned an empty reply");
                self.send_text(chat.chat_id(), templates::template(language, MessageKey::Apology))
                    .await;
                return;
            }
            Err(e) => {
                warn!(chat_id = %chat.chat_id(), error = %e, "responder failed");
                self.send_text(chat.chat_id(), templates::template(language, MessageKey::Apology))
                    .await;
                return;
            }
        };

        chat.append_history(HistoryTurn::assistant(reply.clone()));
        self.send_text(chat.chat_id(), &reply).await;
    }

    async fn submit_lead(&self, event: &InboundEvent, language: Language, form: CompletedForm) {
        let lead = LeadRecord {
            chat_id: event.chat_id.clone(),
            sender_phone: event.sender_phone.clone(),
            name: form.name,
            company: form.company,
            phone: form.phone,
            task: form.task,
            recorded_at: Utc::now(),
            status: LeadStatus::New,
        };

        match self.storage.save_lead(&lead).await {
            Ok(id) => {
                info!(chat_id = %event.chat_id, lead_id = id, "lead saved");
                let confirmation = self.render(
                    language,
                    MessageKey::Confirmation,
                    &[
                        ("name", lead.name.clone()),
                        ("company", lead.company.clone()),
                        ("phone", lead.phone.clone()),
                        ("task", lead.task.clone()),
                    ],
                );
                self.send_text(&event.chat_id, &confirmation).await;
                self.forward_to_sink(lead);
            }
            Err(e) => {
                error!(chat_id = %event.chat_id, error = %e, "failed to save lead");
                let text = self.render(language, MessageKey::SaveFailed, &[]);
                self.send_text(&event.chat_id, &text).await;
            }
        }
    }

    fn forward_to_sink(&self, lead: LeadRecord) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        tokio::spawn(async move {
            match sink.forward(&lead).await {
                Ok(()) => debug!(chat_id = %lead.chat_id, sink = sink.name(), "lead forwarded"),
                Err(e) => warn!(
                    chat_id = %lead.chat_id,
                    sink = sink.name(),
                    error = %e,
                    "lead sink failed"
                ),
            }
        });
    }

    /// Renders a template with the brand variables plus `vars`.
    fn render(&self, language: Language, key: MessageKey, vars: &[(&str, String)]) -> String {
        let mut all: Vec<(&str, &str)> = vec![
            ("brand", self.settings.brand.as_str()),
            ("support_phone", self.settings.support_phone.as_str()),
        ];
        all.extend(vars.iter().map(|(name, value)| (*name, value.as_str())));
        templates::render(language, key, &all)
    }

    async fn send_text(&self, chat_id: &ChatId, text: &str) {
        if let Err(e) = self.outbound.send_text(chat_id, text).await {
            warn!(chat_id = %chat_id, error = %e, "failed to send text");
        }
    }

    async fn send_interactive_or_text(
        &self,
        chat_id: &ChatId,
        body: &str,
        buttons: &[Button],
        fallback: &str,
    ) {
        if let Err(e) = self.outbound.send_interactive(chat_id, body, buttons).await {
            warn!(chat_id = %chat_id, error = %e, "interactive send failed, falling back to text");
            self.send_text(chat_id, fallback).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use leadwire_config::model::StorageConfig;
    use leadwire_core::{AdapterType, HealthStatus, MessageId, PluginAdapter};
    use leadwire_storage::SqliteStorage;

    use super::*;
    use crate::machine::{FormStep, Phase};

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Text(String),
        Interactive(String, Vec<String>),
        File(String, String),
    }

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<Sent>>,
        fail_interactive: bool,
        fail_files: bool,
    }

    impl Recorder {
        fn take(&self) -> Vec<Sent> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }
    }

    #[async_trait]
    impl PluginAdapter for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Relay
        }
        async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), LeadwireError> {
            Ok(())
        }
    }

    #[async_trait]
    impl OutboundChannel for Recorder {
        async fn send_text(&self, _chat: &ChatId, text: &str) -> Result<(), LeadwireError> {
            self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
            Ok(())
        }
        async fn send_interactive(
            &self,
            _chat: &ChatId,
            body: &str,
            buttons: &[Button],
        ) -> Result<(), LeadwireError> {
            if self.fail_interactive {
                return Err(LeadwireError::relay("interactive unsupported"));
            }
            self.sent.lock().unwrap().push(Sent::Interactive(
                body.to_string(),
                buttons.iter().map(|b| b.id.clone()).collect(),
            ));
            Ok(())
        }
        async fn send_file_by_url(
            &self,
            _chat: &ChatId,
            url: &str,
            _file_name: &str,
            caption: &str,
        ) -> Result<(), LeadwireError> {
            if self.fail_files {
                return Err(LeadwireError::relay("sendFileByUrl returned 500"));
            }
            self.sent
                .lock()
                .unwrap()
                .push(Sent::File(url.to_string(), caption.to_string()));
            Ok(())
        }
    }

    struct Canned(Option<&'static str>);

    #[async_trait]
    impl PluginAdapter for Canned {
        fn name(&self) -> &str {
            "canned"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Responder
        }
        async fn health_check(&self) -> Result<HealthStatus, LeadwireError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), LeadwireError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Responder for Canned {
        async fn complete(&self, request: ResponderRequest) -> Result<String, LeadwireError> {
            assert_eq!(
                request.history.last().map(|t| t.text.as_str()),
                Some(request.user_text.as_str())
            );
            self.0
                .map(str::to_string)
                .ok_or_else(|| LeadwireError::responder("upstream 500"))
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        outbound: Arc<Recorder>,
        storage: Arc<SqliteStorage>,
        controller: DialogueController,
    }

    async fn fixture(outbound: Recorder, reply: Option<&'static str>, price_url: Option<&str>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
        }));
        storage.initialize().await.unwrap();
        let outbound = Arc::new(outbound);
        let store = Arc::new(ConversationStore::new(storage.clone(), 24));
        let settings = DialogSettings {
            brand: "qdigit".into(),
            support_phone: "+7 777 777 77 77".into(),
            price_file_url: price_url.map(str::to_string),
            price_file_name: "price.pdf".into(),
            history_window: 12,
            system_prompt: None,
            admin: AdminPolicy::new(["77776463138"]),
        };
        let controller = DialogueController::new(
            store,
            outbound.clone(),
            Arc::new(Canned(reply)),
            storage.clone(),
            settings,
        );
        Fixture {
            _dir: dir,
            outbound,
            storage,
            controller,
        }
    }

    fn event(content: InboundContent) -> InboundEvent {
        InboundEvent {
            message_id: Some(MessageId("m".into())),
            chat_id: ChatId::from("77001234567@c.us"),
            sender_phone: "77001234567@c.us".into(),
            content,
            raw_payload: serde_json::Value::Null,
        }
    }

    fn say(text: &str) -> InboundEvent {
        event(InboundContent::Text(text.to_string()))
    }

    #[tokio::test]
    async fn language_pick_sends_welcome_menu() {
        let f = fixture(Recorder::default(), Some("hi"), None).await;
        f.controller.handle(&say("2")).await.unwrap();

        let sent = f.outbound.take();
        assert_eq!(sent.len(), 1);
        let Sent::Interactive(body, ids) = &sent[0] else {
            panic!("expected interactive, got {sent:?}");
        };
        assert_eq!(body, templates::template(Language::Kk, MessageKey::Welcome));
        assert_eq!(ids, &["menu_price", "menu_consult", "menu_support"]);

        let languages = f.storage.load_languages().await.unwrap();
        assert_eq!(languages, vec![(ChatId::from("77001234567@c.us"), Language::Kk)]);
    }

    #[tokio::test]
    async fn interactive_failure_falls_back_to_text() {
        let recorder = Recorder {
            fail_interactive: true,
            ..Default::default()
        };
        let f = fixture(recorder, None, None).await;
        f.controller.handle(&say("hello")).await.unwrap();
        assert_eq!(
            f.outbound.take(),
            vec![Sent::Text(templates::LANGUAGE_PROMPT_TEXT.to_string())]
        );
    }

    #[tokio::test]
    async fn unsupported_content_is_dropped() {
        let f = fixture(Recorder::default(), None, None).await;
        f.controller
            .handle(&event(InboundContent::Unsupported {
                message_type: "imageMessage".into(),
            }))
            .await
            .unwrap();
        assert!(f.outbound.take().is_empty());
    }

    #[tokio::test]
    async fn empty_text_prompts_by_language_state() {
        let f = fixture(Recorder::default(), None, None).await;
        f.controller.handle(&say("\u{200b} ")).await.unwrap();
        assert!(matches!(f.outbound.take()[0], Sent::Interactive(..)));

        f.controller.handle(&say("3")).await.unwrap();
        f.outbound.take();
        f.controller.handle(&say("")).await.unwrap();
        assert_eq!(
            f.outbound.take(),
            vec![Sent::Text(templates::template(Language::En, MessageKey::Repeat).into())]
        );
    }

    #[tokio::test]
    async fn price_without_url_notes_missing_file() {
        let f = fixture(Recorder::default(), None, None).await;
        f.controller.handle(&say("1")).await.unwrap();
        f.outbound.take();

        f.controller.handle(&say("сколько стоит?")).await.unwrap();
        let sent = f.outbound.take();
        let [Sent::Text(text)] = sent.as_slice() else {
            panic!("expected one text, got {sent:?}");
        };
        assert!(text.contains("qdigit"));
        assert!(text.ends_with("(Файл прайса пока не подключён.)"));
    }

    #[tokio::test]
    async fn price_file_failure_sends_link() {
        let recorder = Recorder {
            fail_files: true,
            ..Default::default()
        };
        let url = "https://cdn.example.com/price.pdf";
        let f = fixture(recorder, None, Some(url)).await;
        f.controller.handle(&say("3")).await.unwrap();
        f.outbound.take();

        f.controller.handle(&say("price")).await.unwrap();
        let sent = f.outbound.take();
        let [Sent::Text(text)] = sent.as_slice() else {
            panic!("expected one text, got {sent:?}");
        };
        assert!(text.contains(url));
    }

    #[tokio::test]
    async fn responder_reply_is_recorded_in_history() {
        let f = fixture(Recorder::default(), Some("We build bots."), None).await;
        f.controller.handle(&say("3")).await.unwrap();
        f.outbound.take();

        f.controller.handle(&say("what do you do")).await.unwrap();
        assert_eq!(f.outbound.take(), vec![Sent::Text("We build bots.".into())]);

        let conv = f.controller.store().get(&ChatId::from("77001234567@c.us")).await;
        assert_eq!(conv.history.len(), 2);
        assert_eq!(conv.history[1], HistoryTurn::assistant("We build bots."));
    }

    #[tokio::test]
    async fn responder_failure_apologizes_and_keeps_user_turn() {
        let f = fixture(Recorder::default(), None, None).await;
        f.controller.handle(&say("3")).await.unwrap();
        f.outbound.take();

        f.controller.handle(&say("tell me more")).await.unwrap();
        assert_eq!(
            f.outbound.take(),
            vec![Sent::Text(templates::template(Language::En, MessageKey::Apology).into())]
        );
        let conv = f.controller.store().get(&ChatId::from("77001234567@c.us")).await;
        assert_eq!(conv.history, [HistoryTurn::user("tell me more")]);
    }

    #[tokio::test]
    async fn completed_form_saves_lead() {
        let f = fixture(Recorder::default(), None, None).await;
        for text in ["3", "consultation", "Aibek", "-", "+7 700 123 45 67", "CRM bot"] {
            f.controller.handle(&say(text)).await.unwrap();
        }
        let sent = f.outbound.take();
        let Some(Sent::Text(confirmation)) = sent.last() else {
            panic!("expected confirmation, got {sent:?}");
        };
        assert!(confirmation.contains("Name: Aibek"));
        assert!(confirmation.contains("Company: n/a"));

        let leads = f.storage.recent_leads(10).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].phone, "+7 700 123 45 67");
        assert_eq!(leads[0].task, "CRM bot");
        assert_eq!(leads[0].status, LeadStatus::New);

        let conv = f.controller.store().get(&ChatId::from("77001234567@c.us")).await;
        assert_eq!(conv.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn button_during_form_reprompts() {
        let f = fixture(Recorder::default(), None, None).await;
        for text in ["3", "consultation", "Aibek"] {
            f.controller.handle(&say(text)).await.unwrap();
        }
        f.outbound.take();

        f.controller
            .handle(&event(InboundContent::ButtonReply {
                id: "menu_price".into(),
                text: "Pricing".into(),
            }))
            .await
            .unwrap();
        let sent = f.outbound.take();
        let [Sent::Text(text)] = sent.as_slice() else {
            panic!("expected one text, got {sent:?}");
        };
        assert!(text.contains("Aibek"));
        let conv = f.controller.store().get(&ChatId::from("77001234567@c.us")).await;
        assert_eq!(
            conv.phase,
            Phase::FillingForm(FormStep::Company {
                name: "Aibek".into()
            })
        );
    }

    #[tokio::test]
    async fn admin_commands_are_gated() {
        let f = fixture(Recorder::default(), None, None).await;
        f.controller.handle(&say("1")).await.unwrap();
        f.outbound.take();

        f.controller.handle(&say("/reset")).await.unwrap();
        assert_eq!(f.outbound.take(), vec![Sent::Text(admin::DENIED.into())]);
        let conv = f.controller.store().get(&ChatId::from("77001234567@c.us")).await;
        assert_eq!(conv.language, Some(Language::Ru));

        let mut admin_event = say("/clients");
        admin_event.sender_phone = "77776463138@c.us".into();
        f.controller.handle(&admin_event).await.unwrap();
        assert_eq!(f.outbound.take(), vec![Sent::Text(admin::NO_RECORDS.into())]);
    }

    #[tokio::test]
    async fn admin_reset_clears_durable_language() {
        let f = fixture(Recorder::default(), None, None).await;
        let mut first = say("1");
        first.sender_phone = "77776463138@c.us".into();
        f.controller.handle(&first).await.unwrap();
        f.outbound.take();

        let mut reset = say("/reset");
        reset.sender_phone = "+7 777 646 31 38".into();
        f.controller.handle(&reset).await.unwrap();
        assert_eq!(
            f.outbound.take(),
            vec![Sent::Text("✅ История чата очищена".into())]
        );
        assert!(f.storage.load_languages().await.unwrap().is_empty());
        let conv = f.controller.store().get(&ChatId::from("77001234567@c.us")).await;
        assert_eq!(conv.phase, Phase::AwaitingLanguage);
    }
}
