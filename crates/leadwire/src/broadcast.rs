// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadwire broadcast` command implementation.
//!
//! Reads phone numbers from one CSV column, turns each into a relay chat
//! id and sends it a randomly composed outreach message, pausing a random
//! interval between sends.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use leadwire_config::model::LeadwireConfig;
use leadwire_core::{ChatId, LeadwireError, OutboundChannel};
use leadwire_greenapi::GreenApiRelay;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Chat id suffix for personal chats.
const CHAT_SUFFIX: &str = "@c.us";

/// Phones with fewer digits are rejected.
const MIN_PHONE_DIGITS: usize = 7;

const GREETINGS: &[&str] = &[
    "Добрый день! 😊\n\n",
    "Здравствуйте! 😊\n\n",
    "Приветствую! 👋\n\n",
    "Добрый день! 🌿\n\n",
];

const INTROS: &[&str] = &[
    "На связи команда *{brand}*. ",
    "Пишет команда *{brand}* из Казахстана. ",
    "Это команда *{brand}*. ",
];

const OFFERS: &[&str] = &[
    "Мы помогаем бизнесу с WhatsApp-ботами консультантами, автоматизацией записи клиентов и настройкой автоворонок.\n\n",
    "Помогаем компаниям увеличивать поток клиентов через WhatsApp-ботов и автоматизацию.\n\n",
    "Делаем чат-боты, автоворонки, напоминания и онлайн-запись.\n\n",
];

const CALLS_TO_ACTION: &[&str] = &[
    "Если хотите пример под ваш бизнес, давайте созвонимся: менеджер подберёт подходящий сценарий 🔥",
    "Готовы помочь с проектом: можем назначить консультацию, менеджер всё расскажет и подберёт решение 😊",
    "Если хотите посмотреть, как это работает, запишитесь на консультацию, и наш менеджер свяжется с вами 🙌",
];

#[derive(Debug, Clone)]
pub struct BroadcastOptions {
    pub csv: PathBuf,
    /// Overrides `broadcast.phone_column`.
    pub column: Option<String>,
    pub dry_run: bool,
    pub shuffle: bool,
}

/// Totals printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    /// Rejected phones plus failed sends.
    pub failed: usize,
}

/// Converts a raw phone cell into a chat id.
///
/// Values that already end in `@c.us` pass through; anything else keeps
/// its digits and needs at least seven of them.
pub fn normalize_chat_id(raw: &str) -> Option<ChatId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.ends_with(CHAT_SUFFIX) {
        return Some(ChatId::from(raw));
    }
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return None;
    }
    Some(ChatId(format!("{digits}{CHAT_SUFFIX}")))
}

/// Composes greeting, intro, offer and call to action, one of each at random.
pub fn compose_message<R: Rng + ?Sized>(brand: &str, rng: &mut R) -> String {
    let pick = |options: &[&'static str], rng: &mut R| -> &'static str {
        options.choose(rng).copied().unwrap_or_default()
    };
    let greeting = pick(GREETINGS, rng);
    let intro = pick(INTROS, rng).replace("{brand}", brand);
    let offer = pick(OFFERS, rng);
    let cta = pick(CALLS_TO_ACTION, rng);
    format!("{greeting}{intro}{offer}{cta}")
}

/// Reads the `column` values of a CSV file with a header row.
pub fn read_phones(path: &Path, column: &str) -> Result<Vec<String>, LeadwireError> {
    let file = std::fs::File::open(path).map_err(|e| {
        LeadwireError::Config(format!("cannot open {}: {e}", path.display()))
    })?;
    read_phones_from(file, column)
}

fn read_phones_from<R: std::io::Read>(reader: R, column: &str) -> Result<Vec<String>, LeadwireError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| LeadwireError::Config(format!("invalid CSV header: {e}")))?;
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| LeadwireError::Config(format!("CSV has no column '{column}'")))?;

    let mut phones = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LeadwireError::Config(format!("invalid CSV row: {e}")))?;
        phones.push(record.get(index).unwrap_or_default().to_string());
    }
    Ok(phones)
}

/// Sends outreach messages through a relay with randomized pauses.
pub struct Broadcaster {
    outbound: Arc<dyn OutboundChannel>,
    brand: String,
    min_delay: Duration,
    max_delay: Duration,
    dry_run: bool,
}

impl Broadcaster {
    pub fn new(
        outbound: Arc<dyn OutboundChannel>,
        brand: impl Into<String>,
        min_delay: Duration,
        max_delay: Duration,
        dry_run: bool,
    ) -> Self {
        Self {
            outbound,
            brand: brand.into(),
            min_delay,
            max_delay: max_delay.max(min_delay),
            dry_run,
        }
    }

    /// Contacts every phone in order; bad phones count as failed.
    pub async fn run<R: Rng + Send>(&self, phones: &[String], rng: &mut R) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for raw in phones {
            let Some(chat) = normalize_chat_id(raw) else {
                println!("[SKIP] bad phone: {raw}");
                report.failed += 1;
                continue;
            };

            let message = compose_message(&self.brand, rng);
            let preview: String = message.chars().take(50).collect();
            println!("[SEND] {chat} → {preview}...");

            if self.dry_run {
                report.sent += 1;
                continue;
            }

            match self.outbound.send_text(&chat, &message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(chat_id = %chat, error = %e, "broadcast send failed");
                    report.failed += 1;
                }
            }

            let pause = self.pause(rng);
            tokio::time::sleep(pause).await;
        }

        report
    }

    fn pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rng.gen_range(self.min_delay..=self.max_delay)
    }
}

/// Runs the `leadwire broadcast` command.
pub async fn run_broadcast(
    config: &LeadwireConfig,
    options: BroadcastOptions,
) -> Result<(), LeadwireError> {
    let column = options
        .column
        .unwrap_or_else(|| config.broadcast.phone_column.clone());
    let mut phones = read_phones(&options.csv, &column)?;

    let mut rng = rand::rngs::StdRng::from_entropy();
    if options.shuffle {
        phones.shuffle(&mut rng);
    }
    info!(count = phones.len(), dry_run = options.dry_run, "starting broadcast");

    let relay = Arc::new(GreenApiRelay::new(config)?);
    let broadcaster = Broadcaster::new(
        relay,
        config.brand.name.clone(),
        Duration::from_secs(config.broadcast.min_delay_secs),
        Duration::from_secs(config.broadcast.max_delay_secs),
        options.dry_run,
    );
    let report = broadcaster.run(&phones, &mut rng).await;

    println!("\nDone 👍\nSent: {}\nFailed: {}", report.sent, report.failed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use leadwire_test_utils::{MockRelay, SentMessage};
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn normalize_keeps_digits() {
        assert_eq!(
            normalize_chat_id("+7 (701) 123-45-67"),
            Some(ChatId::from("77011234567@c.us"))
        );
        assert_eq!(
            normalize_chat_id(" 87011234567 "),
            Some(ChatId::from("87011234567@c.us"))
        );
    }

    #[test]
    fn normalize_accepts_ready_chat_ids() {
        assert_eq!(
            normalize_chat_id("77011234567@c.us"),
            Some(ChatId::from("77011234567@c.us"))
        );
    }

    #[test]
    fn normalize_rejects_short_and_empty() {
        assert_eq!(normalize_chat_id(""), None);
        assert_eq!(normalize_chat_id("   "), None);
        assert_eq!(normalize_chat_id("12-34-5"), None);
        assert_eq!(normalize_chat_id("n/a"), None);
        assert!(normalize_chat_id("1234567").is_some());
    }

    #[test]
    fn composed_message_has_every_part() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let message = compose_message("Acme", &mut rng);
            assert!(GREETINGS.iter().any(|g| message.starts_with(g)));
            assert!(message.contains("*Acme*"));
            assert!(!message.contains("{brand}"));
            assert!(OFFERS.iter().any(|o| message.contains(o)));
            assert!(CALLS_TO_ACTION.iter().any(|c| message.ends_with(c)));
        }
    }

    #[test]
    fn reads_named_column() {
        let csv = "Имя,Номер\nАлия,+7 701 111 22 33\nБолат,\nДана,77012223344@c.us\n";
        let phones = read_phones_from(csv.as_bytes(), "Номер").unwrap();
        assert_eq!(phones, vec!["+7 701 111 22 33", "", "77012223344@c.us"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = read_phones_from("Name,Phone\nA,1\n".as_bytes(), "Номер").unwrap_err();
        assert!(err.to_string().contains("Номер"));
    }

    #[tokio::test]
    async fn sends_and_counts() {
        let relay = Arc::new(MockRelay::new());
        let broadcaster = Broadcaster::new(
            relay.clone(),
            "Acme",
            Duration::ZERO,
            Duration::ZERO,
            false,
        );
        let phones = vec![
            "+7 701 111 22 33".to_string(),
            "123".to_string(),
            "77012223344@c.us".to_string(),
        ];

        let report = broadcaster
            .run(&phones, &mut StdRng::seed_from_u64(1))
            .await;
        assert_eq!(report, BroadcastReport { sent: 2, failed: 1 });

        let sent = relay.sent_messages().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].chat(), &ChatId::from("77011112233@c.us"));
        assert!(matches!(sent[1], SentMessage::Text { .. }));
        assert!(sent[1].text().contains("*Acme*"));
    }

    #[tokio::test]
    async fn send_failures_are_counted() {
        let relay = Arc::new(MockRelay::new());
        relay.fail_text(true);
        let broadcaster =
            Broadcaster::new(relay.clone(), "Acme", Duration::ZERO, Duration::ZERO, false);

        let report = broadcaster
            .run(&["77011112233".to_string()], &mut StdRng::seed_from_u64(1))
            .await;
        assert_eq!(report, BroadcastReport { sent: 0, failed: 1 });
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let relay = Arc::new(MockRelay::new());
        let broadcaster = Broadcaster::new(
            relay.clone(),
            "Acme",
            Duration::from_secs(3600),
            Duration::from_secs(3600),
            true,
        );

        let report = broadcaster
            .run(&["77011112233".to_string()], &mut StdRng::seed_from_u64(1))
            .await;
        assert_eq!(report.sent, 1);
        assert!(relay.sent_messages().await.is_empty());
    }

    #[test]
    fn pause_stays_in_range() {
        let relay = Arc::new(MockRelay::new());
        let broadcaster = Broadcaster::new(
            relay,
            "Acme",
            Duration::from_secs(15),
            Duration::from_secs(35),
            false,
        );
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let pause = broadcaster.pause(&mut rng);
            assert!(pause >= Duration::from_secs(15) && pause <= Duration::from_secs(35));
        }
    }
}
