// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based intent classification.
//!
//! Structured intents use case-folded substring matching against ordered,
//! per-language keyword lists. Matching is not tokenized, so a short keyword
//! can fire inside a longer word; that is the expected behaviour.

use leadwire_core::Language;
use strum::Display;

/// Classified purpose of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    Greeting,
    PriceRequest,
    SupportRequest,
    ConsultationRequest,
    FreeText,
}

const PRICE_RU: &[&str] = &[
    "цена",
    "стоимость",
    "прайс",
    "сколько стоит",
    "прайслист",
    "прайс-лист",
    "ценник",
];
const PRICE_KK: &[&str] = &["баға", "құны", "прайс"];
const PRICE_EN: &[&str] = &["price", "pricing", "cost", "how much", "pricelist"];

const SUPPORT_RU: &[&str] = &[
    "поддержк",
    "саппорт",
    "техпод",
    "help",
    "support",
    "помощь",
    "свяжитесь",
];
const SUPPORT_KK: &[&str] = &["қолдау", "көмек", "support"];
const SUPPORT_EN: &[&str] = &["support", "help", "contact", "assist"];

const CONSULT_RU: &[&str] = &[
    "записаться",
    "консультац",
    "созвон",
    "перезвон",
    "запишите меня",
];
const CONSULT_KK: &[&str] = &["жазылу", "кеңес", "қоңырау", "жазыңыз мені"];
const CONSULT_EN: &[&str] = &["schedule", "consultation", "appointment", "call me", "book"];

/// Greetings in every supported language, matched whole.
const GREETINGS: &[&str] = &[
    // ru
    "привет",
    "здравствуй",
    "здравствуйте",
    "салам",
    "здорово",
    "добрый день",
    "добрый вечер",
    "доброе утро",
    "прив",
    "здраст",
    "дратути",
    "хай",
    "приветик",
    "приветствую",
    // kk
    "сәлем",
    "сәлеметсіз бе",
    "қайырлы таң",
    "қайырлы күн",
    "қайырлы кеш",
    // en
    "hi",
    "hello",
    "hey",
    "good morning",
    "good day",
    "good evening",
    "greetings",
    "hiya",
    "howdy",
];

/// Keyword lists for `language`, in priority order.
fn keyword_table(language: Language) -> [(Intent, &'static [&'static str]); 3] {
    match language {
        Language::Ru => [
            (Intent::PriceRequest, PRICE_RU),
            (Intent::SupportRequest, SUPPORT_RU),
            (Intent::ConsultationRequest, CONSULT_RU),
        ],
        Language::Kk => [
            (Intent::PriceRequest, PRICE_KK),
            (Intent::SupportRequest, SUPPORT_KK),
            (Intent::ConsultationRequest, CONSULT_KK),
        ],
        Language::En => [
            (Intent::PriceRequest, PRICE_EN),
            (Intent::SupportRequest, SUPPORT_EN),
            (Intent::ConsultationRequest, CONSULT_EN),
        ],
    }
}

/// Exact match, or match after dropping `!` and `,`, against every greeting set.
pub fn is_greeting(text: &str) -> bool {
    let folded = text.trim().to_lowercase();
    if GREETINGS.contains(&folded.as_str()) {
        return true;
    }
    let stripped: String = folded.chars().filter(|c| *c != '!' && *c != ',').collect();
    GREETINGS.contains(&stripped.trim())
}

/// Classifies `text` with priority Price > Support > Consultation > Greeting > FreeText.
///
/// Without a language only [`Intent::Greeting`] and [`Intent::FreeText`] are possible.
pub fn classify(text: &str, language: Option<Language>) -> Intent {
    if let Some(language) = language {
        let folded = text.to_lowercase();
        for (intent, keywords) in keyword_table(language) {
            if keywords.iter().any(|k| folded.contains(k)) {
                return intent;
            }
        }
    }
    if is_greeting(text) {
        Intent::Greeting
    } else {
        Intent::FreeText
    }
}
