// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `(language, key) -> template` lookup for every user-facing reply.
//!
//! Templates use `{name}` placeholders filled by [`render`]. Adding a
//! language means adding rows here, not branches in the controller.

use std::collections::HashMap;
use std::sync::LazyLock;

use leadwire_core::{Button, Language};
use strum::{Display, EnumIter};

/// Identifies one reply independent of language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum MessageKey {
    Welcome,
    AskName,
    ReaskName,
    AskCompany,
    AskPhone,
    ReaskPhone,
    AskTask,
    Confirmation,
    SaveFailed,
    Support,
    PriceCaption,
    PriceLinkFallback,
    PriceNotConnected,
    Apology,
    Repeat,
    ResetDone,
    MenuPrice,
    MenuConsult,
    MenuSupport,
}

/// Button id of the price menu entry.
pub const MENU_PRICE: &str = "menu_price";
/// Button id of the consultation menu entry.
pub const MENU_CONSULT: &str = "menu_consult";
/// Button id of the support menu entry.
pub const MENU_SUPPORT: &str = "menu_support";

/// Trilingual language prompt body used for the interactive message.
pub const LANGUAGE_PROMPT_BODY: &str =
    "👋 Выберите язык общения\nҚарым-қатынас тілін таңдаңыз\nChoose your language";

/// Plain-text language prompt used when buttons cannot be delivered.
pub const LANGUAGE_PROMPT_TEXT: &str = "👋 *Выберите язык общения*\n\
🇰🇿 *Қарым-қатынас тілін таңдаңыз*\n\
🇬🇧 *Choose your language*\n\n\
1️⃣ Русский 🇷🇺\n\
2️⃣ Қазақша 🇰🇿\n\
3️⃣ English 🇬🇧\n\n\
_Напишите цифру / Санды жазыңыз / Type number_";

static TEMPLATES: LazyLock<HashMap<(Language, MessageKey), &'static str>> = LazyLock::new(|| {
    use Language::{En, Kk, Ru};
    use MessageKey::*;

    HashMap::from([
        (
            (Ru, Welcome),
            "✅ *Отлично!* 🎉\n\nЯ помогу с ботами и автоматизацией бизнеса.\n\n*Что я умею:*\n• Рассказать о возможностях\n• Посчитать стоимость\n• Записать на консультацию\n\nЧто вас интересует? 😊",
        ),
        (
            (Kk, Welcome),
            "✅ *Тамаша!* 🎉\n\nМен боттар мен бизнес автоматтандыруы бойынша көмектесемін.\n\n*Не істей аламын:*\n• Мүмкіндіктер туралы айту\n• Құнды есептеу\n• Кеңеске жазу\n\nСізді не қызықтырады? 😊",
        ),
        (
            (En, Welcome),
            "✅ *Great!* 🎉\n\nI'll help with bots and business automation.\n\n*What I can do:*\n• Tell you about capabilities\n• Calculate costs\n• Schedule a consultation\n\nWhat are you interested in? 😊",
        ),
        (
            (Ru, AskName),
            "Отлично! Запишу вас на бесплатную консультацию 🙂\n\nКак вас зовут?",
        ),
        (
            (Kk, AskName),
            "Тамаша! Сізді тегін кеңеске жазамын 🙂\n\nАтыңыз кім?",
        ),
        (
            (En, AskName),
            "Great! I'll book you a free consultation 🙂\n\nWhat is your name?",
        ),
        ((Ru, ReaskName), "Пожалуйста, напишите имя (минимум 2 символа)."),
        ((Kk, ReaskName), "Атыңызды жазыңыз (кемінде 2 таңба)."),
        ((En, ReaskName), "Please write your name (at least 2 characters)."),
        (
            (Ru, AskCompany),
            "Приятно познакомиться, {name}! Как называется ваша компания? Если компании нет, напишите «-».",
        ),
        (
            (Kk, AskCompany),
            "Танысқаныма қуаныштымын, {name}! Компанияңыздың атауы қандай? Компания жоқ болса, «-» деп жазыңыз.",
        ),
        (
            (En, AskCompany),
            "Nice to meet you, {name}! What is your company called? If you have none, send \"-\".",
        ),
        ((Ru, AskPhone), "Оставьте номер телефона для связи 📱"),
        ((Kk, AskPhone), "Байланыс үшін телефон нөміріңізді қалдырыңыз 📱"),
        ((En, AskPhone), "Please share a phone number we can reach you on 📱"),
        (
            (Ru, ReaskPhone),
            "В номере меньше 7 цифр. Пришлите номер полностью, например +7 777 123 45 67.",
        ),
        (
            (Kk, ReaskPhone),
            "Нөмірде 7 цифрдан аз. Толық нөмірді жіберіңіз, мысалы +7 777 123 45 67.",
        ),
        (
            (En, ReaskPhone),
            "That number has fewer than 7 digits. Please send the full number, e.g. +7 777 123 45 67.",
        ),
        ((Ru, AskTask), "Последний шаг: коротко опишите задачу 🧩"),
        ((Kk, AskTask), "Соңғы қадам: міндетті қысқаша сипаттаңыз 🧩"),
        ((En, AskTask), "Last step: briefly describe your task 🧩"),
        (
            (Ru, Confirmation),
            "✅ Записал вас на бесплатную консультацию!\n\n👤 Имя: {name}\n🏢 Компания: {company}\n📱 Телефон: {phone}\n🧩 Задача: {task}\n\nСвяжемся в ближайшее время. Предпочтительнее звонок или WhatsApp? 🙂",
        ),
        (
            (Kk, Confirmation),
            "✅ Сізді тегін кеңеске жаздым!\n\n👤 Аты: {name}\n🏢 Компания: {company}\n📱 Телефон: {phone}\n🧩 Міндет: {task}\n\nЖақын арада хабарласамыз. Қоңырау немесе WhatsApp артық па? 🙂",
        ),
        (
            (En, Confirmation),
            "✅ Scheduled you for a free consultation!\n\n👤 Name: {name}\n🏢 Company: {company}\n📱 Phone: {phone}\n🧩 Task: {task}\n\nWe'll contact you soon. Do you prefer call or WhatsApp? 🙂",
        ),
        (
            (Ru, SaveFailed),
            "Не удалось сохранить заявку 😔 Попробуйте ещё раз позже или напишите нам: {support_phone}",
        ),
        (
            (Kk, SaveFailed),
            "Өтінімді сақтау мүмкін болмады 😔 Кейінірек қайталаңыз немесе бізге жазыңыз: {support_phone}",
        ),
        (
            (En, SaveFailed),
            "We couldn't save your request 😔 Please try again later or message us: {support_phone}",
        ),
        (
            (Ru, Support),
            "Наш номер поддержки: {support_phone}\nНапишите в WhatsApp — быстро ответим. 📞",
        ),
        (
            (Kk, Support),
            "Біздің қолдау нөмірі: {support_phone}\nWhatsApp-қа жазыңыз — жылдам жауап береміз. 📞",
        ),
        (
            (En, Support),
            "Our support number: {support_phone}\nWrite on WhatsApp — we’ll reply quickly. 📞",
        ),
        (
            (Ru, PriceCaption),
            "Отправляю актуальный прайс {brand}. Если нужен расчёт под вашу задачу — напишите нишу и сроки 🙂",
        ),
        (
            (Kk, PriceCaption),
            "{brand} бағалар тізімін жіберемін. Нақты есеп керек болса — сала мен мерзімдерді жазыңыз 🙂",
        ),
        (
            (En, PriceCaption),
            "Sharing {brand} pricing file. For a tailored estimate, tell your niche and timeline 🙂",
        ),
        (
            (Ru, PriceLinkFallback),
            "\n\n(Не удалось отправить файл. Вот ссылка: {url})",
        ),
        (
            (Kk, PriceLinkFallback),
            "\n\n(Файлды жіберу мүмкін болмады. Сілтеме: {url})",
        ),
        (
            (En, PriceLinkFallback),
            "\n\n(Couldn't send the file. Here is the link: {url})",
        ),
        ((Ru, PriceNotConnected), "\n\n(Файл прайса пока не подключён.)"),
        ((Kk, PriceNotConnected), "\n\n(Прайс файлы әлі қосылмаған.)"),
        ((En, PriceNotConnected), "\n\n(The price file is not connected yet.)"),
        (
            (Ru, Apology),
            "Простите, произошёл технический сбой. Попробуйте ещё раз через минуту 🙏",
        ),
        (
            (Kk, Apology),
            "Кешіріңіз, техникалық ақау орын алды. Бір минуттан кейін қайталап көріңіз 🙏",
        ),
        (
            (En, Apology),
            "Sorry, a technical error occurred. Please try again in a minute 🙏",
        ),
        (
            (Ru, Repeat),
            "Не расслышал сообщение. Напишите, пожалуйста, ещё раз 🙂",
        ),
        ((Kk, Repeat), "Хабарламаны түсінбедім. Қайта жазыңызшы 🙂"),
        ((En, Repeat), "I didn't catch that. Please write again 🙂"),
        ((Ru, ResetDone), "✅ История чата очищена"),
        ((Kk, ResetDone), "✅ Чат тарихы тазаланды"),
        ((En, ResetDone), "✅ Chat history cleared"),
        ((Ru, MenuPrice), "💰 Прайс"),
        ((Kk, MenuPrice), "💰 Баға"),
        ((En, MenuPrice), "💰 Pricing"),
        ((Ru, MenuConsult), "📅 Консультация"),
        ((Kk, MenuConsult), "📅 Кеңес"),
        ((En, MenuConsult), "📅 Consultation"),
        ((Ru, MenuSupport), "🛟 Поддержка"),
        ((Kk, MenuSupport), "🛟 Қолдау"),
        ((En, MenuSupport), "🛟 Support"),
    ])
});

/// Raw template text. Falls back to English if a row is missing.
pub fn template(language: Language, key: MessageKey) -> &'static str {
    TEMPLATES
        .get(&(language, key))
        .or_else(|| TEMPLATES.get(&(Language::En, key)))
        .copied()
        .unwrap_or_default()
}

/// Renders `key` for `language`, substituting each `{name}` from `vars`.
pub fn render(language: Language, key: MessageKey, vars: &[(&str, &str)]) -> String {
    let mut text = template(language, key).to_string();
    for (name, value) in vars {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

/// Buttons shown with the welcome message.
pub fn menu_buttons(language: Language) -> Vec<Button> {
    vec![
        Button::new(MENU_PRICE, template(language, MessageKey::MenuPrice)),
        Button::new(MENU_CONSULT, template(language, MessageKey::MenuConsult)),
        Button::new(MENU_SUPPORT, template(language, MessageKey::MenuSupport)),
    ]
}

/// Buttons shown with the language prompt.
pub fn language_buttons() -> Vec<Button> {
    vec![
        Button::new(Language::Ru.button_id(), "🇷🇺 Русский"),
        Button::new(Language::Kk.button_id(), "🇰🇿 Қазақша"),
        Button::new(Language::En.button_id(), "🇬🇧 English"),
    ]
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_key_has_every_language() {
        for language in Language::iter() {
            for key in MessageKey::iter() {
                assert!(
                    TEMPLATES.contains_key(&(language, key)),
                    "missing template {key} for {language}"
                );
            }
        }
    }

    #[test]
    fn render_substitutes_placeholders() {
        let text = render(
            Language::En,
            MessageKey::Support,
            &[("support_phone", "+7 700 000 00 00")],
        );
        assert!(text.starts_with("Our support number: +7 700 000 00 00\n"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn render_fills_confirmation() {
        let text = render(
            Language::Ru,
            MessageKey::Confirmation,
            &[
                ("name", "Aibek"),
                ("company", "n/a"),
                ("phone", "+7 777 111 22 33"),
                ("task", "chatbot"),
            ],
        );
        assert!(text.contains("👤 Имя: Aibek"));
        assert!(text.contains("🏢 Компания: n/a"));
        assert!(text.contains("📱 Телефон: +7 777 111 22 33"));
        assert!(text.contains("🧩 Задача: chatbot"));
    }

    #[test]
    fn language_buttons_use_language_ids() {
        let ids: Vec<String> = language_buttons().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["lang_ru", "lang_kk", "lang_en"]);
    }

    #[test]
    fn menu_buttons_are_localized() {
        let menu = menu_buttons(Language::Kk);
        assert_eq!(menu.len(), 3);
        assert_eq!(menu[0].id, MENU_PRICE);
        assert_eq!(menu[2].text, "🛟 Қолдау");
    }

    #[test]
    fn plain_language_prompt_lists_digits() {
        assert!(LANGUAGE_PROMPT_TEXT.contains("1️⃣ Русский"));
        assert!(LANGUAGE_PROMPT_TEXT.contains("3️⃣ English"));
    }
}
