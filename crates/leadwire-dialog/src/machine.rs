// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure dialogue transitions.
//!
//! [`decide`] maps the current phase and one input to the next phase plus
//! the effects the controller must carry out. It performs no IO, so every
//! row of the transition table is unit-testable.
//!
//! The form draft lives inside [`Phase::FillingForm`]: leaving the form in
//! any way drops the collected fields.

use leadwire_core::Language;

use crate::classifier::{self, Intent};
use crate::templates::{MENU_CONSULT, MENU_PRICE, MENU_SUPPORT, MessageKey};
use crate::text;

/// Minimum characters for a name.
pub const MIN_NAME_CHARS: usize = 2;
/// Minimum digits for a phone number.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Lead-capture form step, carrying the answers collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStep {
    Name,
    Company {
        name: String,
    },
    Phone {
        name: String,
        company: String,
    },
    Task {
        name: String,
        company: String,
        phone: String,
    },
}

impl FormStep {
    /// 1-based step number.
    pub fn number(&self) -> u8 {
        match self {
            FormStep::Name => 1,
            FormStep::Company { .. } => 2,
            FormStep::Phone { .. } => 3,
            FormStep::Task { .. } => 4,
        }
    }

    /// Prompt asking for this step's answer.
    fn prompt(&self) -> Effect {
        match self {
            FormStep::Name => Effect::say(MessageKey::AskName),
            FormStep::Company { name } => Effect::Say {
                key: MessageKey::AskCompany,
                vars: vec![("name", name.clone())],
            },
            FormStep::Phone { .. } => Effect::say(MessageKey::AskPhone),
            FormStep::Task { .. } => Effect::say(MessageKey::AskTask),
        }
    }
}

/// Dialogue phase of one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    AwaitingLanguage,
    Idle,
    FillingForm(FormStep),
}

impl Phase {
    /// Form step number while filling the form.
    pub fn form_step(&self) -> Option<u8> {
        match self {
            Phase::FillingForm(step) => Some(step.number()),
            _ => None,
        }
    }
}

/// One decoded user input, after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Non-empty normalized text.
    Text(String),
    /// Text that normalized to nothing.
    Empty,
    /// An interactive button press.
    Button { id: String },
}

/// A completed consultation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedForm {
    pub name: String,
    pub company: String,
    pub phone: String,
    pub task: String,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Interactive language prompt, with plain-text fallback.
    SendLanguagePrompt,
    /// Persist the language, then send welcome and menu in it.
    SelectLanguage(Language),
    /// Send a template in the chat language.
    Say {
        key: MessageKey,
        vars: Vec<(&'static str, String)>,
    },
    /// Send the price file, or its fallbacks.
    DeliverPrice,
    /// Ask the generative responder about this text.
    Respond(String),
    /// Save the lead and confirm it.
    SubmitLead(CompletedForm),
}

impl Effect {
    pub fn say(key: MessageKey) -> Self {
        Effect::Say { key, vars: Vec::new() }
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Phase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(phase: &Phase, effects: Vec<Effect>) -> Self {
        Self {
            next: phase.clone(),
            effects,
        }
    }

    fn to(next: Phase, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }
}

/// Computes the next phase and the effects for one input.
pub fn decide(phase: &Phase, language: Option<Language>, input: &Input) -> Transition {
    match phase {
        Phase::AwaitingLanguage => awaiting_language(phase, input),
        Phase::Idle => idle(phase, language, input),
        Phase::FillingForm(step) => filling_form(phase, step, input),
    }
}

fn awaiting_language(phase: &Phase, input: &Input) -> Transition {
    let chosen = match input {
        Input::Text(text) => Language::from_digit(text),
        Input::Button { id } => Language::from_button_id(id),
        Input::Empty => None,
    };
    if let Some(language) = chosen {
        return Transition::to(Phase::Idle, vec![Effect::SelectLanguage(language)]);
    }
    match input {
        Input::Empty => Transition::stay(phase, vec![Effect::SendLanguagePrompt]),
        Input::Text(text) if classifier::is_greeting(text) => {
            Transition::stay(phase, vec![Effect::SendLanguagePrompt])
        }
        _ => Transition::stay(phase, Vec::new()),
    }
}

fn idle(phase: &Phase, language: Option<Language>, input: &Input) -> Transition {
    match input {
        Input::Empty => Transition::stay(phase, vec![Effect::say(MessageKey::Repeat)]),
        Input::Button { id } => {
            if let Some(language) = Language::from_button_id(id) {
                return Transition::to(Phase::Idle, vec![Effect::SelectLanguage(language)]);
            }
            match id.as_str() {
                MENU_PRICE => Transition::stay(phase, vec![Effect::DeliverPrice]),
                MENU_SUPPORT => Transition::stay(phase, vec![Effect::say(MessageKey::Support)]),
                MENU_CONSULT => start_form(),
                _ => Transition::stay(phase, Vec::new()),
            }
        }
        Input::Text(text) => match classifier::classify(text, language) {
            Intent::PriceRequest => Transition::stay(phase, vec![Effect::DeliverPrice]),
            Intent::SupportRequest => {
                Transition::stay(phase, vec![Effect::say(MessageKey::Support)])
            }
            Intent::ConsultationRequest => start_form(),
            Intent::Greeting | Intent::FreeText => {
                Transition::stay(phase, vec![Effect::Respond(text.clone())])
            }
        },
    }
}

fn start_form() -> Transition {
    let step = FormStep::Name;
    let prompt = step.prompt();
    Transition::to(Phase::FillingForm(step), vec![prompt])
}

fn advance(step: FormStep) -> Transition {
    let prompt = step.prompt();
    Transition::to(Phase::FillingForm(step), vec![prompt])
}

fn filling_form(phase: &Phase, step: &FormStep, input: &Input) -> Transition {
    // An empty company answer stands for "no company"; elsewhere empty
    // input gets the generic repeat request.
    let answer = match (input, step) {
        (Input::Text(text), _) => text.as_str(),
        (Input::Empty, FormStep::Company { .. }) => "",
        (Input::Empty, _) => {
            return Transition::stay(phase, vec![Effect::say(MessageKey::Repeat)]);
        }
        (Input::Button { .. }, _) => return Transition::stay(phase, vec![step.prompt()]),
    };

    match step {
        FormStep::Name => {
            let name = answer.trim();
            if name.chars().count() < MIN_NAME_CHARS {
                Transition::stay(phase, vec![Effect::say(MessageKey::ReaskName)])
            } else {
                advance(FormStep::Company {
                    name: name.to_string(),
                })
            }
        }
        FormStep::Company { name } => advance(FormStep::Phone {
            name: name.clone(),
            company: text::company_or_placeholder(answer),
        }),
        FormStep::Phone { name, company } => {
            if text::digit_count(answer) < MIN_PHONE_DIGITS {
                Transition::stay(phase, vec![Effect::say(MessageKey::ReaskPhone)])
            } else {
                advance(FormStep::Task {
                    name: name.clone(),
                    company: company.clone(),
                    phone: answer.trim().to_string(),
                })
            }
        }
        FormStep::Task {
            name,
            company,
            phone,
        } => Transition::to(
            Phase::Idle,
            vec![Effect::SubmitLead(CompletedForm {
                name: name.clone(),
                company: company.clone(),
                phone: phone.clone(),
                task: answer.trim().to_string(),
            })],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(s: &str) -> Input {
        Input::Text(s.to_string())
    }

    fn button(id: &str) -> Input {
        Input::Button { id: id.to_string() }
    }

    #[test]
    fn digit_selects_language() {
        let t = decide(&Phase::AwaitingLanguage, None, &text("1"));
        assert_eq!(t.next, Phase::Idle);
        assert_eq!(t.effects, vec![Effect::SelectLanguage(Language::Ru)]);

        let t = decide(&Phase::AwaitingLanguage, None, &text("3"));
        assert_eq!(t.effects, vec![Effect::SelectLanguage(Language::En)]);
    }

    #[test]
    fn language_button_selects_language() {
        let t = decide(&Phase::AwaitingLanguage, None, &button("lang_kk"));
        assert_eq!(t.next, Phase::Idle);
        assert_eq!(t.effects, vec![Effect::SelectLanguage(Language::Kk)]);
    }

    #[test]
    fn greeting_before_language_sends_prompt() {
        let t = decide(&Phase::AwaitingLanguage, None, &text("Hello!"));
        assert_eq!(t.next, Phase::AwaitingLanguage);
        assert_eq!(t.effects, vec![Effect::SendLanguagePrompt]);
    }

    #[test]
    fn other_text_before_language_is_ignored() {
        for input in [text("4"), text("0"), text("what do you sell"), button("menu_price")] {
            let t = decide(&Phase::AwaitingLanguage, None, &input);
            assert_eq!(t.next, Phase::AwaitingLanguage, "{input:?}");
            assert!(t.effects.is_empty(), "{input:?}");
        }
    }

    #[test]
    fn empty_input_before_language_reprompts() {
        let t = decide(&Phase::AwaitingLanguage, None, &Input::Empty);
        assert_eq!(t.effects, vec![Effect::SendLanguagePrompt]);
    }

    #[test]
    fn idle_routes_intents() {
        let ru = Some(Language::Ru);
        assert_eq!(
            decide(&Phase::Idle, ru, &text("цена?")).effects,
            vec![Effect::DeliverPrice]
        );
        assert_eq!(
            decide(&Phase::Idle, ru, &text("нужна поддержка")).effects,
            vec![Effect::say(MessageKey::Support)]
        );
        assert_eq!(
            decide(&Phase::Idle, ru, &text("расскажите о ботах")).effects,
            vec![Effect::Respond("расскажите о ботах".into())]
        );
    }

    #[test]
    fn consultation_starts_form() {
        let t = decide(&Phase::Idle, Some(Language::Ru), &text("хочу консультацию"));
        assert_eq!(t.next, Phase::FillingForm(FormStep::Name));
        assert_eq!(t.effects, vec![Effect::say(MessageKey::AskName)]);
        assert_eq!(t.next.form_step(), Some(1));
    }

    #[test]
    fn menu_buttons_route_in_idle() {
        let en = Some(Language::En);
        assert_eq!(
            decide(&Phase::Idle, en, &button(MENU_PRICE)).effects,
            vec![Effect::DeliverPrice]
        );
        assert_eq!(
            decide(&Phase::Idle, en, &button(MENU_CONSULT)).next,
            Phase::FillingForm(FormStep::Name)
        );
        assert_eq!(
            decide(&Phase::Idle, en, &button(MENU_SUPPORT)).effects,
            vec![Effect::say(MessageKey::Support)]
        );
        assert!(decide(&Phase::Idle, en, &button("unknown")).effects.is_empty());
    }

    #[test]
    fn language_button_in_idle_switches_language() {
        let t = decide(&Phase::Idle, Some(Language::Ru), &button("lang_en"));
        assert_eq!(t.next, Phase::Idle);
        assert_eq!(t.effects, vec![Effect::SelectLanguage(Language::En)]);
    }

    #[test]
    fn short_name_is_rejected() {
        let phase = Phase::FillingForm(FormStep::Name);
        let t = decide(&phase, Some(Language::Ru), &text("A"));
        assert_eq!(t.next, phase);
        assert_eq!(t.effects, vec![Effect::say(MessageKey::ReaskName)]);

        let t = decide(&phase, Some(Language::Ru), &text("Aibek"));
        assert_eq!(
            t.next,
            Phase::FillingForm(FormStep::Company {
                name: "Aibek".into()
            })
        );
        assert_eq!(
            t.effects,
            vec![Effect::Say {
                key: MessageKey::AskCompany,
                vars: vec![("name", "Aibek".into())]
            }]
        );
    }

    #[test]
    fn company_dash_becomes_placeholder() {
        let phase = Phase::FillingForm(FormStep::Company {
            name: "Aibek".into(),
        });
        let t = decide(&phase, Some(Language::Ru), &text("-"));
        assert_eq!(
            t.next,
            Phase::FillingForm(FormStep::Phone {
                name: "Aibek".into(),
                company: text::COMPANY_PLACEHOLDER.into()
            })
        );
        let t = decide(&phase, Some(Language::Ru), &Input::Empty);
        assert_eq!(t.next.form_step(), Some(3));
    }

    #[test]
    fn empty_input_during_form_asks_to_repeat() {
        let steps = [
            FormStep::Name,
            FormStep::Phone {
                name: "Aibek".into(),
                company: "n/a".into(),
            },
            FormStep::Task {
                name: "Aibek".into(),
                company: "n/a".into(),
                phone: "+7 777 111 22 33".into(),
            },
        ];
        for step in steps {
            let phase = Phase::FillingForm(step);
            let t = decide(&phase, Some(Language::Ru), &Input::Empty);
            assert_eq!(t.next, phase);
            assert_eq!(t.effects, vec![Effect::say(MessageKey::Repeat)]);
        }
    }

    #[test]
    fn phone_needs_seven_digits() {
        let phase = Phase::FillingForm(FormStep::Phone {
            name: "Aibek".into(),
            company: "n/a".into(),
        });
        let t = decide(&phase, Some(Language::Ru), &text("+7 (77) 1-2"));
        assert_eq!(t.next, phase);
        assert_eq!(t.effects, vec![Effect::say(MessageKey::ReaskPhone)]);

        let t = decide(&phase, Some(Language::Ru), &text("+7 777 111 22 33"));
        assert_eq!(t.next.form_step(), Some(4));
    }

    #[test]
    fn task_completes_form() {
        let phase = Phase::FillingForm(FormStep::Task {
            name: "Aibek".into(),
            company: "n/a".into(),
            phone: "+7 777 111 22 33".into(),
        });
        let t = decide(&phase, Some(Language::Ru), &text("chatbot"));
        assert_eq!(t.next, Phase::Idle);
        assert_eq!(
            t.effects,
            vec![Effect::SubmitLead(CompletedForm {
                name: "Aibek".into(),
                company: "n/a".into(),
                phone: "+7 777 111 22 33".into(),
                task: "chatbot".into(),
            })]
        );
    }

    #[test]
    fn form_ignores_intents_and_reprompts_on_buttons() {
        let phase = Phase::FillingForm(FormStep::Name);
        // "цена" is a valid name-length answer, not a price request.
        let t = decide(&phase, Some(Language::Ru), &text("цена"));
        assert_eq!(t.next.form_step(), Some(2));

        let t = decide(&phase, Some(Language::Ru), &button(MENU_PRICE));
        assert_eq!(t.next, phase);
        assert_eq!(t.effects, vec![Effect::say(MessageKey::AskName)]);
    }

    proptest! {
        #[test]
        fn out_of_range_digits_never_select_language(d in "[04-9]|[0-9]{2,4}") {
            let t = decide(&Phase::AwaitingLanguage, None, &Input::Text(d));
            prop_assert_eq!(t.next, Phase::AwaitingLanguage);
            prop_assert!(t.effects.is_empty());
        }

        #[test]
        fn phone_with_fewer_than_seven_digits_is_rejected(
            digits in proptest::collection::vec(0u8..10, 0..7),
            sep in "[ ()+-]{0,2}",
        ) {
            let answer: String = digits
                .iter()
                .map(|d| format!("{d}{sep}"))
                .collect();
            let phase = Phase::FillingForm(FormStep::Phone {
                name: "Aibek".into(),
                company: "n/a".into(),
            });
            let t = decide(&phase, Some(Language::En), &Input::Text(answer));
            prop_assert_eq!(t.next, phase);
        }

        #[test]
        fn idle_phase_never_carries_form_data(
            step in 0usize..4,
            answer in "[a-zA-Z0-9 +]{0,20}",
        ) {
            let steps = [
                FormStep::Name,
                FormStep::Company { name: "Ab".into() },
                FormStep::Phone { name: "Ab".into(), company: "n/a".into() },
                FormStep::Task { name: "Ab".into(), company: "n/a".into(), phone: "1234567".into() },
            ];
            let t = decide(
                &Phase::FillingForm(steps[step].clone()),
                Some(Language::En),
                &Input::Text(answer),
            );
            // Idle has no payload, so reaching it means the draft was dropped.
            prop_assert!(matches!(t.next, Phase::Idle | Phase::FillingForm(_)));
            if t.next == Phase::Idle {
                prop_assert!(matches!(t.effects.as_slice(), [Effect::SubmitLead(_)]));
            }
        }
    }
}
