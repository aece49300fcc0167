// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound text cleanup shared by the classifier and the form steps.

/// Value stored for the company field when the user has none.
pub const COMPANY_PLACEHOLDER: &str = "n/a";

/// Answers to the company question that mean "no company".
const NO_COMPANY: &[&str] = &["", "-", "--", "—", "–", "no", "none", "нет", "жоқ", "n/a"];

/// Removes zero-width spaces, turns non-breaking spaces into plain spaces and trims.
pub fn normalize(raw: &str) -> String {
    raw.replace('\u{200b}', "")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Number of ASCII digits in `text`, ignoring spaces, dashes, parentheses and `+`.
pub fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Only the ASCII digits of `text`.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Maps a company answer to the stored value.
pub fn company_or_placeholder(text: &str) -> String {
    let trimmed = text.trim();
    if NO_COMPANY.contains(&trimmed.to_lowercase().as_str()) {
        COMPANY_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_invisible_characters() {
        assert_eq!(normalize("\u{200b} привет\u{a0}!  "), "привет !");
        assert_eq!(normalize("\u{200b}"), "");
    }

    #[test]
    fn digits_ignore_formatting() {
        assert_eq!(digit_count("+7 (777) 111-22-33"), 11);
        assert_eq!(digit_count("12-34-56"), 6);
        assert_eq!(digits_only("+7 777 646 31 38"), "77776463138");
    }

    #[test]
    fn company_placeholders() {
        for no in ["-", "  ", "Нет", "ЖОҚ", "no", "—"] {
            assert_eq!(company_or_placeholder(no), COMPANY_PLACEHOLDER, "input {no:?}");
        }
        assert_eq!(company_or_placeholder(" Steppe Foods "), "Steppe Foods");
        assert_eq!(company_or_placeholder("Nomad"), "Nomad");
    }
}
