// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment errors rendered as miette diagnostics for `leadwire.toml`.
//!
//! Unknown names are checked against the keys leadwire accepts. A typo in
//! `[relay]` suggests `relay.api_token`, and a key filed under the wrong
//! section points at the one it belongs to (`brand.price_file_url`).

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::SECTIONS;

/// Every `section.key` accepted in `leadwire.toml`.
pub const KNOWN_KEYS: &[&str] = &[
    "agent.name",
    "agent.log_level",
    "relay.api_url",
    "relay.instance_id",
    "relay.api_token",
    "relay.receive_timeout_secs",
    "relay.send_timeout_secs",
    "relay.file_timeout_secs",
    "relay.configure_webhooks",
    "responder.api_key",
    "responder.base_url",
    "responder.model",
    "responder.max_tokens",
    "responder.temperature",
    "responder.top_p",
    "responder.frequency_penalty",
    "responder.presence_penalty",
    "responder.timeout_secs",
    "responder.history_window",
    "responder.system_prompt",
    "brand.name",
    "brand.support_phone",
    "brand.price_file_url",
    "brand.price_file_name",
    "admin.allowed_senders",
    "intake.workers",
    "intake.idle_backoff_ms",
    "intake.error_backoff_secs",
    "intake.history_limit",
    "intake.worker_queue",
    "storage.database_path",
    "storage.wal_mode",
    "sink.webhook_url",
    "sink.timeout_secs",
    "broadcast.min_delay_secs",
    "broadcast.max_delay_secs",
    "broadcast.phone_column",
];

/// Source name used for configuration passed as a string.
pub const INLINE_SOURCE: &str = "<inline>";

/// Jaro-Winkler score a name must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A configuration problem found while loading or validating.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown section `[{section}]`")]
    #[diagnostic(
        code(leadwire::config::unknown_section),
        help("{}", section_help(suggestion.as_deref()))
    )]
    UnknownSection {
        section: String,
        suggestion: Option<String>,
        #[label("not a leadwire section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// `key` is the dotted path of the offending entry, e.g. `relay.api_tokn`.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(leadwire::config::unknown_key),
        help("{}", key_help(key, suggestion.as_deref()))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(
        code(leadwire::config::invalid_type),
        help("`{key}` expects {expected}")
    )]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("validation error: {message}")]
    #[diagnostic(code(leadwire::config::validation))]
    Validation { message: String },

    /// TOML syntax errors and anything else figment reports.
    #[error("configuration error: {0}")]
    #[diagnostic(code(leadwire::config::other))]
    Other(String),
}

fn section_help(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(section) => format!("did you mean `[{section}]`?"),
        None => format!("sections: {}", SECTIONS.join(", ")),
    }
}

fn key_help(key: &str, suggestion: Option<&str>) -> String {
    let section = key.split_once('.').map_or(key, |(section, _)| section);
    match suggestion {
        Some(known) if known.starts_with(&format!("{section}.")) => {
            format!("did you mean `{known}`?")
        }
        Some(known) => format!("this key lives elsewhere: `{known}`"),
        None => format!("[{section}] accepts: {}", keys_in(section).join(", ")),
    }
}

/// Key names of `section`, without the section prefix.
pub fn keys_in(section: &str) -> Vec<&'static str> {
    KNOWN_KEYS
        .iter()
        .copied()
        .filter_map(|key| key.strip_prefix(section)?.strip_prefix('.'))
        .collect()
}

/// Closest known key for an unknown `field` found under `[section]`.
///
/// A near spelling inside the same section wins; otherwise the same key
/// name under another section is returned.
pub fn suggest_key(section: &str, field: &str) -> Option<String> {
    closest(field, &keys_in(section))
        .map(|name| format!("{section}.{name}"))
        .or_else(|| {
            KNOWN_KEYS
                .iter()
                .find(|key| key.split_once('.').is_some_and(|(_, name)| name == field))
                .map(|key| key.to_string())
        })
}

/// Closest section name for an unknown top-level table.
pub fn suggest_section(name: &str) -> Option<String> {
    closest(name, SECTIONS).map(str::to_string)
}

fn closest<'a>(candidate: &str, options: &[&'a str]) -> Option<&'a str> {
    options
        .iter()
        .copied()
        .map(|option| (strsim::jaro_winkler(candidate, option), option))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, option)| option)
}

/// Converts every error inside `err` into a [`ConfigError`].
///
/// `sources` pairs a source name (file path or [`INLINE_SOURCE`]) with its
/// TOML text and is used to attach spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    let source = source_for(error, sources);
    match &error.kind {
        Kind::UnknownField(field, _) => match error.path.first() {
            None => {
                let (span, src) = locate(source, field.len(), |content| {
                    find_section_offset(content, field)
                        .or_else(|| find_key_offset(content, None, field))
                });
                ConfigError::UnknownSection {
                    section: field.clone(),
                    suggestion: suggest_section(field),
                    span,
                    src,
                }
            }
            Some(section) => {
                let (span, src) = locate(source, field.len(), |content| {
                    find_key_offset(content, Some(section.as_str()), field)
                });
                ConfigError::UnknownKey {
                    key: format!("{section}.{field}"),
                    suggestion: suggest_key(section, field),
                    span,
                    src,
                }
            }
        },
        Kind::InvalidType(actual, expected) => {
            let (span, src) = match error.path.as_slice() {
                [section, field, ..] => locate(source, field.len(), |content| {
                    find_key_offset(content, Some(section.as_str()), field)
                }),
                _ => (None, None),
            };
            ConfigError::InvalidType {
                key: error.path.join("."),
                found: actual.to_string(),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// The TOML text an error came from: the file in its metadata, or the
/// inline string when no file is involved.
fn source_for<'a>(
    error: &figment::Error,
    sources: &'a [(String, String)],
) -> Option<&'a (String, String)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let wanted = file.as_deref().unwrap_or(INLINE_SOURCE);
    sources.iter().find(|(name, _)| name == wanted)
}

fn locate(
    source: Option<&(String, String)>,
    len: usize,
    find: impl FnOnce(&str) -> Option<usize>,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((name, content)) = source else {
        return (None, None);
    };
    match find(content) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), len)),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field = ...` inside `[section]`, or before the first
/// table header when `section` is `None`.
pub fn find_key_offset(content: &str, section: Option<&str>, field: &str) -> Option<usize> {
    let mut current = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = table_header(trimmed) {
            current = Some(header);
        } else if current == section
            && trimmed
                .strip_prefix(field)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Byte offset of `name` inside its `[name]` header.
pub fn find_section_offset(content: &str, name: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if table_header(line.trim_start()) == Some(name) {
            return line.find(name).map(|at| offset + at);
        }
        offset += line.len();
    }
    None
}

fn table_header(line: &str) -> Option<&str> {
    let inner = line.trim_end().strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.trim_matches(['[', ']']).trim())
}

/// Prints each error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
