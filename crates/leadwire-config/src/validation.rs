// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Credentials are not checked here. They may come from fallback
//! environment variables and are resolved when the adapters are built.

use crate::diagnostic::ConfigError;
use crate::model::LeadwireConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &LeadwireConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if !is_http_url(&config.relay.api_url) {
        fail(format!(
            "relay.api_url `{}` must start with http:// or https://",
            config.relay.api_url
        ));
    }

    if !is_http_url(&config.responder.base_url) {
        fail(format!(
            "responder.base_url `{}` must start with http:// or https://",
            config.responder.base_url
        ));
    }

    for (key, secs) in [
        ("relay.receive_timeout_secs", config.relay.receive_timeout_secs),
        ("relay.send_timeout_secs", config.relay.send_timeout_secs),
        ("relay.file_timeout_secs", config.relay.file_timeout_secs),
        ("responder.timeout_secs", config.responder.timeout_secs),
        ("sink.timeout_secs", config.sink.timeout_secs),
    ] {
        if secs == 0 {
            fail(format!("{key} must be greater than zero"));
        }
    }

    if config.responder.model.trim().is_empty() {
        fail("responder.model must not be empty".to_string());
    }

    if !(0.0..=2.0).contains(&config.responder.temperature) {
        fail(format!(
            "responder.temperature must be within 0.0..=2.0, got {}",
            config.responder.temperature
        ));
    }

    if !(0.0..=1.0).contains(&config.responder.top_p) {
        fail(format!(
            "responder.top_p must be within 0.0..=1.0, got {}",
            config.responder.top_p
        ));
    }

    if config.responder.history_window == 0 {
        fail("responder.history_window must be at least 1".to_string());
    }

    if config.intake.history_limit < config.responder.history_window {
        fail(format!(
            "intake.history_limit ({}) must not be smaller than responder.history_window ({})",
            config.intake.history_limit, config.responder.history_window
        ));
    }

    if config.intake.workers == 0 {
        fail("intake.workers must be at least 1".to_string());
    }

    if config.intake.worker_queue == 0 {
        fail("intake.worker_queue must be at least 1".to_string());
    }

    if config.brand.name.trim().is_empty() {
        fail("brand.name must not be empty".to_string());
    }

    if let Some(url) = &config.brand.price_file_url
        && !is_http_url(url)
    {
        fail(format!(
            "brand.price_file_url `{url}` must start with http:// or https://"
        ));
    }

    for (i, sender) in config.admin.allowed_senders.iter().enumerate() {
        if !sender.chars().any(|c| c.is_ascii_digit()) {
            fail(format!(
                "admin.allowed_senders[{i}] `{sender}` contains no digits"
            ));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if let Some(url) = &config.sink.webhook_url
        && !is_http_url(url)
    {
        fail(format!(
            "sink.webhook_url `{url}` must start with http:// or https://"
        ));
    }

    if config.broadcast.min_delay_secs > config.broadcast.max_delay_secs {
        fail(format!(
            "broadcast.min_delay_secs ({}) exceeds broadcast.max_delay_secs ({})",
            config.broadcast.min_delay_secs, config.broadcast.max_delay_secs
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = LeadwireConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LeadwireConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = LeadwireConfig::default();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "agent.log_level"));
    }

    #[test]
    fn non_http_urls_fail_validation() {
        let mut config = LeadwireConfig::default();
        config.relay.api_url = "api.green-api.com".to_string();
        config.brand.price_file_url = Some("ftp://files/price.pdf".to_string());
        config.sink.webhook_url = Some("sheets".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "relay.api_url"));
        assert!(has_error(&errors, "brand.price_file_url"));
        assert!(has_error(&errors, "sink.webhook_url"));
    }

    #[test]
    fn zero_timeouts_fail_validation() {
        let mut config = LeadwireConfig::default();
        config.relay.receive_timeout_secs = 0;
        config.responder.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_error(&errors, "relay.receive_timeout_secs"));
        assert!(has_error(&errors, "responder.timeout_secs"));
    }

    #[test]
    fn history_limit_below_window_fails() {
        let mut config = LeadwireConfig::default();
        config.intake.history_limit = 6;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "intake.history_limit"));
    }

    #[test]
    fn zero_workers_fail_validation() {
        let mut config = LeadwireConfig::default();
        config.intake.workers = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "intake.workers"));
    }

    #[test]
    fn admin_sender_without_digits_fails() {
        let mut config = LeadwireConfig::default();
        config.admin.allowed_senders = vec!["+7 777 646 31 38".into(), "boss".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_error(&errors, "allowed_senders[1]"));
    }

    #[test]
    fn inverted_broadcast_delays_fail() {
        let mut config = LeadwireConfig::default();
        config.broadcast.min_delay_secs = 40;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "broadcast.min_delay_secs"));
    }

    #[test]
    fn out_of_range_sampling_fails() {
        let mut config = LeadwireConfig::default();
        config.responder.temperature = 3.5;
        config.responder.top_p = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "temperature"));
        assert!(has_error(&errors, "top_p"));
    }
}
