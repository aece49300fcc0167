// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Leadwire chat front-end.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Leadwire configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values; credentials are
/// checked by the adapters that need them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadwireConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Messaging relay (Green-API) settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Generative responder (OpenAI-compatible) settings.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Brand content substituted into replies.
    #[serde(default)]
    pub brand: BrandConfig,

    /// Administrative command allow-list.
    #[serde(default)]
    pub admin: AdminConfig,

    /// Intake loop timing and concurrency.
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Optional secondary lead sink.
    #[serde(default)]
    pub sink: SinkConfig,

    /// Outreach broadcast pacing.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the deployment, used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "leadwire".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Messaging relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Relay API host, without the instance path.
    #[serde(default = "default_relay_api_url")]
    pub api_url: String,

    /// Relay instance id. `None` falls back to `GREEN_API_INSTANCE_ID`.
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Relay instance token. `None` falls back to `GREEN_API_TOKEN`.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Long-poll timeout for receiving a notification.
    #[serde(default = "default_receive_timeout_secs")]
    pub receive_timeout_secs: u64,

    /// Timeout for text, interactive and acknowledge calls.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Timeout for file-by-URL delivery.
    #[serde(default = "default_file_timeout_secs")]
    pub file_timeout_secs: u64,

    /// Enable incoming-message webhooks on the relay when connecting.
    #[serde(default = "default_true")]
    pub configure_webhooks: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_url: default_relay_api_url(),
            instance_id: None,
            api_token: None,
            receive_timeout_secs: default_receive_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
            file_timeout_secs: default_file_timeout_secs(),
            configure_webhooks: true,
        }
    }
}

fn default_relay_api_url() -> String {
    "https://api.green-api.com".to_string()
}

fn default_receive_timeout_secs() -> u64 {
    15
}

fn default_send_timeout_secs() -> u64 {
    10
}

fn default_file_timeout_secs() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

/// Generative responder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    /// API key. `None` falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API.
    #[serde(default = "default_responder_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_responder_model")]
    pub model: String,

    /// Maximum tokens per reply.
    #[serde(default = "default_responder_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,

    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f32,

    /// Request timeout.
    #[serde(default = "default_responder_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of most recent history turns sent with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Replaces the built-in per-language system prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_responder_base_url(),
            model: default_responder_model(),
            max_tokens: default_responder_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            frequency_penalty: default_frequency_penalty(),
            presence_penalty: default_presence_penalty(),
            timeout_secs: default_responder_timeout_secs(),
            history_window: default_history_window(),
            system_prompt: None,
        }
    }
}

fn default_responder_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_responder_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_responder_max_tokens() -> u32 {
    350
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_p() -> f32 {
    0.9
}

fn default_frequency_penalty() -> f32 {
    0.6
}

fn default_presence_penalty() -> f32 {
    0.5
}

fn default_responder_timeout_secs() -> u64 {
    30
}

fn default_history_window() -> usize {
    12
}

/// Brand content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrandConfig {
    /// Brand name shown in prompts, footers and captions.
    #[serde(default = "default_brand_name")]
    pub name: String,

    /// Support contact phone given to users asking for help.
    #[serde(default = "default_support_phone")]
    pub support_phone: String,

    /// Public URL of the price list file. `None` sends a text notice instead.
    #[serde(default)]
    pub price_file_url: Option<String>,

    /// File name shown for the price list.
    #[serde(default = "default_price_file_name")]
    pub price_file_name: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: default_brand_name(),
            support_phone: default_support_phone(),
            price_file_url: None,
            price_file_name: default_price_file_name(),
        }
    }
}

fn default_brand_name() -> String {
    "qdigit".to_string()
}

fn default_support_phone() -> String {
    "+7 777 777 77 77".to_string()
}

fn default_price_file_name() -> String {
    "qdigit_price.pdf".to_string()
}

/// Administrative command configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Sender phones allowed to run `/reset` and `/clients`.
    /// Compared on digits only, so `+7 777 646 31 38` and `77776463138` match.
    #[serde(default)]
    pub allowed_senders: Vec<String>,
}

/// Intake loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeConfig {
    /// Number of per-chat workers. `1` processes every event inline.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Pause after a poll that returned nothing.
    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,

    /// Pause after a failed poll.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Maximum history turns retained per chat.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Queue depth of each worker when `workers > 1`.
    #[serde(default = "default_worker_queue")]
    pub worker_queue: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            idle_backoff_ms: default_idle_backoff_ms(),
            error_backoff_secs: default_error_backoff_secs(),
            history_limit: default_history_limit(),
            worker_queue: default_worker_queue(),
        }
    }
}

fn default_workers() -> usize {
    1
}

fn default_idle_backoff_ms() -> u64 {
    1000
}

fn default_error_backoff_secs() -> u64 {
    5
}

fn default_history_limit() -> usize {
    24
}

fn default_worker_queue() -> usize {
    64
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadwire").join("leadwire.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadwire.db"))
        .to_string_lossy()
        .into_owned()
}

/// Secondary lead sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    /// Webhook receiving each saved lead as JSON. `None` disables the sink.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Request timeout for the webhook.
    #[serde(default = "default_sink_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_sink_timeout_secs(),
        }
    }
}

fn default_sink_timeout_secs() -> u64 {
    10
}

/// Outreach broadcast configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Minimum pause between two sends.
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,

    /// Maximum pause between two sends.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,

    /// CSV column holding the phone numbers.
    #[serde(default = "default_phone_column")]
    pub phone_column: String,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            phone_column: default_phone_column(),
        }
    }
}

fn default_min_delay_secs() -> u64 {
    15
}

fn default_max_delay_secs() -> u64 {
    35
}

fn default_phone_column() -> String {
    "Номер".to_string()
}
