// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadwire serve` command implementation.
//!
//! Starts the dialogue bot with the Green-API relay, the OpenAI responder,
//! SQLite storage and the optional webhook lead sink, then runs the intake
//! loop until a shutdown signal arrives.

use std::sync::Arc;

use leadwire_agent::{Dispatcher, IntakeLoop, Pipeline, shutdown};
use leadwire_config::model::LeadwireConfig;
use leadwire_core::{HealthStatus, LeadwireError, PluginAdapter, StorageAdapter};
use leadwire_dialog::{ConversationStore, Deduplicator, DialogSettings, DialogueController};
use leadwire_greenapi::GreenApiRelay;
use leadwire_openai::OpenAiResponder;
use leadwire_storage::{SqliteStorage, WebhookSink};
use tracing::{error, info, warn};

/// Runs the `leadwire serve` command.
pub async fn run_serve(config: LeadwireConfig) -> Result<(), LeadwireError> {
    info!(agent = %config.agent.name, "starting leadwire serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let relay = Arc::new(GreenApiRelay::new(&config).map_err(|e| {
        error!(error = %e, "failed to initialize Green-API relay");
        eprintln!(
            "error: relay credentials required. Set relay.instance_id and relay.api_token, \
             or GREEN_API_INSTANCE_ID and GREEN_API_TOKEN"
        );
        e
    })?);
    relay.connect().await;
    report_health(relay.as_ref()).await;

    let responder = Arc::new(OpenAiResponder::new(&config).map_err(|e| {
        error!(error = %e, "failed to initialize OpenAI responder");
        eprintln!("error: OpenAI API key required. Set via: config responder.api_key or OPENAI_API_KEY");
        e
    })?);

    let store = Arc::new(ConversationStore::new(
        storage.clone(),
        config.intake.history_limit,
    ));
    let restored = store.load().await?;
    info!(chats = restored, "chat languages restored");

    let mut controller = DialogueController::new(
        store,
        relay.clone(),
        responder.clone(),
        storage.clone(),
        DialogSettings::from_config(&config),
    );
    if let Some(sink) = WebhookSink::from_config(&config.sink)? {
        info!("webhook lead sink enabled");
        controller = controller.with_sink(Arc::new(sink));
    }

    let pipeline = Arc::new(Pipeline::new(
        relay.clone(),
        Arc::new(Deduplicator::new()),
        Arc::new(controller),
    ));
    let dispatcher = Dispatcher::new(
        pipeline,
        config.intake.workers,
        config.intake.worker_queue,
    );

    let cancel = shutdown::install_signal_handler();
    let stats = IntakeLoop::new(relay.clone(), dispatcher, &config.intake)
        .run(cancel)
        .await;
    info!(
        dispatched = stats.dispatched,
        poll_errors = stats.poll_errors,
        "intake loop finished"
    );

    if let Err(e) = relay.shutdown().await {
        warn!(error = %e, "relay shutdown error");
    }
    if let Err(e) = responder.shutdown().await {
        warn!(error = %e, "responder shutdown error");
    }
    storage.close().await?;

    info!("leadwire stopped");
    Ok(())
}

async fn report_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter unhealthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level. Output goes to stderr so the
/// `leads` and `broadcast` listings stay clean on stdout.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadwire={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
