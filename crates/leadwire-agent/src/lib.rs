// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification intake for the Leadwire chat front-end.
//!
//! The [`IntakeLoop`] is the central coordinator that:
//! - Polls the relay for one notification at a time
//! - Hands each one to the [`Dispatcher`] (inline or per-chat workers)
//! - Backs off for a constant interval after empty or failed polls
//! - Stops between ticks on cancellation and drains in-flight work

pub mod dispatcher;
pub mod pipeline;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use leadwire_config::model::IntakeConfig;
use leadwire_core::NotificationSource;

pub use dispatcher::Dispatcher;
pub use pipeline::{EventHandler, Outcome, Pipeline};

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Dispatched,
    Empty,
    PollFailed,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeStats {
    pub dispatched: u64,
    pub empty_polls: u64,
    pub poll_errors: u64,
}

/// Polls the relay and dispatches notifications until cancelled.
pub struct IntakeLoop {
    source: Arc<dyn NotificationSource>,
    dispatcher: Dispatcher,
    idle_backoff: Duration,
    error_backoff: Duration,
}

impl IntakeLoop {
    pub fn new(
        source: Arc<dyn NotificationSource>,
        dispatcher: Dispatcher,
        config: &IntakeConfig,
    ) -> Self {
        Self {
            source,
            dispatcher,
            idle_backoff: Duration::from_millis(config.idle_backoff_ms),
            error_backoff: Duration::from_secs(config.error_backoff_secs),
        }
    }

    /// Overrides both backoff intervals.
    pub fn with_backoff(mut self, idle: Duration, error: Duration) -> Self {
        self.idle_backoff = idle;
        self.error_backoff = error;
        self
    }

    /// Runs until `cancel` fires.
    ///
    /// Cancellation is observed while waiting on the relay and while
    /// backing off; a notification already received is always dispatched.
    pub async fn run(self, cancel: CancellationToken) -> IntakeStats {
        info!(source = self.source.name(), "intake loop running");
        let mut stats = IntakeStats::default();

        loop {
            let tick = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                polled = self.source.poll() => match polled {
                    Ok(Some(notification)) => {
                        self.dispatcher.dispatch(notification).await;
                        Tick::Dispatched
                    }
                    Ok(None) => Tick::Empty,
                    Err(e) => {
                        warn!(error = %e, backoff = ?self.error_backoff, "notification poll failed");
                        Tick::PollFailed
                    }
                },
            };

            let pause = match tick {
                Tick::Dispatched => {
                    stats.dispatched += 1;
                    continue;
                }
                Tick::Empty => {
                    stats.empty_polls += 1;
                    self.idle_backoff
                }
                Tick::PollFailed => {
                    stats.poll_errors += 1;
                    self.error_backoff
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("shutdown signal received, draining in-flight notifications");
        self.dispatcher.drain().await;
        debug!(?stats, "intake loop stopped");
        stats
    }
}

#[cfg(test)]
mod tests {
    use leadwire_core::ReceiptId;
    use leadwire_test_utils::{MockRelay, SentMessage, TestHarness};

    use super::*;

    const CHAT: &str = "77001234567@c.us";

    fn fast_intake(harness: &TestHarness, workers: usize) -> IntakeLoop {
        let pipeline = Arc::new(Pipeline::new(
            harness.relay.clone(),
            harness.dedup.clone(),
            harness.controller.clone(),
        ));
        let dispatcher = Dispatcher::new(pipeline, workers, 4);
        IntakeLoop::new(harness.relay.clone(), dispatcher, &IntakeConfig::default())
            .with_backoff(Duration::from_millis(5), Duration::from_millis(5))
    }

    async fn wait_for_acks(relay: &MockRelay, count: usize) {
        for _ in 0..400 {
            if relay.acknowledged().await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {count} acknowledgements");
    }

    #[tokio::test]
    async fn processes_queue_and_stops_on_cancel() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.relay.inject_text(1, "MID1", CHAT, "Здравствуйте").await;
        harness.relay.inject_text(2, "MID2", CHAT, "1").await;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(fast_intake(&harness, 1).run(cancel.clone()));

        wait_for_acks(&harness.relay, 2).await;
        cancel.cancel();
        let stats = task.await.unwrap();

        assert_eq!(stats.dispatched, 2);
        assert_eq!(
            harness.relay.acknowledged().await,
            vec![ReceiptId(1), ReceiptId(2)]
        );
        let sent = harness.relay.sent_to(CHAT).await;
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[1], SentMessage::Interactive { .. }));
    }

    #[tokio::test]
    async fn poll_errors_back_off_and_recover() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.relay.fail_polls(2);
        harness.relay.inject_text(1, "MID1", CHAT, "hello").await;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(fast_intake(&harness, 1).run(cancel.clone()));

        wait_for_acks(&harness.relay, 1).await;
        cancel.cancel();
        let stats = task.await.unwrap();

        assert_eq!(stats.poll_errors, 2);
        assert_eq!(stats.dispatched, 1);
    }

    #[tokio::test]
    async fn duplicate_redelivery_is_acknowledged_once_each() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.relay.inject_text(1, "MID1", CHAT, "hello").await;
        harness.relay.inject_text(2, "MID1", CHAT, "hello").await;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(fast_intake(&harness, 2).run(cancel.clone()));

        wait_for_acks(&harness.relay, 2).await;
        cancel.cancel();
        task.await.unwrap();

        assert_eq!(harness.relay.sent_to(CHAT).await.len(), 1);
        assert_eq!(harness.relay.pending().await, 0);
    }

    #[tokio::test]
    async fn cancelled_before_start_polls_nothing() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.relay.inject_text(1, "MID1", CHAT, "hello").await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let stats = fast_intake(&harness, 1).run(cancel).await;

        assert_eq!(stats, IntakeStats::default());
        assert_eq!(harness.relay.pending().await, 1);
        assert!(harness.relay.acknowledged().await.is_empty());
    }

    #[tokio::test]
    async fn idle_backoff_is_interruptible() {
        let harness = TestHarness::builder().build().await.unwrap();
        let pipeline = Arc::new(Pipeline::new(
            harness.relay.clone(),
            harness.dedup.clone(),
            harness.controller.clone(),
        ));
        let intake = IntakeLoop::new(
            harness.relay.clone(),
            Dispatcher::new(pipeline, 1, 4),
            &IntakeConfig::default(),
        )
        .with_backoff(Duration::from_secs(3600), Duration::from_secs(3600));

        let cancel = CancellationToken::new();
        let task = tokio::spawn(intake.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let stats = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("loop should stop promptly")
            .unwrap();
        assert_eq!(stats.empty_polls, 1);
    }
}
