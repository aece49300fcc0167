// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-notification processing boundary.
//!
//! Every notification that enters [`Pipeline::process`] is acknowledged
//! exactly once on the way out, whatever happened in between: ignored
//! webhooks, duplicates, handler errors and handler panics all end in an
//! acknowledge call.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, error, warn};

use leadwire_core::{
    InboundEvent, LeadwireError, Notification, NotificationKind, NotificationSource,
};
use leadwire_dialog::{Deduplicator, DialogueController};

/// Handles one deduplicated inbound chat message.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &InboundEvent) -> Result<(), LeadwireError>;
}

#[async_trait]
impl EventHandler for DialogueController {
    async fn handle(&self, event: &InboundEvent) -> Result<(), LeadwireError> {
        DialogueController::handle(self, event).await
    }
}

/// How a notification left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    /// Message id already handled; dropped without processing.
    Duplicate,
    /// Not an incoming chat message.
    Ignored,
    /// The handler returned an error or panicked.
    Failed,
}

/// Dedup, handle, acknowledge.
pub struct Pipeline {
    source: Arc<dyn NotificationSource>,
    dedup: Arc<Deduplicator>,
    handler: Arc<dyn EventHandler>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn NotificationSource>,
        dedup: Arc<Deduplicator>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            source,
            dedup,
            handler,
        }
    }

    /// Processes `notification` to completion and acknowledges it.
    pub async fn process(&self, notification: Notification) -> Outcome {
        let receipt = notification.receipt_id;

        let outcome = match notification.kind {
            NotificationKind::Ignored { webhook_type } => {
                debug!(receipt = %receipt, webhook_type = %webhook_type, "ignoring notification");
                Outcome::Ignored
            }
            NotificationKind::Message(event) => self.handle_message(event).await,
        };

        if let Err(e) = self.source.acknowledge(receipt).await {
            warn!(receipt = %receipt, error = %e, "failed to acknowledge notification");
        }

        outcome
    }

    async fn handle_message(&self, event: InboundEvent) -> Outcome {
        if !self.dedup.claim(event.message_id.as_ref()) {
            debug!(
                chat_id = %event.chat_id,
                message_id = ?event.message_id,
                "duplicate message dropped"
            );
            return Outcome::Duplicate;
        }

        let handled = AssertUnwindSafe(self.handler.handle(&event))
            .catch_unwind()
            .await;

        match handled {
            Ok(Ok(())) => Outcome::Handled,
            Ok(Err(e)) => {
                error!(chat_id = %event.chat_id, error = %e, "failed to handle message");
                Outcome::Failed
            }
            Err(panic) => {
                error!(
                    chat_id = %event.chat_id,
                    panic = %panic_message(panic.as_ref()),
                    "message handler panicked"
                );
                Outcome::Failed
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use leadwire_core::{InboundContent, ReceiptId};
    use leadwire_test_utils::mock_relay::incoming;
    use leadwire_test_utils::{MockRelay, TestHarness};
    use tracing_test::traced_test;

    use super::*;

    const CHAT: &str = "77001234567@c.us";

    struct Panicking;

    #[async_trait]
    impl EventHandler for Panicking {
        async fn handle(&self, _event: &InboundEvent) -> Result<(), LeadwireError> {
            panic!("handler exploded");
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        async fn handle(&self, _event: &InboundEvent) -> Result<(), LeadwireError> {
            Err(LeadwireError::Internal("boom".into()))
        }
    }

    fn text(receipt: u64, message_id: &str, body: &str) -> Notification {
        incoming(receipt, message_id, CHAT, InboundContent::Text(body.to_string()))
    }

    fn harness_pipeline(harness: &TestHarness) -> Pipeline {
        Pipeline::new(
            harness.relay.clone(),
            harness.dedup.clone(),
            harness.controller.clone(),
        )
    }

    #[tokio::test]
    async fn handled_message_is_acknowledged() {
        let harness = TestHarness::builder().build().await.unwrap();
        let pipeline = harness_pipeline(&harness);

        let outcome = pipeline.process(text(1, "MID1", "Привет")).await;
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(harness.relay.acknowledged().await, vec![ReceiptId(1)]);
        assert_eq!(harness.relay.sent_to(CHAT).await.len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn duplicate_is_acknowledged_without_side_effects() {
        let harness = TestHarness::builder().build().await.unwrap();
        let pipeline = harness_pipeline(&harness);

        assert_eq!(pipeline.process(text(1, "MID1", "Привет")).await, Outcome::Handled);
        assert_eq!(pipeline.process(text(2, "MID1", "Привет")).await, Outcome::Duplicate);

        assert_eq!(harness.relay.sent_to(CHAT).await.len(), 1);
        assert_eq!(
            harness.relay.acknowledged().await,
            vec![ReceiptId(1), ReceiptId(2)]
        );
        assert!(logs_contain("duplicate message dropped"));
    }

    #[tokio::test]
    async fn missing_message_id_is_never_deduplicated() {
        let harness = TestHarness::builder().build().await.unwrap();
        let pipeline = harness_pipeline(&harness);

        assert_eq!(pipeline.process(text(1, "", "Привет")).await, Outcome::Handled);
        assert_eq!(pipeline.process(text(2, "", "Привет")).await, Outcome::Handled);
        assert_eq!(harness.relay.sent_to(CHAT).await.len(), 2);
        assert!(harness.dedup.is_empty());
    }

    #[tokio::test]
    async fn ignored_webhook_is_acknowledged() {
        let harness = TestHarness::builder().build().await.unwrap();
        let pipeline = harness_pipeline(&harness);

        let notification = Notification {
            receipt_id: ReceiptId(7),
            kind: NotificationKind::Ignored {
                webhook_type: "outgoingMessageStatus".into(),
            },
        };
        assert_eq!(pipeline.process(notification).await, Outcome::Ignored);
        assert_eq!(harness.relay.acknowledged().await, vec![ReceiptId(7)]);
        assert!(harness.relay.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn handler_error_still_acknowledges() {
        let relay = Arc::new(MockRelay::new());
        let pipeline = Pipeline::new(relay.clone(), Arc::new(Deduplicator::new()), Arc::new(Failing));

        assert_eq!(pipeline.process(text(3, "MID3", "hi")).await, Outcome::Failed);
        assert_eq!(relay.acknowledged().await, vec![ReceiptId(3)]);
    }

    #[tokio::test]
    #[traced_test]
    async fn handler_panic_is_contained() {
        let relay = Arc::new(MockRelay::new());
        let dedup = Arc::new(Deduplicator::new());
        let pipeline = Pipeline::new(relay.clone(), dedup.clone(), Arc::new(Panicking));

        assert_eq!(pipeline.process(text(4, "MID4", "hi")).await, Outcome::Failed);
        assert_eq!(relay.acknowledged().await, vec![ReceiptId(4)]);
        assert!(logs_contain("message handler panicked"));

        // The id stays claimed, so a redelivery is not retried.
        assert_eq!(pipeline.process(text(5, "MID4", "hi")).await, Outcome::Duplicate);
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
