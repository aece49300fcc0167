// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes notifications from the intake loop to the pipeline.
//!
//! With one worker every notification is processed inline. With more,
//! each worker owns a bounded queue and a chat is always routed to the
//! same worker, so events of one chat keep their arrival order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use leadwire_core::{Notification, NotificationKind};

use crate::pipeline::Pipeline;

pub enum Dispatcher {
    Inline(Arc<Pipeline>),
    Pool {
        pipeline: Arc<Pipeline>,
        senders: Vec<mpsc::Sender<Notification>>,
        workers: Vec<JoinHandle<()>>,
    },
}

impl Dispatcher {
    /// Creates an inline dispatcher for `workers <= 1`, a worker pool otherwise.
    pub fn new(pipeline: Arc<Pipeline>, workers: usize, queue: usize) -> Self {
        if workers <= 1 {
            return Dispatcher::Inline(pipeline);
        }

        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let (tx, mut rx) = mpsc::channel::<Notification>(queue.max(1));
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                while let Some(notification) = rx.recv().await {
                    pipeline.process(notification).await;
                }
                debug!(worker, "dispatch worker stopped");
            }));
            senders.push(tx);
        }
        info!(workers, queue, "dispatch worker pool started");

        Dispatcher::Pool {
            pipeline,
            senders,
            workers: handles,
        }
    }

    /// Hands `notification` to its worker, waiting for queue space.
    /// Inline dispatch returns once the notification is fully processed.
    pub async fn dispatch(&self, notification: Notification) {
        match self {
            Dispatcher::Inline(pipeline) => {
                pipeline.process(notification).await;
            }
            Dispatcher::Pool {
                pipeline, senders, ..
            } => {
                let worker = route(&notification, senders.len());
                if let Err(mpsc::error::SendError(notification)) =
                    senders[worker].send(notification).await
                {
                    warn!(worker, "dispatch worker gone, processing inline");
                    pipeline.process(notification).await;
                }
            }
        }
    }

    /// Waits for every queued notification to finish processing.
    pub async fn drain(self) {
        if let Dispatcher::Pool {
            senders, workers, ..
        } = self
        {
            drop(senders);
            for worker in workers {
                if let Err(e) = worker.await {
                    warn!(error = %e, "dispatch worker failed");
                }
            }
            debug!("dispatch workers drained");
        }
    }
}

/// Worker index for `notification`: by chat for messages, by receipt otherwise.
pub fn route(notification: &Notification, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    match &notification.kind {
        NotificationKind::Message(event) => event.chat_id.hash(&mut hasher),
        NotificationKind::Ignored { .. } => notification.receipt_id.hash(&mut hasher),
    }
    (hasher.finish() % workers.max(1) as u64) as usize
}
