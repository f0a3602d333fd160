// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background worker that flushes queued outbound messages.
//!
//! The worker polls the store on a fixed interval and drives every `queued`
//! outbound message through the adapter, independent of the request path.
//! Cancellation is cooperative: `stop()` interrupts the inter-tick sleep but
//! never an in-flight delivery attempt, and returns only after the loop has
//! observed the cancellation, so no loop body overlaps the return.

use std::sync::Arc;
use std::time::Duration;

use confab_core::{ConfabError, DeliveryAdapter, MessageStatus};
use confab_storage::MessageStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatch::DEFAULT_DELIVERY_TIMEOUT;

/// Default sleep between polling ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling loop that discovers queued outbound messages and delivers them.
///
/// Lifecycle is stopped -> running -> stopped; a worker is not restartable
/// after `stop()` (build a new one instead). Messages that fail delivery are
/// marked `failed` and never retried here -- retry is an external re-enqueue
/// decision.
pub struct OutboundWorker {
    store: MessageStore,
    adapter: Arc<dyn DeliveryAdapter>,
    poll_interval: Duration,
    delivery_timeout: Duration,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl OutboundWorker {
    pub fn new(
        store: MessageStore,
        adapter: Arc<dyn DeliveryAdapter>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            adapter,
            poll_interval,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            cancel: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Override the per-attempt delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Spawn the background loop. A second call while running is a no-op.
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            warn!("outbound worker already running");
            return;
        }
        *handle = Some(tokio::spawn(run_loop(
            self.store.clone(),
            Arc::clone(&self.adapter),
            self.poll_interval,
            self.delivery_timeout,
            self.cancel.clone(),
        )));
    }

    /// Signal cancellation and wait for the loop to observe it.
    ///
    /// An in-flight delivery attempt always completes (success or failure)
    /// before the loop exits; only the inter-tick sleep is interrupted.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "outbound worker task ended abnormally");
            }
        }
    }

    /// Whether the background loop is currently spawned.
    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some() && !self.cancel.is_cancelled()
    }

    /// Run one flush pass synchronously. Returns the number of messages
    /// delivered. Used by the loop and directly by tests.
    pub async fn flush_once(&self) -> usize {
        flush_queued(&self.store, self.adapter.as_ref(), self.delivery_timeout).await
    }
}

async fn run_loop(
    store: MessageStore,
    adapter: Arc<dyn DeliveryAdapter>,
    poll_interval: Duration,
    delivery_timeout: Duration,
    cancel: CancellationToken,
) {
    info!(
        poll_interval_secs = poll_interval.as_secs(),
        adapter = adapter.name(),
        "outbound worker started"
    );
    loop {
        flush_queued(&store, adapter.as_ref(), delivery_timeout).await;
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
    info!("outbound worker stopped");
}

/// Deliver every queued outbound message from a point-in-time snapshot.
///
/// Nothing escapes this function: a storage failure skips the tick, a
/// delivery failure marks that one message `failed`, and the batch always
/// runs to the end.
async fn flush_queued(
    store: &MessageStore,
    adapter: &dyn DeliveryAdapter,
    delivery_timeout: Duration,
) -> usize {
    let queued = match store.fetch_queued_outbound().await {
        Ok(queued) => queued,
        Err(e) => {
            error!(error = %e, "failed to snapshot queued outbound messages");
            return 0;
        }
    };
    if queued.is_empty() {
        return 0;
    }
    debug!(count = queued.len(), "flushing queued outbound messages");

    let mut delivered = 0;
    for message in queued {
        let outcome = match tokio::time::timeout(
            delivery_timeout,
            adapter.send(message.conversation_id, &message.content),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ConfabError::Timeout {
                duration: delivery_timeout,
            }),
        };

        let status = match outcome {
            Ok(_) => {
                delivered += 1;
                MessageStatus::Sent
            }
            Err(e) => {
                warn!(
                    message_id = message.id,
                    conversation_id = message.conversation_id,
                    error = %e,
                    "delivery failed, marking message failed"
                );
                MessageStatus::Failed
            }
        };
        if let Err(e) = store.update_status(message.id, status).await {
            error!(
                message_id = message.id,
                error = %e,
                "could not record delivery status"
            );
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::Channel;
    use confab_test_utils::TestHarness;

    #[tokio::test]
    async fn flush_delivers_queued_messages() {
        let harness = TestHarness::builder().build().await.unwrap();
        let conversation = harness
            .registry
            .get_or_open("user@example.com", Channel::Email)
            .await
            .unwrap();
        harness
            .store
            .persist_outbound(&conversation, "first")
            .await
            .unwrap();
        harness
            .store
            .persist_outbound(&conversation, "second")
            .await
            .unwrap();

        let worker = OutboundWorker::new(
            harness.store.clone(),
            harness.adapter.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        let delivered = worker.flush_once().await;
        assert_eq!(delivered, 2);
        assert!(harness.store.fetch_queued_outbound().await.unwrap().is_empty());
        assert_eq!(harness.adapter.sent_count().await, 2);
    }

    #[tokio::test]
    async fn one_failure_never_aborts_the_batch() {
        // Scripted adapter: first send fails, second succeeds.
        let harness = TestHarness::builder()
            .with_delivery_outcomes(vec![false, true])
            .build()
            .await
            .unwrap();

        let conversation = harness
            .registry
            .get_or_open("user@example.com", Channel::Email)
            .await
            .unwrap();
        let first = harness
            .store
            .persist_outbound(&conversation, "will fail")
            .await
            .unwrap();
        let second = harness
            .store
            .persist_outbound(&conversation, "will send")
            .await
            .unwrap();

        let worker = OutboundWorker::new(
            harness.store.clone(),
            harness.adapter.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        let delivered = worker.flush_once().await;
        assert_eq!(delivered, 1);

        assert_eq!(
            harness.store.get(first.id).await.unwrap().unwrap().status,
            MessageStatus::Failed
        );
        assert_eq!(
            harness.store.get(second.id).await.unwrap().unwrap().status,
            MessageStatus::Sent
        );
    }

    #[tokio::test]
    async fn failed_messages_are_not_retried() {
        let harness = TestHarness::builder()
            .with_failure_rate(1.0)
            .build()
            .await
            .unwrap();
        let conversation = harness
            .registry
            .get_or_open("user@example.com", Channel::Email)
            .await
            .unwrap();
        let message = harness
            .store
            .persist_outbound(&conversation, "doomed")
            .await
            .unwrap();

        let worker = OutboundWorker::new(
            harness.store.clone(),
            harness.adapter.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        assert_eq!(worker.flush_once().await, 0);
        assert_eq!(
            harness.store.get(message.id).await.unwrap().unwrap().status,
            MessageStatus::Failed
        );

        // A second pass sees an empty queue: failed is terminal here.
        assert_eq!(worker.flush_once().await, 0);
        assert_eq!(harness.adapter.sent_count().await, 0);
    }

    #[tokio::test]
    async fn start_then_stop_flushes_and_terminates() {
        let harness = TestHarness::builder().build().await.unwrap();
        let conversation = harness
            .registry
            .get_or_open("user@example.com", Channel::Email)
            .await
            .unwrap();
        harness
            .store
            .persist_outbound(&conversation, "flush me")
            .await
            .unwrap();

        let worker = OutboundWorker::new(
            harness.store.clone(),
            harness.adapter.clone(),
            Duration::from_millis(10),
        );
        worker.start().await;
        assert!(worker.is_running().await);

        // Give the loop a tick to pick the message up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        worker.stop().await;
        assert!(!worker.is_running().await);

        assert!(harness.store.fetch_queued_outbound().await.unwrap().is_empty());

        // Messages persisted after stop() stay queued: nothing overlaps the
        // stopped state.
        harness
            .store
            .persist_outbound(&conversation, "after stop")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(harness.store.fetch_queued_outbound().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let harness = TestHarness::builder().build().await.unwrap();
        let worker = OutboundWorker::new(
            harness.store.clone(),
            harness.adapter.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        worker.stop().await;
        assert!(!worker.is_running().await);
    }
}
