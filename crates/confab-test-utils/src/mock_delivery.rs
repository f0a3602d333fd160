// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery adapter for deterministic testing.
//!
//! `MockDelivery` implements `DeliveryAdapter` with an injected randomness
//! source: given the same seed and failure rate it produces the same
//! success/failure sequence, which keeps property-based tests flake-free.
//! Successful sends are captured for assertion.

use std::collections::VecDeque;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use confab_core::{ConfabError, DeliveryAdapter, DeliveryReceipt};

/// A mock delivery channel for testing.
///
/// Each `send` rolls the seeded RNG against `failure_rate`; rolls below the
/// rate fail with a typed delivery error, everything else succeeds and is
/// captured. A scripted outcome queue, when non-empty, overrides the RNG
/// so tests can pin exact success/failure sequences.
///
/// Internal state sits behind async mutexes because the adapter may be
/// exercised by a request path and the worker simultaneously.
pub struct MockDelivery {
    failure_rate: f64,
    rng: Mutex<StdRng>,
    script: Mutex<VecDeque<bool>>,
    sent: Mutex<Vec<(i64, String)>>,
}

impl MockDelivery {
    /// Create a mock with the given failure rate in `[0.0, 1.0]` and RNG
    /// seed.
    pub fn new(failure_rate: f64, seed: u64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            script: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// A mock that delivers everything.
    pub fn always_succeeds() -> Self {
        Self::new(0.0, 0)
    }

    /// A mock that fails everything.
    pub fn always_fails() -> Self {
        Self::new(1.0, 0)
    }

    /// A mock following an exact outcome sequence (`true` = succeed).
    /// Once the script is exhausted the RNG takes over again.
    pub fn scripted(outcomes: Vec<bool>) -> Self {
        let mock = Self::always_succeeds();
        {
            let mut script = mock.script.try_lock().expect("fresh mock is uncontended");
            script.extend(outcomes);
        }
        mock
    }

    /// All `(conversation_id, content)` pairs delivered so far.
    pub async fn sent_messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().await.clone()
    }

    /// Count of delivered messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear the capture buffer.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl DeliveryAdapter for MockDelivery {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(
        &self,
        conversation_id: i64,
        content: &str,
    ) -> Result<DeliveryReceipt, ConfabError> {
        let succeed = match self.script.lock().await.pop_front() {
            Some(scripted) => scripted,
            None => self.rng.lock().await.r#gen::<f64>() >= self.failure_rate,
        };

        if !succeed {
            return Err(ConfabError::Delivery {
                conversation_id,
                status: "mock_failure".to_string(),
                body: format!(r#"{{"failure_rate":{}}}"#, self.failure_rate),
            });
        }

        let mut sent = self.sent.lock().await;
        sent.push((conversation_id, content.to_string()));
        Ok(DeliveryReceipt {
            status: "sent".to_string(),
            status_code: 200,
            provider_id: Some(format!("mock-{}", sent.len())),
            raw_body: "{}".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_failure_rate_always_delivers() {
        let mock = MockDelivery::always_succeeds();
        for i in 0..20 {
            let receipt = mock.send(i, "hello").await.unwrap();
            assert_eq!(receipt.status, "sent");
        }
        assert_eq!(mock.sent_count().await, 20);
    }

    #[tokio::test]
    async fn full_failure_rate_never_delivers() {
        let mock = MockDelivery::always_fails();
        for i in 0..20 {
            let result = mock.send(i, "hello").await;
            assert!(matches!(result, Err(ConfabError::Delivery { .. })));
        }
        assert_eq!(mock.sent_count().await, 0);
    }

    #[tokio::test]
    async fn same_seed_gives_the_same_outcome_sequence() {
        let a = MockDelivery::new(0.5, 1234);
        let b = MockDelivery::new(0.5, 1234);
        for i in 0..50 {
            assert_eq!(
                a.send(i, "x").await.is_ok(),
                b.send(i, "x").await.is_ok(),
                "sequences diverged at step {i}"
            );
        }
    }

    #[tokio::test]
    async fn script_overrides_the_rng() {
        let mock = MockDelivery::scripted(vec![false, true, false]);
        assert!(mock.send(1, "a").await.is_err());
        assert!(mock.send(1, "b").await.is_ok());
        assert!(mock.send(1, "c").await.is_err());
        // Script exhausted: the always-succeeds RNG takes over.
        assert!(mock.send(1, "d").await.is_ok());
    }

    #[tokio::test]
    async fn failure_error_carries_structured_context() {
        let mock = MockDelivery::always_fails();
        let Err(ConfabError::Delivery {
            conversation_id,
            status,
            body,
        }) = mock.send(7, "x").await
        else {
            panic!("expected delivery error");
        };
        assert_eq!(conversation_id, 7);
        assert_eq!(status, "mock_failure");
        assert!(body.contains("failure_rate"));
    }

    #[tokio::test]
    async fn capture_buffer_records_and_clears() {
        let mock = MockDelivery::always_succeeds();
        mock.send(1, "one").await.unwrap();
        mock.send(2, "two").await.unwrap();

        let sent = mock.sent_messages().await;
        assert_eq!(sent, vec![(1, "one".to_string()), (2, "two".to_string())]);

        mock.clear_sent().await;
        assert_eq!(mock.sent_count().await, 0);
    }
}
