// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete engine against a temp SQLite
//! database and a mock delivery adapter: registry, store, ingest service,
//! and dispatch service, all sharing one single-writer connection.

use std::sync::Arc;

use confab_core::ConfabError;
use confab_dispatch::DispatchService;
use confab_ingest::IngestService;
use confab_storage::{ConversationRegistry, Database, MessageStore};

use crate::mock_delivery::MockDelivery;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    failure_rate: f64,
    seed: u64,
    outcomes: Option<Vec<bool>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            failure_rate: 0.0,
            seed: 0,
            outcomes: None,
        }
    }

    /// Set the mock adapter failure rate in `[0.0, 1.0]`.
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    /// Seed the mock adapter's RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Script the mock adapter's exact outcome sequence (`true` = succeed).
    /// Takes precedence over the failure rate until exhausted.
    pub fn with_delivery_outcomes(mut self, outcomes: Vec<bool>) -> Self {
        self.outcomes = Some(outcomes);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ConfabError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ConfabError::Storage {
            source: e.into(),
        })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::open(&db_path.to_string_lossy()).await?);

        let adapter = Arc::new(match self.outcomes {
            Some(outcomes) => MockDelivery::scripted(outcomes),
            None => MockDelivery::new(self.failure_rate, self.seed),
        });

        let registry = ConversationRegistry::new(db.clone());
        let store = MessageStore::new(db.clone());
        let ingest = IngestService::new(registry.clone(), store.clone());
        let dispatch = DispatchService::new(store.clone(), adapter.clone());

        Ok(TestHarness {
            registry,
            store,
            ingest,
            dispatch,
            adapter,
            db,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete Confab stack over temp storage and a mock adapter.
///
/// The temp directory lives as long as the harness; each harness is fully
/// isolated, so tests are independent and order-insensitive.
pub struct TestHarness {
    pub registry: ConversationRegistry,
    pub store: MessageStore,
    pub ingest: IngestService,
    pub dispatch: DispatchService,
    pub adapter: Arc<MockDelivery>,
    pub db: Arc<Database>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
