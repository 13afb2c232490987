//! In-memory store — useful for testing and ephemeral sessions.
//!
//! Mirrors the text-space approximations of the real index: scoped search
//! requires both the query and the scope to appear in a record's text, and
//! history retrieval uses a case-insensitive substring match on the scope.

use async_trait::async_trait;
use chrono::Utc;
use medbrief_core::error::StoreError;
use medbrief_core::record::{PatientRecord, RecordQuery};
use medbrief_core::store::DocumentStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default history result cap, matching the retrieval config default.
const DEFAULT_HISTORY_CAP: usize = 50;

/// A store that keeps records in a Vec, in insertion order.
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<PatientRecord>>>,
    history_fetch_cap: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            history_fetch_cap: DEFAULT_HISTORY_CAP,
        }
    }

    /// Create a store pre-seeded with records.
    pub fn with_records(records: Vec<PatientRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            history_fetch_cap: DEFAULT_HISTORY_CAP,
        }
    }

    /// Builder-style override of the history result cap.
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_fetch_cap = cap;
        self
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(&self, query: &RecordQuery) -> Result<Vec<PatientRecord>, StoreError> {
        let records = self.records.read().await;

        let mut results: Vec<PatientRecord> = records
            .iter()
            .filter(|r| {
                let query_match =
                    matches(&r.text, &query.text) || matches(&r.category, &query.text);
                let scope_match = query
                    .patient_scope
                    .as_deref()
                    .map(|s| matches(&r.text, s) || r.patient_id == s.to_lowercase())
                    .unwrap_or(true);
                query_match && scope_match
            })
            .cloned()
            .collect();

        results.truncate(query.result_limit);
        Ok(results)
    }

    async fn patient_history(
        &self,
        patient_scope: &str,
    ) -> Result<Vec<PatientRecord>, StoreError> {
        let records = self.records.read().await;

        Ok(records
            .iter()
            .filter(|r| {
                matches(&r.text, patient_scope) || r.patient_id == patient_scope.to_lowercase()
            })
            .take(self.history_fetch_cap)
            .cloned()
            .collect())
    }

    async fn write_record(
        &self,
        patient_scope: &str,
        text: &str,
        category: &str,
    ) -> Result<(), StoreError> {
        let record = PatientRecord::new(patient_scope.to_lowercase(), text)
            .with_category(category)
            .with_date(Utc::now().format("%Y-%m-%d").to_string());
        self.records.write().await.push(record);
        Ok(())
    }
}
