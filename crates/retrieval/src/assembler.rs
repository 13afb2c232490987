//! Context assembly: retrieve, deduplicate, truncate, render.
//!
//! The assembler is the read side of the RAG pipeline. Given a query and an
//! optional patient scope it produces one bounded, deterministic text block
//! that downstream prompts embed verbatim. Retrieval failures degrade to an
//! empty record set here; callers never see a store error from this path.

use std::collections::HashSet;
use std::sync::Arc;

use medbrief_config::RetrievalConfig;
use medbrief_core::record::{PatientRecord, RecordQuery};
use medbrief_core::store::DocumentStore;
use tracing::{debug, warn};

/// Text rendered when retrieval produced nothing usable.
pub const EMPTY_CONTEXT: &str = "No relevant medical records found.";

/// Assembles bounded context blocks from the document store.
pub struct ContextAssembler {
    store: Arc<dyn DocumentStore>,
    limits: RetrievalConfig,
}

impl ContextAssembler {
    pub fn new(store: Arc<dyn DocumentStore>, limits: RetrievalConfig) -> Self {
        Self { store, limits }
    }

    /// Build the context block for one query.
    ///
    /// Scoped: full patient history plus a scoped search, concatenated in
    /// that order, deduplicated by exact record text (first occurrence wins)
    /// and truncated to the configured record cap. Unscoped: a single search
    /// across all patients. Always returns a renderable string; an empty
    /// result set yields [`EMPTY_CONTEXT`].
    pub async fn build_context(&self, query: &str, patient_scope: Option<&str>) -> String {
        let records = self.gather(query, patient_scope).await;
        debug!(
            records = records.len(),
            scoped = patient_scope.is_some(),
            "Assembled retrieval context"
        );
        render_context(&records, patient_scope)
    }

    async fn gather(&self, query: &str, patient_scope: Option<&str>) -> Vec<PatientRecord> {
        match patient_scope {
            Some(scope) => {
                let history = self
                    .store
                    .patient_history(scope)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(patient = scope, error = %e, "Patient history fetch failed");
                        Vec::new()
                    });

                let hits = self
                    .store
                    .search(&RecordQuery::new(query, self.limits.scoped_search_limit).scoped(scope))
                    .await
                    .unwrap_or_else(|e| {
                        warn!(patient = scope, error = %e, "Scoped search failed");
                        Vec::new()
                    });

                let mut combined = history;
                combined.extend(hits);
                let mut unique = dedupe_by_text(combined);
                unique.truncate(self.limits.max_context_records);
                unique
            }
            None => self
                .store
                .search(&RecordQuery::new(query, self.limits.unscoped_search_limit))
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Unscoped search failed");
                    Vec::new()
                }),
        }
    }
}

/// Drop records whose text exactly matches an earlier record's text.
///
/// Exact string equality only; records differing by whitespace or case both
/// survive. Order is otherwise preserved.
pub fn dedupe_by_text(records: Vec<PatientRecord>) -> Vec<PatientRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.text.clone()))
        .collect()
}

/// Render records into the fixed context block layout.
///
/// Byte-for-byte deterministic for a given input sequence, so identical
/// retrievals produce identical prompts.
pub fn render_context(records: &[PatientRecord], patient_scope: Option<&str>) -> String {
    if records.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    let mut parts = Vec::with_capacity(records.len() * 3 + 1);

    match patient_scope {
        Some(scope) => parts.push(format!(
            "=== MEDICAL RECORDS FOR PATIENT: {} ===\n",
            scope.to_uppercase()
        )),
        None => parts.push("=== RELEVANT MEDICAL RECORDS ===\n".to_string()),
    }

    for record in records {
        parts.push(format!(
            "Patient: {} | Date: {} | Type: {}",
            record.patient_id, record.date, record.category
        ));
        parts.push(format!("Content: {}", record.text));
        parts.push("---".to_string());
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medbrief_core::error::StoreError;
    use medbrief_store::InMemoryStore;

    /// A store whose every read fails, for degradation tests.
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn search(&self, _query: &RecordQuery) -> Result<Vec<PatientRecord>, StoreError> {
            Err(StoreError::Network("connection refused".into()))
        }

        async fn patient_history(
            &self,
            _patient_scope: &str,
        ) -> Result<Vec<PatientRecord>, StoreError> {
            Err(StoreError::Network("connection refused".into()))
        }

        async fn write_record(
            &self,
            _patient_scope: &str,
            _text: &str,
            _category: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Network("connection refused".into()))
        }
    }

    fn assembler(store: Arc<dyn DocumentStore>) -> ContextAssembler {
        ContextAssembler::new(store, RetrievalConfig::default())
    }

    fn record(patient: &str, text: &str) -> PatientRecord {
        PatientRecord::new(patient, text)
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let records = vec![
            record("moayad", "BP 120/80").with_category("vitals"),
            record("moayad", "knee pain"),
            record("moayad", "BP 120/80").with_category("duplicate"),
        ];
        let unique = dedupe_by_text(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].category, "vitals");
        assert_eq!(unique[1].text, "knee pain");
    }

    #[test]
    fn dedupe_is_exact_match_only() {
        let records = vec![
            record("moayad", "BP 120/80"),
            record("moayad", "bp 120/80"),
            record("moayad", "BP 120/80 "),
        ];
        assert_eq!(dedupe_by_text(records).len(), 3);
    }

    #[test]
    fn render_empty_returns_sentinel() {
        assert_eq!(render_context(&[], Some("moayad")), EMPTY_CONTEXT);
        assert_eq!(render_context(&[], None), EMPTY_CONTEXT);
    }

    #[test]
    fn render_scoped_layout_is_exact() {
        let records = vec![record("moayad", "BP 120/80").with_category("vitals")];
        let rendered = render_context(&records, Some("moayad"));
        assert_eq!(
            rendered,
            "=== MEDICAL RECORDS FOR PATIENT: MOAYAD ===\n\n\
             Patient: moayad | Date: 2025-06-18 | Type: vitals\n\
             Content: BP 120/80\n\
             ---"
        );
    }

    #[test]
    fn render_unscoped_uses_general_header() {
        let records = vec![record("tomas", "knee pain")];
        let rendered = render_context(&records, None);
        assert!(rendered.starts_with("=== RELEVANT MEDICAL RECORDS ===\n"));
        assert!(rendered.contains("Patient: tomas"));
    }

    #[test]
    fn render_is_deterministic() {
        let records = vec![
            record("moayad", "BP 120/80"),
            record("moayad", "cholesterol 190"),
        ];
        let a = render_context(&records, Some("moayad"));
        let b = render_context(&records, Some("moayad"));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn scoped_context_truncates_to_record_cap() {
        let records: Vec<PatientRecord> = (0..12)
            .map(|i| record("moayad", &format!("moayad visit number {i}")))
            .collect();
        let store = Arc::new(InMemoryStore::with_records(records));
        let context = assembler(store).build_context("visit", Some("moayad")).await;

        // 8 records, 3 lines each, plus the header block.
        let content_lines = context.lines().filter(|l| l.starts_with("Content:")).count();
        assert_eq!(content_lines, 8);
    }

    #[tokio::test]
    async fn configured_history_cap_bounds_scoped_context() {
        // Query text matches nothing, so every record must arrive via the
        // history path and the store's configured cap.
        let records: Vec<PatientRecord> = (0..3)
            .map(|i| record("moayad", &format!("moayad visit {i}")))
            .collect();
        let store = Arc::new(InMemoryStore::with_records(records).with_history_cap(1));

        let context = assembler(store)
            .build_context("unrelated topic", Some("moayad"))
            .await;

        let content_lines = context.lines().filter(|l| l.starts_with("Content:")).count();
        assert_eq!(content_lines, 1);
    }

    #[tokio::test]
    async fn scoped_context_deduplicates_history_and_search_overlap() {
        // Both patient_history and the scoped search will return this record.
        let store = Arc::new(InMemoryStore::with_records(vec![
            record("moayad", "moayad reports chest pain").with_category("cardiology"),
        ]));
        let context = assembler(store).build_context("chest pain", Some("moayad")).await;

        let occurrences = context.matches("moayad reports chest pain").count();
        assert_eq!(occurrences, 1);
    }

    #[tokio::test]
    async fn empty_store_yields_sentinel() {
        let store = Arc::new(InMemoryStore::new());
        let context = assembler(store).build_context("anything", Some("ghost")).await;
        assert_eq!(context, EMPTY_CONTEXT);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_sentinel() {
        let context = assembler(Arc::new(BrokenStore))
            .build_context("anything", Some("moayad"))
            .await;
        assert_eq!(context, EMPTY_CONTEXT);

        let unscoped = assembler(Arc::new(BrokenStore))
            .build_context("anything", None)
            .await;
        assert_eq!(unscoped, EMPTY_CONTEXT);
    }
}
