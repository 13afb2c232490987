//! DocumentStore trait — the abstraction over the external document index.
//!
//! The index is a remote full-text search service with no field-level patient
//! filter; scope narrowing is approximated in text space. Implementations
//! must be stateless per call so a single adapter instance can be shared
//! across sessions.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{PatientRecord, RecordQuery};

/// Retrieval and ingestion operations against the document index.
///
/// Read methods return the store's native relevance order. All methods are
/// `&self` and hold no mutable per-call state, so one instance is safely
/// shared across concurrent sessions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// A human-readable name for this store (e.g. "search_index", "in_memory").
    fn name(&self) -> &str;

    /// Full-text search, optionally narrowed to one patient.
    ///
    /// Scope narrowing embeds the query's `patient_scope` as an additional
    /// required term (boolean AND), not an exact field filter. Callers must
    /// expect false positives and negatives from this approximation.
    async fn search(
        &self,
        query: &RecordQuery,
    ) -> std::result::Result<Vec<PatientRecord>, StoreError>;

    /// Fetch up to a fixed cap of records mentioning the patient.
    ///
    /// A second approximation layer: results are filtered post-hoc by
    /// case-insensitive substring presence of the scope in each record's
    /// content. Order is relevance order, not chronological.
    async fn patient_history(
        &self,
        patient_scope: &str,
    ) -> std::result::Result<Vec<PatientRecord>, StoreError>;

    /// Upsert a single record into the index.
    ///
    /// Constructs a unique document identity from the scope, the current
    /// timestamp, and a random suffix. Best-effort: callers treat a failure
    /// as a logged `false`, never as an abort of the owning workflow.
    async fn write_record(
        &self,
        patient_scope: &str,
        text: &str,
        category: &str,
    ) -> std::result::Result<(), StoreError>;
}
