//! Patient record and query value objects.
//!
//! These are the value types that flow between the document store, the
//! context assembler, and the briefing generator. Records are copied out of
//! the store and never mutated in place.

use serde::{Deserialize, Serialize};

/// Category assigned to records the index returns without a title.
pub const DEFAULT_CATEGORY: &str = "general";

/// Date stamped onto records when the index carries no date field.
///
/// The external index does not reliably store a date, so retrieval-side
/// normalization applies this fixed placeholder. Records written by us embed
/// their real date inside the content header instead.
pub const PLACEHOLDER_DATE: &str = "2025-06-18";

/// A normalized medical record retrieved from the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Lower-cased patient identifier. Opaque string key — not validated
    /// against any master list here.
    pub patient_id: String,

    /// Record body. Non-empty for any record that reaches the assembler.
    pub text: String,

    /// Record category (e.g. "consultation_summary"). Defaults to
    /// [`DEFAULT_CATEGORY`] when the store has none.
    pub category: String,

    /// Record date as `YYYY-MM-DD`. Defaults to [`PLACEHOLDER_DATE`] when
    /// the store has none.
    pub date: String,
}

impl PatientRecord {
    /// Create a record with default category and placeholder date.
    pub fn new(patient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            text: text.into(),
            category: DEFAULT_CATEGORY.to_string(),
            date: PLACEHOLDER_DATE.to_string(),
        }
    }

    /// Builder-style category override.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder-style date override.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}

/// A retrieval request against the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Free-text query sent to the index.
    pub text: String,

    /// Optional patient scope. Narrowing is approximated by embedding the
    /// scope as an additional required term in the free-text query.
    pub patient_scope: Option<String>,

    /// Maximum results to return. Must be greater than zero.
    pub result_limit: usize,
}

impl RecordQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        debug_assert!(limit > 0, "result_limit must be > 0");
        Self {
            text: text.into(),
            patient_scope: None,
            result_limit: limit,
        }
    }

    pub fn scoped(mut self, patient_scope: impl Into<String>) -> Self {
        self.patient_scope = Some(patient_scope.into().to_lowercase());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults() {
        let rec = PatientRecord::new("moayad", "BP 120/80");
        assert_eq!(rec.category, DEFAULT_CATEGORY);
        assert_eq!(rec.date, PLACEHOLDER_DATE);
    }

    #[test]
    fn record_builders() {
        let rec = PatientRecord::new("moayad", "BP 120/80")
            .with_category("vitals")
            .with_date("2025-01-02");
        assert_eq!(rec.category, "vitals");
        assert_eq!(rec.date, "2025-01-02");
    }

    #[test]
    fn scoped_query_lowercases() {
        let q = RecordQuery::new("cholesterol", 5).scoped("Moayad");
        assert_eq!(q.patient_scope.as_deref(), Some("moayad"));
    }

    #[test]
    fn record_serialization_roundtrip() {
        let rec = PatientRecord::new("tomas", "knee pain").with_category("orthopedics");
        let json = serde_json::to_string(&rec).unwrap();
        let back: PatientRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
