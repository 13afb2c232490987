//! Adapter over the external full-text document index.
//!
//! The index exposes a search endpoint and a single-document upsert endpoint.
//! It has no field-level patient filter, so scope narrowing is approximated
//! in text space twice over:
//!
//! 1. `search` appends the scope as an additional required term (boolean AND)
//!    to the free-text query.
//! 2. `patient_history` fetches a capped result set for the scope and then
//!    filters client-side by case-insensitive substring presence of the scope
//!    in each record's content.
//!
//! Both approximations produce false positives and negatives; callers accept
//! that as the contract.

use async_trait::async_trait;
use chrono::Utc;
use medbrief_config::SearchConfig;
use medbrief_core::error::StoreError;
use medbrief_core::record::{PatientRecord, RecordQuery, DEFAULT_CATEGORY, PLACEHOLDER_DATE};
use medbrief_core::store::DocumentStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

const API_VERSION: &str = "2023-11-01";

/// Fields requested from the index on every read.
const SELECT_FIELDS: &str = "chunk_id,content,title,filepath";

/// Adapter over the remote search index.
///
/// Holds no mutable per-call state; one instance is safely shared across
/// sessions. Every operation is a single HTTP round-trip.
#[derive(Debug)]
pub struct SearchIndexStore {
    endpoint: String,
    index: String,
    api_key: String,
    history_fetch_cap: usize,
    client: reqwest::Client,
}

impl SearchIndexStore {
    /// Create a new adapter from configuration.
    ///
    /// `history_fetch_cap` bounds the result set fetched per
    /// `patient_history` call (`retrieval.history_fetch_cap` in config).
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured.
    pub fn new(config: &SearchConfig, history_fetch_cap: usize) -> Result<Self, StoreError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| StoreError::AuthFailed("search API key not configured".into()))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            api_key,
            history_fetch_cap,
            client,
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, API_VERSION
        )
    }

    fn upsert_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/index?api-version={}",
            self.endpoint, self.index, API_VERSION
        )
    }

    /// Issue a raw search and return the unnormalized documents.
    async fn raw_search(
        &self,
        search: &str,
        top: usize,
    ) -> Result<Vec<RawDocument>, StoreError> {
        let payload = SearchPayload {
            search,
            top,
            search_fields: "content",
            select: SELECT_FIELDS,
        };

        debug!(query = %search, top, "Searching document index");

        let response = self
            .client
            .post(self.search_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(StoreError::AuthFailed(
                "Invalid search API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Index returned error");
            return Err(StoreError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;

        Ok(body.value)
    }

    /// Normalize a raw index document into a [`PatientRecord`].
    ///
    /// `patient_id` comes from the scope when one was given; otherwise it is
    /// extracted from a `Patient: <id>` line in the content, lowercased, with
    /// `"unknown"` as the fallback. The index carries no date field, so the
    /// placeholder date is applied.
    fn normalize(raw: RawDocument, patient_scope: Option<&str>) -> PatientRecord {
        let content = raw.content.unwrap_or_default();
        let patient_id = match patient_scope {
            Some(scope) => scope.to_lowercase(),
            None => extract_patient_id(&content),
        };

        PatientRecord {
            patient_id,
            text: content,
            category: raw
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: PLACEHOLDER_DATE.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for SearchIndexStore {
    fn name(&self) -> &str {
        "search_index"
    }

    async fn search(&self, query: &RecordQuery) -> Result<Vec<PatientRecord>, StoreError> {
        // Scope narrowing by query composition, not a field filter.
        let search = match &query.patient_scope {
            Some(scope) => format!("{} AND {}", query.text, scope),
            None => query.text.clone(),
        };

        let raw = self.raw_search(&search, query.result_limit).await?;

        Ok(raw
            .into_iter()
            .map(|doc| Self::normalize(doc, query.patient_scope.as_deref()))
            .filter(|rec| !rec.text.is_empty())
            .collect())
    }

    async fn patient_history(
        &self,
        patient_scope: &str,
    ) -> Result<Vec<PatientRecord>, StoreError> {
        let raw = self.raw_search(patient_scope, self.history_fetch_cap).await?;
        let scope_lower = patient_scope.to_lowercase();

        // Post-hoc filter: the index matched on relevance, keep only records
        // that actually mention the patient.
        Ok(raw
            .into_iter()
            .filter(|doc| {
                doc.content
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&scope_lower))
            })
            .map(|doc| Self::normalize(doc, Some(patient_scope)))
            .collect())
    }

    async fn write_record(
        &self,
        patient_scope: &str,
        text: &str,
        category: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let uuid = Uuid::new_v4().to_string();
        let doc_id = format!(
            "{}_{}_{}",
            patient_scope,
            now.format("%Y%m%d_%H%M%S"),
            &uuid[..8]
        );

        let document = UpsertDocument {
            search_action: "mergeOrUpload",
            chunk_id: doc_id,
            parent_id: patient_scope.to_string(),
            content: format!(
                "Patient: {}\nCategory: {}\nDate: {}\n\n{}",
                patient_scope,
                category,
                now.format("%Y-%m-%d"),
                text
            ),
            title: format!("{} - {}", patient_scope, category),
            url: String::new(),
            filepath: format!("consultation_{}_{}", patient_scope, now.format("%Y%m%d")),
        };

        debug!(patient = %patient_scope, category, "Upserting record into index");

        let response = self
            .client
            .post(self.upsert_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&UpsertPayload {
                value: vec![document],
            })
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(StoreError::AuthFailed(
                "Invalid search API key or insufficient permissions".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Index upsert failed");
            return Err(StoreError::Api {
                status_code: status,
                message: error_body,
            });
        }

        Ok(())
    }
}

/// Extract a lowercased patient identifier from a `Patient: <id>` line.
fn extract_patient_id(content: &str) -> String {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Patient:") {
            let id: String = rest
                .trim()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !id.is_empty() {
                return id.to_lowercase();
            }
        }
    }
    "unknown".to_string()
}

// --- Index API types (internal) ---

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    search: &'a str,
    top: usize,
    #[serde(rename = "searchFields")]
    search_fields: &'a str,
    select: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpsertPayload {
    value: Vec<UpsertDocument>,
}

#[derive(Debug, Serialize)]
struct UpsertDocument {
    #[serde(rename = "@search.action")]
    search_action: &'static str,
    chunk_id: String,
    parent_id: String,
    content: String,
    title: String,
    url: String,
    filepath: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_patient_from_header_line() {
        let content = "Patient: Moayad\nCategory: vitals\n\nBP 120/80";
        assert_eq!(extract_patient_id(content), "moayad");
    }

    #[test]
    fn extraction_falls_back_to_unknown() {
        assert_eq!(extract_patient_id("no header here"), "unknown");
        assert_eq!(extract_patient_id("Patient:   "), "unknown");
    }

    #[test]
    fn normalize_prefers_scope_over_content() {
        let raw = RawDocument {
            content: Some("Patient: tomas\nfollow-up".into()),
            title: Some("orthopedics".into()),
        };
        let rec = SearchIndexStore::normalize(raw, Some("Moayad"));
        assert_eq!(rec.patient_id, "moayad");
        assert_eq!(rec.category, "orthopedics");
        assert_eq!(rec.date, PLACEHOLDER_DATE);
    }

    #[test]
    fn normalize_defaults_missing_fields() {
        let raw = RawDocument {
            content: Some("Patient: santiago\nvisit notes".into()),
            title: None,
        };
        let rec = SearchIndexStore::normalize(raw, None);
        assert_eq!(rec.patient_id, "santiago");
        assert_eq!(rec.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn normalize_empty_title_defaults() {
        let raw = RawDocument {
            content: Some("text".into()),
            title: Some(String::new()),
        };
        let rec = SearchIndexStore::normalize(raw, Some("moayad"));
        assert_eq!(rec.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn constructor_carries_history_cap_and_trims_endpoint() {
        let config = SearchConfig {
            endpoint: "https://example.search.windows.net/".into(),
            index: "patients".into(),
            api_key: Some("key".into()),
            timeout_secs: 30,
        };
        let store = SearchIndexStore::new(&config, 25).unwrap();
        assert_eq!(store.history_fetch_cap, 25);
        assert_eq!(store.endpoint, "https://example.search.windows.net");
    }

    #[test]
    fn missing_api_key_rejected() {
        let config = SearchConfig {
            endpoint: "https://example.search.windows.net".into(),
            index: "patients".into(),
            api_key: None,
            timeout_secs: 30,
        };
        let err = SearchIndexStore::new(&config, 50).unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn search_response_parses_index_shape() {
        let data = r#"{
            "value": [
                {"chunk_id": "c1", "content": "Patient: moayad\nBP 120/80", "title": "vitals", "filepath": "f1"},
                {"chunk_id": "c2", "content": null, "title": null}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.value.len(), 2);
        assert!(parsed.value[1].content.is_none());
    }

    #[test]
    fn upsert_document_serializes_action() {
        let doc = UpsertDocument {
            search_action: "mergeOrUpload",
            chunk_id: "moayad_20250618_120000_abcd1234".into(),
            parent_id: "moayad".into(),
            content: "Patient: moayad\n\nsummary".into(),
            title: "moayad - consultation_summary".into(),
            url: String::new(),
            filepath: "consultation_moayad_20250618".into(),
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("@search.action"));
        assert!(json.contains("mergeOrUpload"));
    }
}
