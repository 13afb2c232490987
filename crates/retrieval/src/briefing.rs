//! Doctor briefings and condition-focused summaries.
//!
//! Two workflows over the same store/backend pair:
//!
//! - [`BriefingGenerator::doctor_briefing`] — whole-history briefing,
//!   comprehensive or recent-developments flavor.
//! - [`BriefingGenerator::condition_summary`] — briefing narrowed to one
//!   named condition via a scoped search.
//!
//! Both return plain strings; every failure is converted into a
//! human-readable message at this edge, never an error the caller must
//! handle.

use std::sync::Arc;

use medbrief_core::backend::{ChatMessage, GenerationBackend, GenerationRequest};
use medbrief_core::error::{Error, Result, ValidationError};
use medbrief_core::record::{PatientRecord, RecordQuery};
use medbrief_core::store::DocumentStore;
use tracing::{debug, warn};

use crate::prompts;

const COMPREHENSIVE_MAX_TOKENS: u32 = 1500;
const RECENT_MAX_TOKENS: u32 = 800;
const CONDITION_MAX_TOKENS: u32 = 1000;
const CONDITION_SEARCH_LIMIT: usize = 10;
const BRIEFING_TEMPERATURE: f32 = 0.2;

/// Which flavor of whole-history briefing to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefingMode {
    /// Full structured briefing (overview, history, status, plan, notes).
    Comprehensive,
    /// Shorter briefing focused on recent developments and immediate care.
    Recent,
}

impl BriefingMode {
    /// Parse a mode name; anything unrecognized falls back to comprehensive.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "recent" => Self::Recent,
            _ => Self::Comprehensive,
        }
    }
}

/// Generates medical briefings from a patient's indexed records.
pub struct BriefingGenerator {
    store: Arc<dyn DocumentStore>,
    backend: Arc<dyn GenerationBackend>,
}

impl BriefingGenerator {
    pub fn new(store: Arc<dyn DocumentStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { store, backend }
    }

    /// Generate a whole-history briefing for one patient.
    ///
    /// A patient with no indexed records gets a fixed no-records message
    /// without any generation call. Failures come back as a
    /// `"Error generating briefing: ..."` string.
    pub async fn doctor_briefing(&self, patient_scope: &str, mode: BriefingMode) -> String {
        match self.try_doctor_briefing(patient_scope, mode).await {
            Ok(briefing) => briefing,
            Err(e) => {
                warn!(patient = patient_scope, error = %e, "Briefing generation failed");
                format!("Error generating briefing: {e}")
            }
        }
    }

    async fn try_doctor_briefing(&self, patient_scope: &str, mode: BriefingMode) -> Result<String> {
        let mut history = self.store.patient_history(patient_scope).await?;

        if history.is_empty() {
            return Ok(format!(
                "No medical records found for patient: {patient_scope}"
            ));
        }

        // Most recent first. Stable, so same-date records keep their
        // retrieval order.
        history.sort_by(|a, b| b.date.cmp(&a.date));

        let context = render_full_history(&history, patient_scope);

        let (system, prompt, max_tokens) = match mode {
            BriefingMode::Comprehensive => (
                prompts::COMPREHENSIVE_SYSTEM.to_string(),
                prompts::comprehensive_briefing(&context, patient_scope),
                COMPREHENSIVE_MAX_TOKENS,
            ),
            BriefingMode::Recent => (
                prompts::RECENT_SYSTEM.to_string(),
                prompts::recent_briefing(&context, patient_scope),
                RECENT_MAX_TOKENS,
            ),
        };

        debug!(
            patient = patient_scope,
            records = history.len(),
            ?mode,
            "Generating doctor briefing"
        );

        let response = self
            .backend
            .complete(GenerationRequest {
                messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
                max_tokens,
                temperature: BRIEFING_TEMPERATURE,
            })
            .await?;

        Ok(response.content)
    }

    /// Generate a briefing narrowed to one named condition.
    ///
    /// Retrieval is a scoped search for the condition text rather than the
    /// full history. No matching records means a fixed message and zero
    /// generation calls.
    pub async fn condition_summary(&self, patient_scope: &str, condition: &str) -> String {
        match self.try_condition_summary(patient_scope, condition).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(patient = patient_scope, condition, error = %e, "Condition summary failed");
                format!("Error generating condition summary: {e}")
            }
        }
    }

    async fn try_condition_summary(&self, patient_scope: &str, condition: &str) -> Result<String> {
        if condition.trim().is_empty() {
            return Err(Error::Validation(ValidationError::EmptyCondition));
        }

        let records = self
            .store
            .search(&RecordQuery::new(condition, CONDITION_SEARCH_LIMIT).scoped(patient_scope))
            .await?;

        if records.is_empty() {
            return Ok(format!(
                "No records found for patient {patient_scope} related to {condition}"
            ));
        }

        let context = render_condition_context(&records, patient_scope, condition);

        let response = self
            .backend
            .complete(GenerationRequest {
                messages: vec![
                    ChatMessage::system(prompts::condition_system(condition)),
                    ChatMessage::user(prompts::condition_briefing(
                        &context,
                        patient_scope,
                        condition,
                    )),
                ],
                max_tokens: CONDITION_MAX_TOKENS,
                temperature: BRIEFING_TEMPERATURE,
            })
            .await?;

        Ok(response.content)
    }
}

/// Render the full history grouped by category.
///
/// Categories appear in first-seen order over the (already sorted) record
/// sequence; within a category records keep their order. Category headers
/// are upper-cased with underscores spelled as spaces.
fn render_full_history(records: &[PatientRecord], patient_scope: &str) -> String {
    let mut parts = vec![format!(
        "=== COMPLETE MEDICAL RECORDS FOR PATIENT: {} ===\n",
        patient_scope.to_uppercase()
    )];

    let mut category_order: Vec<&str> = Vec::new();
    for record in records {
        if !category_order.contains(&record.category.as_str()) {
            category_order.push(&record.category);
        }
    }

    for category in category_order {
        parts.push(format!(
            "\n--- {} ---",
            category.to_uppercase().replace('_', " ")
        ));

        for record in records.iter().filter(|r| r.category == category) {
            parts.push(format!("Date: {}", record.date));
            parts.push(format!("Details: {}", record.text));
            parts.push(String::new());
        }
    }

    parts.join("\n")
}

/// Render condition-search results with a focus header.
fn render_condition_context(
    records: &[PatientRecord],
    patient_scope: &str,
    condition: &str,
) -> String {
    let mut parts = vec![
        format!(
            "=== MEDICAL RECORDS FOR PATIENT: {} ===",
            patient_scope.to_uppercase()
        ),
        format!("=== FOCUS: {} ===\n", condition.to_uppercase()),
    ];

    for record in records {
        parts.push(format!(
            "Date: {} | Type: {}",
            record.date, record.category
        ));
        parts.push(format!("Content: {}", record.text));
        parts.push("---".to_string());
    }

    parts.join("\n")
}
