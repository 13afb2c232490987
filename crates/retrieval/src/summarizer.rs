//! Consultation transcript summarization and index write-back.
//!
//! Turns a raw consultation transcript into a structured summary (fixed
//! field labels, see [`crate::prompts::SUMMARY_SYSTEM`]) and then writes the
//! summary back into the document store so later retrievals can find it.
//! The write is best-effort: a failed ingest is reported in the outcome,
//! never by discarding the summary.

use std::sync::Arc;

use medbrief_core::backend::{ChatMessage, GenerationBackend, GenerationRequest};
use medbrief_core::error::{Error, Result, ValidationError};
use medbrief_core::store::DocumentStore;
use tracing::{info, warn};

use crate::prompts;

const SUMMARY_MAX_TOKENS: u32 = 1024;
const SUMMARY_TEMPERATURE: f32 = 0.2;

/// Category under which consultation summaries are indexed.
pub const SUMMARY_CATEGORY: &str = "consultation_summary";

/// Result of processing one transcript end to end.
#[derive(Debug, Clone)]
pub struct ConsultationOutcome {
    /// The generated structured summary.
    pub summary: String,
    /// Whether the summary was successfully written to the index.
    pub ingested: bool,
}

/// Summarizes consultation transcripts and ingests the results.
pub struct ConsultationSummarizer {
    store: Arc<dyn DocumentStore>,
    backend: Arc<dyn GenerationBackend>,
}

impl ConsultationSummarizer {
    pub fn new(store: Arc<dyn DocumentStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { store, backend }
    }

    /// Summarize a transcript into the structured field-label format.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank transcript and propagates
    /// backend failures.
    pub async fn summarize_transcript(&self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            return Err(Error::Validation(ValidationError::EmptyTranscript));
        }

        let response = self
            .backend
            .complete(GenerationRequest {
                messages: vec![
                    ChatMessage::system(prompts::SUMMARY_SYSTEM),
                    ChatMessage::user(transcript),
                ],
                max_tokens: SUMMARY_MAX_TOKENS,
                temperature: SUMMARY_TEMPERATURE,
            })
            .await?;

        Ok(response.content)
    }

    /// Summarize a transcript and write the summary into the index.
    ///
    /// The summary is returned even when the index write fails; `ingested`
    /// records whether the write succeeded.
    pub async fn process_transcript(
        &self,
        patient_scope: &str,
        transcript: &str,
    ) -> Result<ConsultationOutcome> {
        if patient_scope.trim().is_empty() {
            return Err(Error::Validation(ValidationError::EmptyPatientScope));
        }

        let summary = self.summarize_transcript(transcript).await?;

        let ingested = match self
            .store
            .write_record(patient_scope, &summary, SUMMARY_CATEGORY)
            .await
        {
            Ok(()) => {
                info!(patient = patient_scope, "Consultation summary ingested");
                true
            }
            Err(e) => {
                warn!(patient = patient_scope, error = %e, "Summary ingest failed");
                false
            }
        };

        Ok(ConsultationOutcome { summary, ingested })
    }
}
