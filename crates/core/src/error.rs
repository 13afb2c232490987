//! Error types for the medbrief domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. No error here is fatal:
//! the orchestration layer converts every failure into a defined degraded
//! return value (empty retrieval, apology string, `false` write status)
//! before it can reach a caller.

use thiserror::Error;

/// The top-level error type for all medbrief operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Document store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Generation backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Input validation errors ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the document index.
///
/// The read path degrades to an empty result set and the write path to a
/// logged `false` at the orchestration layer; these variants exist so that
/// internal boundaries stay typed instead of stringly.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Index request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),
}

/// Failures talking to the generation backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty completion: {0}")]
    EmptyCompletion(String),
}

/// Missing or empty required input, surfaced to the user as a message.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Transcript is empty — nothing to summarize")]
    EmptyTranscript,

    #[error("Condition must not be empty")]
    EmptyCondition,

    #[error("Patient scope must not be empty")]
    EmptyPatientScope,

    #[error("Record text must not be empty")]
    EmptyRecordText,
}
