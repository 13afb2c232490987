//! GenerationBackend trait — the abstraction over text-generation services.
//!
//! A backend knows how to send an ordered message list to a generative model
//! and get a completion back. The orchestration layer calls `complete()`
//! without knowing which backend is in use — pure polymorphism.
//!
//! Implementations: Azure-style chat completions, scripted mocks for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::message::Role;

/// One message in a generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Ordered message list (system instruction first).
    pub messages: Vec<ChatMessage>,

    /// Token ceiling for the completion.
    pub max_tokens: u32,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f32,
}

/// A completed generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The completion text.
    pub content: String,
}

/// The core generation backend trait.
///
/// Every operation issues exactly one call per invocation of the owning
/// workflow; there is no retry loop at this seam.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// A human-readable name for this backend (e.g. "azure", "mock").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, BackendError>;
}
