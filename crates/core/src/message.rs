//! Conversation turn domain types.
//!
//! A `Turn` is one utterance in a chat session. Turns are appended in strict
//! chronological order; only the most recent bounded window is replayed into
//! new prompts.

use serde::{Deserialize, Serialize};

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (clinician asking questions)
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (context, rules) — prompt-only, never stored
    /// in session history
    System,
}

/// A single turn in a conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Patient scope active when the turn was made, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_scope: Option<String>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>, patient_scope: Option<&str>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            patient_scope: patient_scope.map(str::to_string),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>, patient_scope: Option<&str>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            patient_scope: patient_scope.map(str::to_string),
        }
    }
}
