//! # medbrief Core
//!
//! Domain types, traits, and error definitions for the medbrief patient-context
//! RAG engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping the document index or generation backend via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod message;
pub mod record;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use backend::{ChatMessage, GenerationBackend, GenerationRequest, GenerationResponse};
pub use error::{BackendError, Error, Result, StoreError, ValidationError};
pub use message::{Role, Turn};
pub use record::{PatientRecord, RecordQuery, DEFAULT_CATEGORY, PLACEHOLDER_DATE};
pub use store::DocumentStore;
