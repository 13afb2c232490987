//! Document store implementations for medbrief.
//!
//! - [`SearchIndexStore`] — adapter over the external full-text search
//!   service the patient documents live in.
//! - [`InMemoryStore`] — Vec-backed store for tests and ephemeral sessions.

mod in_memory;
mod search_index;

pub use in_memory::InMemoryStore;
pub use search_index::SearchIndexStore;
