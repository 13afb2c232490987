//! Generation backend implementations for medbrief.
//!
//! - [`AzureChatBackend`] — Azure-style deployment-scoped chat completions.
//! - [`ScriptedBackend`] — scripted mock for tests (queue of canned
//!   responses with call counting).

mod azure_chat;
mod mock;

pub use azure_chat::AzureChatBackend;
pub use mock::ScriptedBackend;
