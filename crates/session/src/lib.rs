//! Conversational chat sessions over retrieval-augmented context.
//!
//! A [`ChatSession`] owns one conversation: it rebuilds retrieval context on
//! every turn, replays a bounded window of prior turns into the prompt, and
//! appends the user/assistant pair only when generation succeeds. Failed
//! turns are answered with an apology string and leave the history exactly
//! as it was.

use std::sync::Arc;

use medbrief_config::{ChatConfig, RetrievalConfig};
use medbrief_core::backend::{ChatMessage, GenerationBackend, GenerationRequest};
use medbrief_core::error::Result;
use medbrief_core::message::{Role, Turn};
use medbrief_core::store::DocumentStore;
use medbrief_retrieval::{prompts, ContextAssembler};
use tracing::{debug, warn};

/// One chat conversation with retrieval-augmented prompting.
///
/// Not `Sync`: each session is owned by one caller. The store and backend
/// behind it are shared and stateless per call.
pub struct ChatSession {
    assembler: ContextAssembler,
    backend: Arc<dyn GenerationBackend>,
    settings: ChatConfig,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        backend: Arc<dyn GenerationBackend>,
        settings: ChatConfig,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            assembler: ContextAssembler::new(store, retrieval),
            backend,
            settings,
            history: Vec::new(),
        }
    }

    /// Process one user message and return the assistant's reply.
    ///
    /// Retrieval happens fresh for every turn; conversation history is never
    /// re-retrieved, only replayed. On any generation failure the reply is
    /// an apology string carrying the error text, and the failed exchange is
    /// not recorded in history.
    pub async fn chat(&mut self, user_message: &str, patient_scope: Option<&str>) -> String {
        match self.try_chat(user_message, patient_scope).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                format!(
                    "I apologize, but I encountered an error: {e}. Please try rephrasing your question."
                )
            }
        }
    }

    async fn try_chat(&mut self, user_message: &str, patient_scope: Option<&str>) -> Result<String> {
        let context = self.assembler.build_context(user_message, patient_scope).await;

        let messages = self.build_messages(user_message, &context);

        debug!(
            turns = self.history.len(),
            scoped = patient_scope.is_some(),
            "Sending chat completion"
        );

        let response = self
            .backend
            .complete(GenerationRequest {
                messages,
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            })
            .await?;

        self.history.push(Turn::user(user_message, patient_scope));
        self.history
            .push(Turn::assistant(&response.content, patient_scope));

        Ok(response.content)
    }

    /// Assemble the prompt: system message with embedded context, then the
    /// most recent history window in original order, then the new message.
    fn build_messages(&self, user_message: &str, context: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(prompts::chat_system(context))];

        let window_start = self.history.len().saturating_sub(self.settings.history_window);
        for turn in &self.history[window_start..] {
            messages.push(match turn.role {
                Role::User => ChatMessage::user(&turn.content),
                Role::Assistant => ChatMessage::assistant(&turn.content),
                // System turns are never stored in history.
                Role::System => continue,
            });
        }

        messages.push(ChatMessage::user(user_message));
        messages
    }

    /// Clear the conversation history. Idempotent; store contents are
    /// unaffected.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// The full conversation history, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbrief_backend::ScriptedBackend;
    use medbrief_config::RetrievalConfig;
    use medbrief_core::backend::GenerationResponse;
    use medbrief_core::error::BackendError;
    use medbrief_core::record::PatientRecord;
    use medbrief_store::InMemoryStore;

    fn session(
        store: InMemoryStore,
        backend: ScriptedBackend,
    ) -> (ChatSession, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let session = ChatSession::new(
            Arc::new(store),
            backend.clone(),
            ChatConfig::default(),
            RetrievalConfig::default(),
        );
        (session, backend)
    }

    #[tokio::test]
    async fn successful_turn_appends_pair_to_history() {
        let (mut session, _) = session(InMemoryStore::new(), ScriptedBackend::single_text("Hi"));

        let reply = session.chat("Hello", None).await;

        assert_eq!(reply, "Hi");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].role, Role::User);
        assert_eq!(session.history()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn failed_turn_leaves_history_untouched() {
        let (mut session, _) = session(
            InMemoryStore::new(),
            ScriptedBackend::failing(BackendError::Network("timed out".into())),
        );

        let reply = session.chat("Hello", None).await;

        assert!(reply.starts_with("I apologize, but I encountered an error:"));
        assert!(reply.contains("timed out"));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn prompt_replays_only_the_history_window() {
        // 4 successful turns = 8 history entries; only the last 4 replay.
        let (mut session, backend) =
            session(InMemoryStore::new(), ScriptedBackend::repeating_text("ok", 5));

        for i in 0..4 {
            session.chat(&format!("question {i}"), None).await;
        }
        session.chat("final question", None).await;

        let request = backend.last_request().unwrap();
        // system + 4 windowed turns + new user message
        assert_eq!(request.messages.len(), 6);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "question 2");
        assert_eq!(request.messages[5].content, "final question");
    }

    #[tokio::test]
    async fn context_is_embedded_in_system_message() {
        let store = InMemoryStore::with_records(vec![PatientRecord::new(
            "moayad",
            "moayad BP 120/80",
        )
        .with_category("vitals")]);
        let (mut session, backend) = session(store, ScriptedBackend::single_text("ok"));

        session.chat("What were his vitals?", Some("moayad")).await;

        let request = backend.last_request().unwrap();
        let system = &request.messages[0].content;
        assert!(system.contains("MEDICAL RECORDS FOR PATIENT: MOAYAD"));
        assert!(system.contains("moayad BP 120/80"));
    }

    #[tokio::test]
    async fn context_is_rebuilt_every_turn() {
        let store = Arc::new(InMemoryStore::new());
        let backend = Arc::new(ScriptedBackend::repeating_text("ok", 2));
        let mut session = ChatSession::new(
            store.clone(),
            backend.clone(),
            ChatConfig::default(),
            RetrievalConfig::default(),
        );

        session.chat("any cholesterol results?", Some("moayad")).await;
        let first = backend.requests()[0].messages[0].content.clone();
        assert!(first.contains("No relevant medical records found."));

        // A record written between turns shows up in the next prompt.
        store
            .write_record("moayad", "moayad cholesterol 190", "lab_results")
            .await
            .unwrap();

        session.chat("any cholesterol results?", Some("moayad")).await;
        let second = backend.requests()[1].messages[0].content.clone();
        assert!(second.contains("moayad cholesterol 190"));
    }

    #[tokio::test]
    async fn duplicate_records_render_once_in_prompt() {
        // The same text reaches the assembler twice (stored twice, and again
        // via history + search overlap); the prompt must carry it once.
        let store = InMemoryStore::with_records(vec![
            PatientRecord::new("moayad", "moayad cholesterol 190").with_category("lab_results"),
            PatientRecord::new("moayad", "moayad cholesterol 190").with_category("general"),
        ]);
        let (mut session, backend) = session(store, ScriptedBackend::single_text("ok"));

        session.chat("cholesterol?", Some("moayad")).await;

        let system = backend.last_request().unwrap().messages[0].content.clone();
        assert_eq!(system.matches("moayad cholesterol 190").count(), 1);
    }

    #[tokio::test]
    async fn reset_clears_history_and_is_idempotent() {
        let (mut session, _) = session(
            InMemoryStore::new(),
            ScriptedBackend::repeating_text("ok", 1),
        );

        session.chat("Hello", None).await;
        assert_eq!(session.history().len(), 2);

        session.reset();
        assert!(session.history().is_empty());
        session.reset();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn recovery_after_failed_turn() {
        let (mut session, _) = session(
            InMemoryStore::new(),
            ScriptedBackend::new(vec![
                Err(BackendError::RateLimited {
                    retry_after_secs: 5,
                }),
                Ok(GenerationResponse {
                    content: "recovered".into(),
                }),
            ]),
        );

        session.chat("first", None).await;
        assert!(session.history().is_empty());

        let reply = session.chat("second", None).await;
        assert_eq!(reply, "recovered");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].content, "second");
    }
}
