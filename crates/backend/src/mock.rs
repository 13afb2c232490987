//! Scripted mock backend for tests.

use async_trait::async_trait;
use medbrief_core::backend::{GenerationBackend, GenerationRequest, GenerationResponse};
use medbrief_core::error::BackendError;
use std::sync::Mutex;

/// A mock backend that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request for later inspection. Runs out of responses →
/// panics, so a test that over-calls fails loudly.
pub struct ScriptedBackend {
    responses: Mutex<Vec<Result<GenerationResponse, BackendError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    call_count: Mutex<usize>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<GenerationResponse, BackendError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    /// A backend that returns a single text completion.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(GenerationResponse {
            content: text.to_string(),
        })])
    }

    /// A backend that returns the same text for every call.
    pub fn repeating_text(text: &str, times: usize) -> Self {
        Self::new(
            (0..times)
                .map(|_| {
                    Ok(GenerationResponse {
                        content: text.to_string(),
                    })
                })
                .collect(),
        )
    }

    /// A backend whose first call fails with the given error.
    pub fn failing(error: BackendError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, if any call was made.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, BackendError> {
        self.requests.lock().unwrap().push(request);

        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "ScriptedBackend: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        let response = responses[*count].clone();
        *count += 1;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbrief_core::backend::ChatMessage;

    fn request(text: &str) -> GenerationRequest {
        GenerationRequest {
            messages: vec![ChatMessage::user(text)],
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn returns_scripted_responses_in_order() {
        let backend = ScriptedBackend::new(vec![
            Ok(GenerationResponse {
                content: "first".into(),
            }),
            Ok(GenerationResponse {
                content: "second".into(),
            }),
        ]);

        assert_eq!(backend.complete(request("a")).await.unwrap().content, "first");
        assert_eq!(backend.complete(request("b")).await.unwrap().content, "second");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn records_requests_for_inspection() {
        let backend = ScriptedBackend::single_text("ok");
        backend.complete(request("inspect me")).await.unwrap();

        let last = backend.last_request().unwrap();
        assert_eq!(last.messages[0].content, "inspect me");
    }

    #[tokio::test]
    async fn failing_backend_returns_error() {
        let backend = ScriptedBackend::failing(BackendError::Network("connection reset".into()));
        let err = backend.complete(request("x")).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
