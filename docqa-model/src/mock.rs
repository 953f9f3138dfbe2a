//! Mock LLM for tests and demos.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use docqa_core::{Llm, Message, QaError, Result, TokenStream};

/// A deterministic [`Llm`] that replays scripted responses.
///
/// Responses are consumed in order; once exhausted, every call echoes the
/// last user message prefixed with `"echo: "`. Streaming splits the response
/// into whitespace-delimited fragments so consumers see multiple items.
pub struct MockLlm {
    responses: Mutex<Vec<String>>,
}

impl MockLlm {
    /// Create a mock with no scripted responses (echo mode).
    pub fn new() -> Self {
        Self { responses: Mutex::new(Vec::new()) }
    }

    /// Create a mock that replays the given responses in order.
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut responses: Vec<String> = responses.into_iter().map(Into::into).collect();
        responses.reverse();
        Self { responses: Mutex::new(responses) }
    }

    fn next_response(&self, messages: &[Message]) -> String {
        if let Some(scripted) = self.responses.lock().expect("mock lock poisoned").pop() {
            return scripted;
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == docqa_core::Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        format!("echo: {last_user}")
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if messages.is_empty() {
            return Err(QaError::Model("empty message list".to_string()));
        }
        Ok(self.next_response(messages))
    }

    async fn complete_streaming(&self, messages: &[Message]) -> Result<TokenStream> {
        let response = self.complete(messages).await?;
        let fragments: Vec<Result<String>> = response
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(futures::stream::iter(fragments).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn replays_scripted_responses_in_order() {
        let llm = MockLlm::with_responses(["first", "second"]);
        let messages = [Message::user("q")];
        assert_eq!(llm.complete(&messages).await.unwrap(), "first");
        assert_eq!(llm.complete(&messages).await.unwrap(), "second");
        assert_eq!(llm.complete(&messages).await.unwrap(), "echo: q");
    }

    #[tokio::test]
    async fn streaming_reassembles_to_full_response() {
        let llm = MockLlm::with_responses(["the quick brown fox"]);
        let mut stream = llm.complete_streaming(&[Message::user("q")]).await.unwrap();

        let mut collected = String::new();
        let mut fragments = 0;
        while let Some(fragment) = stream.next().await {
            collected.push_str(&fragment.unwrap());
            fragments += 1;
        }
        assert_eq!(collected, "the quick brown fox");
        assert!(fragments > 1);
    }

    #[tokio::test]
    async fn empty_messages_is_an_error() {
        let llm = MockLlm::new();
        assert!(llm.complete(&[]).await.is_err());
    }
}
