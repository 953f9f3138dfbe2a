//! Language-model capability trait and chat message types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system instruction.
    System,
    /// The end user's turn.
    User,
}

/// A single turn in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The author role.
    pub role: Role,
    /// The text content of the turn.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A finite stream of answer fragments produced incrementally by a model.
///
/// Each item is a token or fragment; the stream terminates once the model
/// signals completion. The stream is not restartable.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A language-model completion service.
///
/// Implementations wrap a specific provider (OpenAI, a local model, a mock)
/// behind a unified async interface. The pipeline depends only on this trait,
/// so providers are swappable at construction time.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier, for logging.
    fn name(&self) -> &str;

    /// Run a chat completion and return the full response text.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Run a chat completion, yielding fragments as the model emits them.
    ///
    /// The returned stream begins producing output before the completion
    /// finishes. Dropping the stream abandons the completion.
    async fn complete_streaming(&self, messages: &[Message]) -> Result<TokenStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_roles() {
        let system = Message::system("be helpful");
        assert_eq!(system.role, Role::System);
        assert_eq!(system.content, "be helpful");

        let user = Message::user("hello");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::System).unwrap();
        assert_eq!(json, "\"system\"");
    }
}
