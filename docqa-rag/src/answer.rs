//! Answer generation over retrieved context.
//!
//! [`AnswerGenerator`] assembles a two-role conversation (system instruction
//! plus a user turn containing question and context) and delegates to an
//! [`Llm`]. The streaming variant bridges the provider's incremental output
//! through a bounded channel so consumers can interleave consumption with
//! other work and abandon the stream early.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use docqa_core::{Llm, Message};

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::error::Result;

/// Capacity of the token channel between producer task and consumer.
const STREAM_BUFFER: usize = 32;

/// A pull-based stream of answer fragments.
///
/// The stream is finite and not restartable: it ends once the model signals
/// completion and all buffered fragments are drained. If the underlying
/// completion fails after partial fragments were yielded, the stream simply
/// ends — there is no distinguishable error signal to the consumer.
pub type AnswerStream = ReceiverStream<String>;

/// Generates answers grounded in retrieved context.
pub struct AnswerGenerator {
    llm: Arc<dyn Llm>,
    system_prompt: String,
}

impl AnswerGenerator {
    /// Create a generator with the default system prompt.
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, system_prompt: DEFAULT_SYSTEM_PROMPT.to_string() }
    }

    /// Override the system prompt.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Assemble the two-role conversation: system instruction, then a user
    /// turn of question and context separated by a newline.
    fn build_messages(&self, question: &str, context: &str) -> Vec<Message> {
        vec![
            Message::system(&self.system_prompt),
            Message::user(format!("{question}\n{context}")),
        ]
    }

    /// Generate a complete answer.
    ///
    /// # Errors
    ///
    /// Any provider error propagates to the caller; no retry at this layer.
    pub async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let messages = self.build_messages(question, context);
        debug!(model = self.llm.name(), context_len = context.len(), "generating answer");
        Ok(self.llm.complete(&messages).await?)
    }

    /// Generate an answer as an incrementally produced fragment stream.
    ///
    /// A producer task drives the provider stream and writes fragments into
    /// a bounded channel; the returned [`AnswerStream`] reads from it.
    /// Dropping the stream stops the producer: its next send fails, the task
    /// exits, and the provider stream (and its connection) is dropped with it.
    ///
    /// # Errors
    ///
    /// Fails only if the provider rejects the completion up front. A failure
    /// after streaming began terminates the stream without an error signal
    /// (logged, not surfaced).
    pub async fn generate_stream(&self, question: &str, context: &str) -> Result<AnswerStream> {
        let messages = self.build_messages(question, context);
        debug!(model = self.llm.name(), context_len = context.len(), "streaming answer");

        let mut inner = self.llm.complete_streaming(&messages).await?;
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let model = self.llm.name().to_string();

        tokio::spawn(async move {
            while let Some(item) = inner.next().await {
                match item {
                    Ok(fragment) => {
                        if tx.send(fragment).await.is_err() {
                            // Consumer abandoned the stream.
                            debug!(model = %model, "answer stream consumer dropped");
                            return;
                        }
                    }
                    Err(e) => {
                        // Mid-stream failure ends the stream; the consumer
                        // sees termination, not an error.
                        warn!(model = %model, error = %e, "answer stream failed mid-generation");
                        return;
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }
}
