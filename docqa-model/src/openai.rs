//! OpenAI chat completion client.
//!
//! This module is only available when the `openai` feature is enabled.

use async_openai::{
    config::OpenAIConfig as AsyncOpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, error};

use docqa_core::{Llm, Message, QaError, Result, Role, TokenStream};

/// Configuration for [`OpenAIClient`].
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model name (e.g. `gpt-4o-mini`).
    pub model: String,
    /// Optional API base URL override for OpenAI-compatible backends.
    pub base_url: Option<String>,
    /// Optional sampling temperature.
    pub temperature: Option<f32>,
    /// Optional completion token cap.
    pub max_tokens: Option<u32>,
}

impl OpenAIConfig {
    /// Create a configuration with the given key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Point the client at an OpenAI-compatible API (Ollama, vLLM, etc.).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the number of completion tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// An [`Llm`] backed by the OpenAI chat completions API.
pub struct OpenAIClient {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAIConfig,
}

impl OpenAIClient {
    /// Create a new OpenAI client.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(QaError::Model("OpenAI API key must not be empty".to_string()));
        }

        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self { client: Client::with_config(openai_config), config })
    }

    /// Create a client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| QaError::Model("OPENAI_API_KEY environment variable not set".to_string()))?;
        Self::new(OpenAIConfig::new(api_key, model))
    }

    fn convert_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>> {
        messages
            .iter()
            .map(|m| {
                let converted: ChatCompletionRequestMessage = match m.role {
                    Role::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content.as_str())
                        .build()
                        .map_err(|e| QaError::Model(format!("failed to build message: {e}")))?
                        .into(),
                    Role::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content.as_str())
                        .build()
                        .map_err(|e| QaError::Model(format!("failed to build message: {e}")))?
                        .into(),
                };
                Ok(converted)
            })
            .collect()
    }

    fn build_request(
        &self,
        messages: &[Message],
    ) -> Result<async_openai::types::CreateChatCompletionRequest> {
        let converted = Self::convert_messages(messages)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.config.model).messages(converted);
        if let Some(temperature) = self.config.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            builder.max_tokens(max_tokens);
        }

        builder.build().map_err(|e| QaError::Model(format!("failed to build request: {e}")))
    }
}

#[async_trait]
impl Llm for OpenAIClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = self.build_request(messages)?;

        debug!(model = %self.config.model, messages = messages.len(), "chat completion");
        let response = self.client.chat().create(request).await.map_err(|e| {
            error!(model = %self.config.model, error = %e, "OpenAI API error");
            QaError::Model(format!("OpenAI API error: {e}"))
        })?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| QaError::Model("OpenAI returned no choices".to_string()))?;

        Ok(answer)
    }

    async fn complete_streaming(&self, messages: &[Message]) -> Result<TokenStream> {
        let request = self.build_request(messages)?;
        let client = self.client.clone();
        let model = self.config.model.clone();

        let stream = try_stream! {
            let mut inner = client.chat().create_stream(request).await.map_err(|e| {
                error!(model = %model, error = %e, "OpenAI API error");
                QaError::Model(format!("OpenAI API error: {e}"))
            })?;

            while let Some(result) = inner.next().await {
                let chunk = result
                    .map_err(|e| QaError::Model(format!("OpenAI stream error: {e}")))?;
                for choice in chunk.choices {
                    if let Some(fragment) = choice.delta.content {
                        if !fragment.is_empty() {
                            yield fragment;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
