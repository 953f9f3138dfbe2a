//! Configuration for the QA pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// The default system instruction for answer generation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Configuration parameters for the QA pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Minimum chunk size in tokens; shorter trailing remainders are dropped.
    pub min_tokens: usize,
    /// Maximum chunk size in tokens.
    pub max_tokens: usize,
    /// Number of overlapping tokens shared between adjacent segments.
    pub chunk_overlap: usize,
    /// Number of top results retrieved per query.
    pub top_k: usize,
    /// System instruction supplied to the answer generator.
    pub system_prompt: String,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            min_tokens: 400,
            max_tokens: 500,
            chunk_overlap: 50,
            top_k: 5,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the minimum chunk size in tokens.
    pub fn min_tokens(mut self, min_tokens: usize) -> Self {
        self.config.min_tokens = min_tokens;
        self
    }

    /// Set the maximum chunk size in tokens.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the overlap between adjacent segments in tokens.
    pub fn chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.config.chunk_overlap = chunk_overlap;
        self
    }

    /// Set the number of top results retrieved per query.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the system instruction for answer generation.
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.config.system_prompt = system_prompt.into();
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `min_tokens == 0` or `min_tokens >= max_tokens`
    /// - `chunk_overlap >= max_tokens - min_tokens`
    /// - `top_k == 0`
    pub fn build(self) -> Result<QaConfig> {
        let QaConfig { min_tokens, max_tokens, chunk_overlap, top_k, .. } = self.config;
        if min_tokens == 0 || min_tokens >= max_tokens {
            return Err(RagError::Config(format!(
                "min_tokens ({min_tokens}) must be positive and less than max_tokens ({max_tokens})"
            )));
        }
        if chunk_overlap >= max_tokens - min_tokens {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than max_tokens - min_tokens ({})",
                max_tokens - min_tokens
            )));
        }
        if top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
