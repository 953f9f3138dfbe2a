//! Error types shared across DocQA crates.

use thiserror::Error;

/// Errors produced by core collaborators (language models, text extraction).
#[derive(Debug, Error)]
pub enum QaError {
    /// A language-model provider failed (transport, API, or protocol error).
    #[error("Model error: {0}")]
    Model(String),

    /// A file has an extension no extractor recognizes.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Text extraction failed on an otherwise supported file.
    #[error("Extraction error: {0}")]
    Extraction(String),
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, QaError>;
