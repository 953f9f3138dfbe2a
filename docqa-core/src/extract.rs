//! Text-extraction collaborator boundary.
//!
//! Extraction is consumed as an opaque, possibly-failing function from a
//! staged file path to raw text. Format-specific readers (PDF, DOCX) are
//! external collaborators; this crate ships only the trait and a plain-text
//! adapter.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{QaError, Result};

/// Extracts raw document text from a staged file.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor recognizes the file's format.
    fn supports(&self, path: &Path) -> bool;

    /// Read the file and return its full text.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::UnsupportedFormat`] for unrecognized extensions and
    /// [`QaError::Extraction`] when a supported file cannot be read.
    async fn extract(&self, path: &Path) -> Result<String>;
}

/// A [`TextExtractor`] for plain-text files (`.txt`, `.md`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn supports(&self, path: &Path) -> bool {
        matches!(extension(path).as_deref(), Some("txt") | Some("md"))
    }

    async fn extract(&self, path: &Path) -> Result<String> {
        if !self.supports(path) {
            return Err(QaError::UnsupportedFormat(path.display().to_string()));
        }
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| QaError::Extraction(format!("{}: {e}", path.display())))
    }
}
