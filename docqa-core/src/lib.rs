//! # docqa-core
//!
//! Shared types for the DocQA retrieval-augmented question answering service.
//!
//! This crate holds the pieces every other DocQA crate depends on:
//!
//! - [`QaError`] — the shared error type
//! - [`Llm`] — the language-model capability trait (single-shot and streaming)
//! - [`Message`] / [`Role`] — the two-role chat conversation types
//! - [`TextExtractor`] — the text-extraction collaborator boundary
//!
//! Provider adapters live in `docqa-model`; the retrieval pipeline lives in
//! `docqa-rag`.

pub mod error;
pub mod extract;
pub mod llm;

pub use error::{QaError, Result};
pub use extract::{PlainTextExtractor, TextExtractor};
pub use llm::{Llm, Message, Role, TokenStream};
