//! # docqa-rag
//!
//! Tenant-scoped retrieval-augmented answering for DocQA.
//!
//! ## Overview
//!
//! This crate implements the core pipeline: documents are chunked into
//! token-bounded segments, embedded, and indexed per tenant; questions are
//! answered by retrieving the most similar chunks and grounding a language
//! model in them.
//!
//! - [`TokenChunker`] — token-budget chunking with a deterministic BPE
//! - [`EmbeddingIndex`] — tenant-filtered add / search / delete
//! - [`AnswerGenerator`] — batch and streaming answer generation
//! - [`QaPipeline`] — the ingest/query orchestrator
//!
//! Vector store backends: [`InMemoryVectorStore`] (always available) and
//! `QdrantVectorStore` (feature `qdrant`). Embedding providers: bring your
//! own [`EmbeddingProvider`], or `OpenAIEmbeddingProvider` (feature
//! `openai`).
//!
//! ## Tenant isolation
//!
//! Every index mutation and every search/delete filter carries the caller's
//! authenticated tenant id. Entries ingested under one tenant are never
//! returned or removed by calls issued under another, even when document
//! ids collide; the delete filter is a strict conjunction of document AND
//! tenant.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod vectorstore;

pub use answer::{AnswerGenerator, AnswerStream};
pub use chunking::{Chunker, TokenChunker};
pub use config::{QaConfig, QaConfigBuilder, DEFAULT_SYSTEM_PROMPT};
pub use document::{
    ChunkMetadata, DocumentChunk, EntryFilter, IndexEntry, IngestedDocument, ScoredEntry,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::EmbeddingIndex;
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{QaPipeline, QaPipelineBuilder, QueryOutcome, StreamingQuery};
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
pub use vectorstore::VectorStore;
