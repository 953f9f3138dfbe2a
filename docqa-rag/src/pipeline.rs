//! Retrieval-augmented QA pipeline orchestrator.
//!
//! [`QaPipeline`] coordinates the full workflow: on ingest it runs the
//! [`Chunker`] and hands tagged chunks to the [`EmbeddingIndex`]; on query
//! it retrieves ranked chunks, assembles context, and invokes the
//! [`AnswerGenerator`]. The caller's authenticated tenant id is threaded
//! through every index call — it is never taken from request payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{QaPipeline, QaConfig, InMemoryVectorStore, TokenChunker};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(TokenChunker::with_defaults()?))
//!     .llm(Arc::new(my_model))
//!     .build()?;
//!
//! let document_id = pipeline.ingest(&text, "notes.txt", "tenant-1").await?;
//! let outcome = pipeline.query("what do my notes say?", "tenant-1").await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use docqa_core::{Llm, TextExtractor};

use crate::answer::{AnswerGenerator, AnswerStream};
use crate::chunking::Chunker;
use crate::config::QaConfig;
use crate::document::{DocumentChunk, IngestedDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::EmbeddingIndex;
use crate::vectorstore::VectorStore;

/// The result of a synchronous query: the answer plus the document ids that
/// contributed context, deduplicated in rank order.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The generated answer.
    pub answer: String,
    /// Contributing document ids, first-seen order by search rank.
    pub sources: Vec<String>,
}

/// The result of a streaming query.
pub struct StreamingQuery {
    /// The incrementally produced answer.
    pub stream: AnswerStream,
    /// Contributing document ids, first-seen order by search rank.
    pub sources: Vec<String>,
}

/// The QA pipeline orchestrator.
///
/// Construct one per process via [`QaPipeline::builder()`] and share it;
/// all mutable state lives in the external services behind the index.
pub struct QaPipeline {
    config: QaConfig,
    chunker: Arc<dyn Chunker>,
    index: EmbeddingIndex,
    generator: AnswerGenerator,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Return a reference to the embedding index.
    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Ingest raw document text for a tenant: chunk → embed → index.
    ///
    /// Returns the freshly assigned document id for the caller to persist
    /// alongside its own document record. Index writes and any caller-side
    /// metadata commit are not atomic: if the caller's write fails after
    /// this returns, the orphaned entries are the caller's to delete.
    ///
    /// Text that chunks to nothing (short or empty input) still gets an id;
    /// the index is simply left untouched.
    pub async fn ingest(&self, text: &str, title: &str, tenant_id: &str) -> Result<String> {
        let (document_id, _) = self.ingest_with_count(text, title, tenant_id).await?;
        Ok(document_id)
    }

    async fn ingest_with_count(
        &self,
        text: &str,
        title: &str,
        tenant_id: &str,
    ) -> Result<(String, usize)> {
        let document_id = Uuid::new_v4().to_string();

        let chunks: Vec<DocumentChunk> = self
            .chunker
            .chunk(text)
            .into_iter()
            .map(|content| DocumentChunk {
                document_id: document_id.clone(),
                title: title.to_string(),
                content,
            })
            .collect();

        let chunk_count = chunks.len();
        self.index.add(&chunks, tenant_id).await.map_err(|e| {
            error!(document_id = %document_id, tenant_id, error = %e, "ingest failed");
            RagError::Pipeline(format!("ingest failed for document '{document_id}': {e}"))
        })?;

        info!(document_id = %document_id, tenant_id, chunk_count, "ingested document");
        Ok((document_id, chunk_count))
    }

    /// Extract and ingest a batch of staged files for a tenant.
    ///
    /// A file the extractor rejects (unsupported or unreadable) is skipped
    /// with a warning and does not abort the rest of the batch; embedding or
    /// storage failures are fatal to the whole call.
    pub async fn ingest_files(
        &self,
        extractor: &dyn TextExtractor,
        paths: &[PathBuf],
        tenant_id: &str,
    ) -> Result<Vec<IngestedDocument>> {
        let mut ingested = Vec::new();

        for path in paths {
            let title = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let text = match extractor.extract(path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                    continue;
                }
            };

            let (document_id, chunk_count) =
                self.ingest_with_count(&text, &title, tenant_id).await?;
            ingested.push(IngestedDocument { document_id, title, chunk_count });
        }

        Ok(ingested)
    }

    /// Answer a question from the tenant's indexed documents.
    ///
    /// Retrieves the configured `top_k` chunks, concatenates their contents
    /// in search-rank order as context (newline separated), and generates a
    /// complete answer. With no matching entries the model answers without
    /// grounding and `sources` is empty.
    pub async fn query(&self, question: &str, tenant_id: &str) -> Result<QueryOutcome> {
        let (context, sources) = self.retrieve(question, tenant_id).await?;
        let answer = self.generator.generate(question, &context).await?;

        info!(tenant_id, source_count = sources.len(), "query completed");
        Ok(QueryOutcome { answer, sources })
    }

    /// Answer a question as an incrementally produced fragment stream.
    ///
    /// Retrieval runs up front; `sources` is complete before the first
    /// fragment arrives. See [`AnswerGenerator::generate_stream`] for the
    /// stream's termination and cancellation behavior.
    pub async fn query_stream(&self, question: &str, tenant_id: &str) -> Result<StreamingQuery> {
        let (context, sources) = self.retrieve(question, tenant_id).await?;
        let stream = self.generator.generate_stream(question, &context).await?;

        info!(tenant_id, source_count = sources.len(), "streaming query started");
        Ok(StreamingQuery { stream, sources })
    }

    /// Remove a document's entries from the index for this tenant only.
    pub async fn delete_document(&self, document_id: &str, tenant_id: &str) -> Result<()> {
        self.index.delete(document_id, tenant_id).await
    }

    /// Search and assemble: ranked chunk contents joined by newlines, plus
    /// contributing document ids deduplicated in first-seen order.
    async fn retrieve(&self, question: &str, tenant_id: &str) -> Result<(String, Vec<String>)> {
        let results = self.index.search(question, tenant_id, self.config.top_k).await?;

        let mut sources: Vec<String> = Vec::new();
        for result in &results {
            if !sources.iter().any(|id| id == &result.metadata.document_id) {
                sources.push(result.metadata.document_id.clone());
            }
        }

        let context = results
            .iter()
            .map(|r| r.metadata.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok((context, sources))
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// All fields are required except `config`, which defaults. Call
/// [`build()`](QaPipelineBuilder::build) to validate and produce the
/// pipeline.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    llm: Option<Arc<dyn Llm>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the language model used for answer generation.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Build the [`QaPipeline`], validating that all required parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required part is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let llm = self.llm.ok_or_else(|| RagError::Config("llm is required".to_string()))?;

        let generator =
            AnswerGenerator::new(llm).with_system_prompt(config.system_prompt.clone());

        Ok(QaPipeline {
            config,
            chunker,
            index: EmbeddingIndex::new(embedding_provider, vector_store),
            generator,
        })
    }
}
