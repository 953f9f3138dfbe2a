//! Tenant-scoped embedding index.
//!
//! [`EmbeddingIndex`] composes an [`EmbeddingProvider`] with a
//! [`VectorStore`]: callers hand it text chunks and a tenant, it handles
//! embedding, entry-id assignment, and the tenant tagging that every
//! downstream search and delete filters on.

use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::document::{ChunkMetadata, DocumentChunk, EntryFilter, IndexEntry, ScoredEntry};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A tenant-scoped index of chunk embeddings.
///
/// Every entry carries exactly one `tenant_id`, assigned at ingest; entries
/// are never re-assigned to a different tenant. Re-adding chunks for an
/// existing document id creates additional, disjoint entries — callers that
/// want replacement semantics must [`delete`](EmbeddingIndex::delete) first.
pub struct EmbeddingIndex {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl EmbeddingIndex {
    /// Create an index over the given provider and store.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self { embedding_provider, vector_store }
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Embed and persist chunks under the given tenant.
    ///
    /// Each entry gets a globally unique id (`{document_id}_{uuid}`) so
    /// repeated ingests of the same document id never collide. Entries are
    /// visible to subsequent searches for that tenant once this returns.
    ///
    /// # Errors
    ///
    /// Embedding or storage failures are fatal to the call. Writes already
    /// persisted are not rolled back; ingest is best-effort-atomic per
    /// chunk, not per document.
    pub async fn add(&self, chunks: &[DocumentChunk], tenant_id: &str) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(tenant_id, error = %e, "embedding failed during add");
            e
        })?;

        // A short batch would silently drop the unmatched tail chunks.
        if embeddings.len() != chunks.len() {
            error!(
                tenant_id,
                expected = chunks.len(),
                returned = embeddings.len(),
                "embedding batch size mismatch"
            );
            return Err(RagError::Embedding {
                provider: "embed_batch".to_string(),
                message: format!(
                    "provider returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                id: format!("{}_{}", chunk.document_id, Uuid::new_v4()),
                embedding,
                metadata: ChunkMetadata {
                    document_id: chunk.document_id.clone(),
                    title: chunk.title.clone(),
                    content: chunk.content.clone(),
                    tenant_id: tenant_id.to_string(),
                },
            })
            .collect();

        self.vector_store.upsert(&entries).await.map_err(|e| {
            error!(tenant_id, error = %e, "upsert failed during add");
            e
        })?;

        debug!(tenant_id, count = entries.len(), "indexed chunks");
        Ok(())
    }

    /// Search the tenant's entries for the `top_k` chunks most similar to
    /// the query text.
    ///
    /// Results are ranked best-first; an empty result set is valid.
    pub async fn search(
        &self,
        query: &str,
        tenant_id: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredEntry>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(tenant_id, error = %e, "query embedding failed");
            e
        })?;

        let results = self
            .vector_store
            .search(&query_embedding, &EntryFilter::tenant(tenant_id), top_k)
            .await?;

        debug!(tenant_id, result_count = results.len(), "index search completed");
        Ok(results)
    }

    /// Remove every entry belonging to BOTH the document AND the tenant.
    ///
    /// The filter is a conjunction: a matching document id under another
    /// tenant is untouched. No error if zero entries match.
    pub async fn delete(&self, document_id: &str, tenant_id: &str) -> Result<()> {
        self.vector_store.delete(&EntryFilter::document(tenant_id, document_id)).await?;
        info!(tenant_id, document_id, "deleted document entries");
        Ok(())
    }
}
