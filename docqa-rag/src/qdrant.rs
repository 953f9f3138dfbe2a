//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using the
//! [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC. Tenant and
//! document clauses are pushed down as conjunctive payload filters, so
//! isolation is enforced by the database, not by post-filtering.
//!
//! This module is only available when the `qdrant` feature is enabled.

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;
use uuid::Uuid;

use crate::document::{ChunkMetadata, EntryFilter, IndexEntry, ScoredEntry};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// All entries live in one Qdrant collection with cosine distance; entry
/// metadata is stored as flat payload fields so `tenant_id` and
/// `document_id` can be filtered server-side.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store for the given URL and collection.
    pub fn new(url: &str, collection: impl Into<String>) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client, collection: collection.into() })
    }

    /// Create a store from an existing client.
    pub fn from_client(client: Qdrant, collection: impl Into<String>) -> Self {
        Self { client, collection: collection.into() }
    }

    /// Create the backing collection if it does not exist yet.
    pub async fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == self.collection) {
            debug!(collection = %self.collection, "qdrant collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, dimensions, "created qdrant collection");
        Ok(())
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStore { backend: "qdrant".to_string(), message: e.to_string() }
    }

    fn to_filter(filter: &EntryFilter) -> Filter {
        let mut conditions =
            vec![Condition::matches("tenant_id", filter.tenant_id().to_string())];
        if let Some(document_id) = filter.document_id() {
            conditions.push(Condition::matches("document_id", document_id.to_string()));
        }
        // Conjunction: every clause must match.
        Filter::must(conditions)
    }

    fn extract_string(value: Option<&QdrantValue>) -> String {
        match value.and_then(|v| v.kind.as_ref()) {
            Some(Kind::StringValue(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = entries
            .iter()
            .map(|entry| {
                let payload_map = serde_json::json!({
                    "entry_id": entry.id,
                    "document_id": entry.metadata.document_id,
                    "title": entry.metadata.title,
                    "content": entry.metadata.content,
                    "tenant_id": entry.metadata.tenant_id,
                });
                let payload = Payload::try_from(payload_map).unwrap_or_default();

                // Qdrant point ids must be UUIDs or integers; the entry id
                // is carried in the payload instead.
                PointStruct::new(
                    Uuid::new_v4().to_string(),
                    entry.embedding.clone(),
                    payload,
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, count = entries.len(), "upserted entries to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        filter: &EntryFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredEntry>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), top_k as u64)
                    .filter(Self::to_filter(filter))
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| ScoredEntry {
                metadata: ChunkMetadata {
                    document_id: Self::extract_string(scored.payload.get("document_id")),
                    title: Self::extract_string(scored.payload.get("title")),
                    content: Self::extract_string(scored.payload.get("content")),
                    tenant_id: Self::extract_string(scored.payload.get("tenant_id")),
                },
                score: scored.score,
            })
            .collect();

        Ok(results)
    }

    async fn delete(&self, filter: &EntryFilter) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Self::to_filter(filter))
                    .wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, "deleted entries from qdrant");
        Ok(())
    }
}
