//! Vector store trait for storing and searching tenant-tagged embeddings.

use async_trait::async_trait;

use crate::document::{EntryFilter, IndexEntry, ScoredEntry};
use crate::error::Result;

/// A storage backend for embeddings with filtered similarity search.
///
/// There is no named-collection concept: all entries live in one logical
/// index and every read or destructive operation carries an [`EntryFilter`]
/// whose clauses the backend must combine conjunctively. Entries have no
/// intermediate states — absent, then present after [`upsert`](VectorStore::upsert),
/// then absent again after [`delete`](VectorStore::delete).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist entries. Entries must have embeddings set.
    ///
    /// Newly written entries are visible to subsequent searches.
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<()>;

    /// Search for the `top_k` entries most similar to the given embedding,
    /// restricted to entries matching the filter.
    ///
    /// Returns results ordered by descending similarity score; an empty
    /// result set is valid. Ties are broken in backend-native order.
    async fn search(
        &self,
        embedding: &[f32],
        filter: &EntryFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredEntry>>;

    /// Remove every entry matching the filter. No error if none match.
    async fn delete(&self, filter: &EntryFilter) -> Result<()>;
}
