//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] is a zero-dependency backend backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`, suitable for development,
//! testing, and small deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{EntryFilter, IndexEntry, ScoredEntry};
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] using cosine similarity for search.
///
/// Entries are stored as entry ID → entry. Filters are evaluated against
/// entry metadata with [`EntryFilter::matches`], so tenant isolation holds
/// by the same conjunctive predicate the external backends use.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries (test/diagnostic helper).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut store = self.entries.write().await;
        for entry in entries {
            store.insert(entry.id.clone(), entry.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        embedding: &[f32],
        filter: &EntryFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredEntry>> {
        let store = self.entries.read().await;

        let mut scored: Vec<ScoredEntry> = store
            .values()
            .filter(|entry| filter.matches(&entry.metadata))
            .map(|entry| ScoredEntry {
                metadata: entry.metadata.clone(),
                score: cosine_similarity(&entry.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete(&self, filter: &EntryFilter) -> Result<()> {
        let mut store = self.entries.write().await;
        store.retain(|_, entry| !filter.matches(&entry.metadata));
        Ok(())
    }
}
