//! Data types for chunks, indexed entries, and search results.

use serde::{Deserialize, Serialize};

/// A token-bounded segment of a source document, the unit of indexing.
///
/// Produced transiently during ingest; persisted only inside the embedding
/// index, tagged with the owning tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    /// Opaque identifier of the owning document.
    pub document_id: String,
    /// Display label, typically the source filename.
    pub title: String,
    /// The text payload.
    pub content: String,
}

/// Metadata persisted alongside every indexed embedding.
///
/// Invariant: exactly one `tenant_id`, assigned at ingest and never
/// re-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Opaque identifier of the owning document.
    pub document_id: String,
    /// Display label, typically the source filename.
    pub title: String,
    /// The chunk text payload.
    pub content: String,
    /// The owning tenant at time of ingest.
    pub tenant_id: String,
}

/// The persisted unit inside a vector store: id, embedding, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// Globally unique entry identifier
    /// (`{document_id}_{random-disambiguator}`).
    pub id: String,
    /// The embedding vector for the chunk content.
    pub embedding: Vec<f32>,
    /// Tenant-tagged chunk metadata.
    pub metadata: ChunkMetadata,
}

/// A retrieved entry's metadata paired with a similarity score.
///
/// Consumers currently use the metadata only; the score is preserved for
/// future ranking or thresholding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEntry {
    /// Metadata of the matched entry.
    pub metadata: ChunkMetadata,
    /// Similarity score (higher is more relevant).
    pub score: f32,
}

/// A conjunctive metadata filter over indexed entries.
///
/// Every clause must match: entries match only when `tenant_id` is equal
/// AND, when set, `document_id` is equal. The filter is never a disjunction;
/// deleting on either condition alone would leak cross-tenant deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    tenant_id: String,
    document_id: Option<String>,
}

impl EntryFilter {
    /// Match every entry owned by the tenant.
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self { tenant_id: tenant_id.into(), document_id: None }
    }

    /// Match entries owned by the tenant AND belonging to the document.
    pub fn document(tenant_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self { tenant_id: tenant_id.into(), document_id: Some(document_id.into()) }
    }

    /// The tenant clause.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// The optional document clause.
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Evaluate the filter against entry metadata.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        if metadata.tenant_id != self.tenant_id {
            return false;
        }
        match &self.document_id {
            Some(document_id) => metadata.document_id == *document_id,
            None => true,
        }
    }
}

/// The outcome of ingesting one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestedDocument {
    /// The freshly assigned document identifier.
    pub document_id: String,
    /// Display label, typically the source filename.
    pub title: String,
    /// Number of chunks persisted in the index.
    pub chunk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(tenant_id: &str, document_id: &str) -> ChunkMetadata {
        ChunkMetadata {
            document_id: document_id.to_string(),
            title: "notes.txt".to_string(),
            content: "body".to_string(),
            tenant_id: tenant_id.to_string(),
        }
    }

    #[test]
    fn tenant_filter_requires_exact_tenant() {
        let filter = EntryFilter::tenant("alice");
        assert!(filter.matches(&metadata("alice", "doc-1")));
        assert!(!filter.matches(&metadata("bob", "doc-1")));
    }

    #[test]
    fn document_filter_is_a_conjunction() {
        let filter = EntryFilter::document("alice", "doc-1");
        assert!(filter.matches(&metadata("alice", "doc-1")));
        // Matching document under another tenant must not match.
        assert!(!filter.matches(&metadata("bob", "doc-1")));
        // Matching tenant with another document must not match.
        assert!(!filter.matches(&metadata("alice", "doc-2")));
    }
}
