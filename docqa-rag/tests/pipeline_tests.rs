//! End-to-end pipeline tests with mock providers.

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;

use docqa_core::PlainTextExtractor;
use docqa_model::MockLlm;
use docqa_rag::{
    Chunker, EmbeddingProvider, InMemoryVectorStore, QaConfig, QaPipeline, TokenChunker,
};

/// Deterministic hash-based embeddings: similar only for identical text, but
/// stable across runs, which is all the retrieval tests need.
struct MockEmbeddingProvider {
    dimensions: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> docqa_rag::Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Chunker with a word-count budget, so tests control chunk boundaries
/// without tokenizer arithmetic.
struct WordChunker {
    words_per_chunk: usize,
}

impl Chunker for WordChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        words.chunks(self.words_per_chunk).map(|w| w.join(" ")).collect()
    }
}

fn pipeline() -> QaPipeline {
    pipeline_with_llm(Arc::new(MockLlm::new()))
}

fn pipeline_with_llm(llm: Arc<dyn docqa_core::Llm>) -> QaPipeline {
    QaPipeline::builder()
        .config(QaConfig::builder().top_k(5).build().unwrap())
        .embedding_provider(Arc::new(MockEmbeddingProvider { dimensions: 64 }))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(WordChunker { words_per_chunk: 8 }))
        .llm(llm)
        .build()
        .unwrap()
}

#[tokio::test]
async fn ingest_then_search_round_trip() {
    let pipeline = pipeline();
    let text = "the mitochondria is the powerhouse of the cell \
                and ribosomes synthesize proteins from amino acids";
    let document_id = pipeline.ingest(text, "biology.txt", "alice").await.unwrap();

    let results = pipeline.index().search(
        "the mitochondria is the powerhouse of the cell",
        "alice",
        5,
    );
    let results = results.await.unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].metadata.document_id, document_id);
    assert!(text.contains(&results[0].metadata.content));
}

#[tokio::test]
async fn tenant_isolation_on_search() {
    let pipeline = pipeline();
    pipeline.ingest("alpha beta gamma delta", "a.txt", "alice").await.unwrap();

    let results = pipeline.index().search("alpha beta gamma delta", "bob", 5).await.unwrap();
    assert!(results.is_empty(), "bob must not see alice's entries");
}

#[tokio::test]
async fn search_on_empty_tenant_is_empty_not_an_error() {
    let pipeline = pipeline();
    let results = pipeline.index().search("anything", "nobody", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn delete_under_one_tenant_leaves_the_other_intact() {
    let pipeline = pipeline();
    let text = "shared words for both tenants in this test";

    // Same document id under two tenants via a direct index add.
    let chunk = docqa_rag::DocumentChunk {
        document_id: "collided".to_string(),
        title: "t".to_string(),
        content: text.to_string(),
    };
    pipeline.index().add(std::slice::from_ref(&chunk), "alice").await.unwrap();
    pipeline.index().add(std::slice::from_ref(&chunk), "bob").await.unwrap();

    pipeline.delete_document("collided", "alice").await.unwrap();

    let alice = pipeline.index().search(text, "alice", 5).await.unwrap();
    assert!(alice.is_empty());
    let bob = pipeline.index().search(text, "bob", 5).await.unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].metadata.document_id, "collided");
}

#[tokio::test]
async fn query_returns_answer_and_deduplicated_sources() {
    let llm = Arc::new(MockLlm::with_responses(["grounded answer"]));
    let pipeline = pipeline_with_llm(llm);

    // Two chunks from one document: its id must appear once in sources.
    let text = "rust ownership prevents data races at compile time \
                and the borrow checker enforces aliasing rules strictly";
    let document_id = pipeline.ingest(text, "rust.txt", "alice").await.unwrap();

    let outcome = pipeline.query("rust ownership", "alice").await.unwrap();
    assert_eq!(outcome.answer, "grounded answer");
    assert_eq!(outcome.sources, vec![document_id]);
}

#[tokio::test]
async fn streaming_query_with_empty_context_still_answers() {
    let pipeline = pipeline();

    // Nothing ingested: context is empty, model answers without grounding.
    let streaming = pipeline.query_stream("what is the answer?", "alice").await.unwrap();
    assert!(streaming.sources.is_empty());

    let fragments: Vec<String> = streaming.stream.collect().await;
    assert!(!fragments.is_empty());
    let answer: String = fragments.concat();
    assert!(!answer.is_empty());
}

#[tokio::test]
async fn empty_document_gets_an_id_but_no_entries() {
    let pipeline = pipeline();
    let document_id = pipeline.ingest("", "empty.txt", "alice").await.unwrap();
    assert!(!document_id.is_empty());

    let results = pipeline.index().search("anything", "alice", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn ingest_files_skips_unsupported_and_continues() {
    let pipeline = pipeline();
    let dir = std::env::temp_dir();
    let good = dir.join("docqa_pipeline_good.txt");
    tokio::fs::write(&good, "supported file with enough words to index").await.unwrap();
    let bad = dir.join("docqa_pipeline_bad.pdf");
    tokio::fs::write(&bad, "binary-ish").await.unwrap();

    let paths: Vec<PathBuf> = vec![bad.clone(), good.clone()];
    let ingested =
        pipeline.ingest_files(&PlainTextExtractor, &paths, "alice").await.unwrap();

    assert_eq!(ingested.len(), 1);
    assert_eq!(ingested[0].title, "docqa_pipeline_good.txt");
    assert!(ingested[0].chunk_count > 0);

    tokio::fs::remove_file(&good).await.unwrap();
    tokio::fs::remove_file(&bad).await.unwrap();
}

#[tokio::test]
async fn token_chunker_integrates_with_pipeline() {
    // Full-fidelity chunker on a small budget: verifies the real tokenizer
    // path end to end.
    let pipeline = QaPipeline::builder()
        .config(QaConfig::builder().min_tokens(20).max_tokens(30).chunk_overlap(5).build().unwrap())
        .embedding_provider(Arc::new(MockEmbeddingProvider { dimensions: 32 }))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(TokenChunker::new(20, 30, 5).unwrap()))
        .llm(Arc::new(MockLlm::new()))
        .build()
        .unwrap();

    let text = "The quick brown fox jumps over the lazy dog. ".repeat(12);
    pipeline.ingest(&text, "foxes.txt", "alice").await.unwrap();

    let results = pipeline.index().search("quick brown fox", "alice", 10).await.unwrap();
    assert!(!results.is_empty());
}
