//! # QA Basic Demo
//!
//! Demonstrates the full document QA pipeline: ingest documents for a
//! tenant, ask a question, stream an answer.
//!
//! Uses `InMemoryVectorStore`, `TokenChunker`, a deterministic
//! `MockEmbeddingProvider`, and the scripted `MockLlm` so it runs with
//! **zero API keys**.
//!
//! Run: `cargo run -p qa_basic`

use std::sync::Arc;

use futures::StreamExt;

use docqa_model::MockLlm;
use docqa_rag::{
    EmbeddingProvider, InMemoryVectorStore, QaConfig, QaPipeline, TokenChunker,
};

// ---------------------------------------------------------------------------
// MockEmbeddingProvider — deterministic hash-based embeddings for demos/tests
// ---------------------------------------------------------------------------

struct MockEmbeddingProvider {
    dimensions: usize,
}

impl MockEmbeddingProvider {
    fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> docqa_rag::Result<Vec<f32>> {
        // Deterministic embedding: hash the text bytes, then generate a
        // normalised vector whose direction depends on the content.
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalise so cosine similarity is just the dot product.
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

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // -- 1. Configure the pipeline ----------------------------------------
    // Small token budgets keep the demo documents to a chunk or two each;
    // top_k=3 returns the three most relevant chunks at query time.
    let config = QaConfig::builder()
        .min_tokens(10)
        .max_tokens(80)
        .chunk_overlap(8)
        .top_k(3)
        .build()?;

    // -- 2. Build the pipeline with in-memory components ------------------
    // MockEmbeddingProvider produces 64-dimensional vectors from text hashes.
    // InMemoryVectorStore keeps everything in a HashMap — no external DB.
    // MockLlm plays back scripted answers, then echoes its prompt.
    let chunker = TokenChunker::from_config(&config)?;
    let llm = Arc::new(MockLlm::with_responses([
        "Rust achieves memory safety through its ownership system, \
         without relying on a garbage collector.",
        "Documents are chunked, embedded, and indexed; at query time the \
         most relevant chunks are retrieved and handed to the model.",
    ]));

    let pipeline = Arc::new(
        QaPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(MockEmbeddingProvider::new(64)))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .chunker(Arc::new(chunker))
            .llm(llm)
            .build()?,
    );

    // -- 3. Ingest sample documents for one tenant -------------------------
    let documents = [
        (
            "rust.txt",
            "Rust is a systems programming language focused on safety, speed, \
             and concurrency. It achieves memory safety without a garbage \
             collector through its ownership system.",
        ),
        (
            "python.txt",
            "Python is a high-level, interpreted programming language known for \
             its readability and versatility. It is widely used in data science, \
             web development, and automation.",
        ),
        (
            "rag.txt",
            "Retrieval-augmented generation combines a retrieval system with a \
             language model. Documents are chunked, embedded, and stored in a \
             vector index. At query time the most relevant chunks are retrieved \
             and fed to the model as context.",
        ),
    ];

    println!("Ingesting {} documents for tenant 'alice'...", documents.len());
    for (title, text) in &documents {
        let document_id = pipeline.ingest(text, title, "alice").await?;
        println!("  {title} → {document_id}");
    }

    // -- 4. Ask a question synchronously -----------------------------------
    let question = "how does rust achieve memory safety?";
    println!("\nQuestion: \"{question}\"");
    let outcome = pipeline.query(question, "alice").await?;
    println!("Answer: {}", outcome.answer);
    println!("Sources: {:?}", outcome.sources);

    // -- 5. Ask a question with a streamed answer ---------------------------
    let question = "how does retrieval-augmented generation work?";
    println!("\nQuestion: \"{question}\"");
    let streaming = pipeline.query_stream(question, "alice").await?;
    println!("Sources (known before the first fragment): {:?}", streaming.sources);
    print!("Answer: ");
    let mut stream = streaming.stream;
    while let Some(fragment) = stream.next().await {
        print!("{fragment}");
    }
    println!();

    // -- 6. Tenant isolation ------------------------------------------------
    // Bob has ingested nothing; his query retrieves no context at all.
    let outcome = pipeline.query("what do alice's notes say?", "bob").await?;
    println!("\nTenant 'bob' sources: {:?} (alice's documents are invisible)", outcome.sources);

    println!("\nDone.");
    Ok(())
}
