//! Property tests for in-memory vector store search ordering and tenancy.

use proptest::prelude::*;

use docqa_rag::{ChunkMetadata, EntryFilter, InMemoryVectorStore, IndexEntry, VectorStore};

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate an entry with a normalized embedding under one of two tenants.
fn arb_entry(dim: usize) -> impl Strategy<Value = IndexEntry> {
    ("[a-z]{8,16}", "[a-z ]{5,30}", prop::bool::ANY, arb_normalized_embedding(dim)).prop_map(
        |(id, content, second_tenant, embedding)| IndexEntry {
            id,
            embedding,
            metadata: ChunkMetadata {
                document_id: "doc_1".to_string(),
                title: "title".to_string(),
                content,
                tenant_id: if second_tenant { "tenant_b" } else { "tenant_a" }.to_string(),
            },
        },
    )
}

/// Keep the first entry for each id; later upserts would overwrite.
fn dedup_by_id(entries: Vec<IndexEntry>) -> Vec<IndexEntry> {
    let mut seen = std::collections::HashSet::new();
    entries.into_iter().filter(|e| seen.insert(e.id.clone())).collect()
}

const DIM: usize = 16;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Search returns at most top_k results, ordered by descending score,
    /// and never an entry belonging to another tenant.
    #[test]
    fn search_is_ordered_bounded_and_tenant_scoped(
        entries in proptest::collection::vec(arb_entry(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        // Deduplicate by id to avoid upsert overwriting.
        let entries = dedup_by_id(entries);

        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, tenant_a_count) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.upsert(&entries).await.unwrap();

            let tenant_a_count =
                entries.iter().filter(|e| e.metadata.tenant_id == "tenant_a").count();

            let results =
                store.search(&query, &EntryFilter::tenant("tenant_a"), top_k).await.unwrap();
            (results, tenant_a_count)
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= tenant_a_count);

        for result in &results {
            prop_assert_eq!(&result.metadata.tenant_id, "tenant_a");
        }

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }

    /// Deleting one tenant's document never removes the other tenant's
    /// entries, even though every entry shares the same document id.
    #[test]
    fn delete_conjunction_preserves_other_tenant(
        entries in proptest::collection::vec(arb_entry(DIM), 1..20),
    ) {
        let entries = dedup_by_id(entries);

        let rt = tokio::runtime::Runtime::new().unwrap();
        let (survivors, expected) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            store.upsert(&entries).await.unwrap();

            store.delete(&EntryFilter::document("tenant_a", "doc_1")).await.unwrap();

            let expected =
                entries.iter().filter(|e| e.metadata.tenant_id == "tenant_b").count();
            (store.len().await, expected)
        });

        prop_assert_eq!(survivors, expected);
    }
}
