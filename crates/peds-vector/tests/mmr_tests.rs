use std::sync::Arc;

use peds_core::traits::Embedder;
use peds_embed::FakeEmbedder;
use peds_vector::{select_diverse, CorpusRecord, DiversitySelector, ExampleCorpus, FlatIndex};
use proptest::prelude::*;

fn near_duplicate_corpus() -> FlatIndex {
    FlatIndex::from_rows(
        3,
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.99, 0.01, 0.0],
            vec![0.98, 0.02, 0.0],
            vec![0.97, 0.03, 0.0],
            vec![0.0, 0.0, 1.0],
        ],
    )
    .unwrap()
}

#[test]
fn second_pick_is_the_orthogonal_item() {
    let index = near_duplicate_corpus();
    let picks = select_diverse(&index, &[1.0, 0.0, 0.0], 5, 2);
    assert_eq!(picks, vec![0, 4]);
}

#[test]
fn pool_limits_what_can_be_picked() {
    let index = near_duplicate_corpus();
    // the orthogonal item is outside a pool of four
    let picks = select_diverse(&index, &[1.0, 0.0, 0.0], 4, 2);
    assert_eq!(picks[0], 0);
    assert_ne!(picks[1], 4);
    assert_eq!(picks[1], 3, "least similar of the near duplicates");
}

#[test]
fn degenerate_inputs_yield_nothing() {
    let index = near_duplicate_corpus();
    assert!(select_diverse(&index, &[1.0, 0.0, 0.0], 5, 0).is_empty());
    assert!(select_diverse(&index, &[0.0, 0.0, 0.0], 5, 2).is_empty());
    assert!(select_diverse(&FlatIndex::new(3), &[1.0, 0.0, 0.0], 5, 2).is_empty());
}

#[test]
fn unloaded_corpus_returns_no_examples() {
    let selector = DiversitySelector::unavailable();
    assert!(!selector.is_available());
    assert!(selector.select("fever", 5, 3).unwrap().is_empty());
}

#[test]
fn selector_maps_rows_to_examples() {
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(64));
    let records: Vec<CorpusRecord> = ["baby fever at night", "toddler rash on arms", "infant cough and fever"]
        .iter()
        .map(|q| CorpusRecord { department: "内科".into(), question: q.to_string(), answer: format!("answer to {q}") })
        .collect();
    let questions: Vec<String> = records.iter().map(|r| r.question.clone()).collect();
    let vectors = embedder.embed_batch(&questions).unwrap();
    let corpus = ExampleCorpus::from_parts(records, vectors, 64, embedder.embedder_id()).unwrap();
    let selector = DiversitySelector::new(Arc::new(corpus), embedder.clone());

    let examples = selector.select("baby fever at night", 5, 2).unwrap();
    assert_eq!(examples.len(), 2);
    assert_eq!(examples[0].question, "baby fever at night");
    assert_eq!(examples[0].embedding_index, 0);
    assert_eq!(examples[0].answer, "answer to baby fever at night");
    assert_eq!(examples, selector.select("baby fever at night", 5, 2).unwrap());
}

proptest! {
    #[test]
    fn picks_are_distinct_bounded_and_deterministic(
        rows in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 1..12),
        query in prop::collection::vec(-1.0f32..1.0, 4),
        top_k in 1usize..8,
        final_k in 1usize..6,
    ) {
        let index = FlatIndex::from_rows(4, rows.clone()).unwrap();
        let picks = select_diverse(&index, &query, top_k, final_k);
        if peds_vector::flat::l2_normalize(&query).is_some() {
            prop_assert_eq!(picks.len(), final_k.min(top_k).min(rows.len()));
        }
        let mut unique = picks.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), picks.len());
        prop_assert_eq!(picks, select_diverse(&index, &query, top_k, final_k));
    }
}
