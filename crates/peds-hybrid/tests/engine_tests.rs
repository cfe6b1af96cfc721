use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use peds_core::error::{Error, Result};
use peds_core::traits::{Embedder, KeywordSearch, SemanticSearch};
use peds_core::types::{ReferencePage, SearchHit};
use peds_embed::FakeEmbedder;
use peds_hybrid::HybridSearchEngine;
use peds_text::TantivyIndexer;
use peds_vector::PageVectorStore;

struct FixedHits(Vec<SearchHit>);

impl KeywordSearch for FixedHits {
    fn keyword_search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

impl SemanticSearch for FixedHits {
    fn semantic_search(&self, _query_vec: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

/// Records the candidate limit every channel call asks for.
#[derive(Default)]
struct Recording {
    limits: Mutex<Vec<usize>>,
}

impl Recording {
    fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

impl KeywordSearch for Recording {
    fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.limits.lock().unwrap().push(limit);
        Ok(vec![hit(query, 1.0)])
    }
}

impl SemanticSearch for Recording {
    fn semantic_search(&self, _query_vec: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        self.limits.lock().unwrap().push(limit);
        Ok(vec![hit("S", 0.5)])
    }
}

struct Counting {
    inner: FakeEmbedder,
    calls: AtomicUsize,
}

impl Embedder for Counting {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }
    fn dim(&self) -> usize { self.inner.dim() }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

struct Down;

impl SemanticSearch for Down {
    fn semantic_search(&self, _query_vec: &[f32], _limit: usize) -> Result<Vec<SearchHit>> {
        Err(Error::upstream("elasticsearch", "connection refused"))
    }
}

fn hit(title: &str, score: f32) -> SearchHit {
    SearchHit { score, source_title: Some(title.into()), source_page: Some(1), text: format!("{title} text"), relationships: vec![] }
}

fn embedder() -> Arc<dyn Embedder> {
    Arc::new(FakeEmbedder::new(32))
}

#[test]
fn hybrid_search_blends_both_channels() {
    let engine = HybridSearchEngine::new(
        FixedHits(vec![hit("A", 10.0), hit("B", 5.0)]),
        FixedHits(vec![hit("B", 0.9), hit("C", 0.1)]),
        embedder(),
        0.2,
    )
    .unwrap();
    let results = engine.hybrid_search("fever", 5).unwrap();
    let titles: Vec<&str> = results.iter().map(|r| r.source().title.as_str()).collect();
    assert_eq!(titles, vec!["B", "A", "C"]);
    assert_eq!(engine.hybrid_search("fever", 1).unwrap().len(), 1);
}

#[test]
fn each_channel_is_asked_for_twice_top_k() {
    let keyword = Arc::new(Recording::default());
    let semantic = Arc::new(Recording::default());
    let counting = Arc::new(Counting { inner: FakeEmbedder::new(16), calls: AtomicUsize::new(0) });
    let engine = HybridSearchEngine::new(keyword.clone(), semantic.clone(), counting.clone(), 0.2).unwrap();

    engine.hybrid_search("fever", 5).unwrap();
    engine.hybrid_search("rash", 3).unwrap();

    assert_eq!(keyword.limits(), vec![10, 6]);
    assert_eq!(semantic.limits(), vec![10, 6]);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn channel_failure_surfaces_as_upstream_error() {
    let engine = HybridSearchEngine::new(FixedHits(vec![hit("A", 1.0)]), Down, embedder(), 0.2).unwrap();
    let err = engine.hybrid_search("fever", 5).unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable { service: "elasticsearch", .. }));
}

#[test]
fn invalid_alpha_rejected_at_construction() {
    assert!(HybridSearchEngine::new(FixedHits(vec![]), FixedHits(vec![]), embedder(), 2.0).is_err());
}

#[test]
fn local_channels_work_together() {
    let pages = vec![
        ReferencePage { title: "Fever".into(), page_number: 4, original_text: "fever in infants under three months".into(), relationships: vec![] },
        ReferencePage { title: "Teeth".into(), page_number: 9, original_text: "first teeth usually appear around six months".into(), relationships: vec![] },
        ReferencePage { title: "Sleep".into(), page_number: 2, original_text: "toddlers usually nap once a day".into(), relationships: vec![] },
    ];
    let embedder = embedder();
    let keyword = TantivyIndexer::in_memory().unwrap();
    keyword.index_pages(&pages).unwrap();
    let semantic = PageVectorStore::build(pages, embedder.as_ref()).unwrap();
    let engine = HybridSearchEngine::new(keyword, semantic, embedder, 0.2).unwrap();

    let results = engine.hybrid_search("fever in infants under three months", 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source().title, "Fever");
    assert!((results[0].final_score - 1.0).abs() < 1e-6);
}
