use std::fs;
use std::path::Path;
use std::sync::Arc;

use peds_core::config::CorpusSettings;
use peds_core::traits::{Embedder, SemanticSearch};
use peds_core::types::ReferencePage;
use peds_embed::FakeEmbedder;
use peds_vector::{DiversitySelector, ExampleCorpus, PageVectorStore};
use tempfile::TempDir;

fn page(title: &str, page_number: i64, text: &str) -> ReferencePage {
    ReferencePage { title: title.into(), page_number, original_text: text.into(), relationships: vec![] }
}

#[test]
fn page_store_scores_on_shifted_cosine_and_round_trips() {
    let embedder = FakeEmbedder::new(128);
    let pages = vec![
        page("Fever", 1, "fever in young infants needs prompt review"),
        page("Sleep", 2, "toddlers nap once or twice a day"),
    ];
    let store = PageVectorStore::build(pages, &embedder).unwrap();
    let query = embedder.embed("toddlers nap once or twice a day").unwrap();

    let hits = store.semantic_search(&query, 5).unwrap();
    assert_eq!(hits[0].source_title.as_deref(), Some("Sleep"));
    assert!((hits[0].score - 2.0).abs() < 1e-4);
    assert!(hits.iter().all(|h| (0.0..=2.0 + 1e-4).contains(&h.score)));

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("indexes/pages.vectors.json");
    store.save(&path).unwrap();
    let reloaded = PageVectorStore::load(&path).unwrap();
    assert_eq!(reloaded.embedder_id(), embedder.embedder_id());
    let again = reloaded.semantic_search(&query, 5).unwrap();
    assert_eq!(again.len(), hits.len());
    assert_eq!(again[0].source_page, Some(2));
}

#[test]
fn wrong_query_width_is_invalid_input() {
    let store = PageVectorStore::build(vec![page("A", 1, "alpha")], &FakeEmbedder::new(8)).unwrap();
    assert!(!store.semantic_search(&[1.0, 0.0], 3).unwrap_err().is_external());
}

#[test]
fn corpus_embeddings_are_cached_next_to_the_corpus() {
    let tmp = TempDir::new().unwrap();
    let corpus_path = tmp.path().join("conversations.jsonl");
    fs::write(
        &corpus_path,
        concat!(
            r#"{"department":"内科","ask":"baby fever","answer":"check temperature"}"#, "\n",
            r#"{"department":"眼科","ask":"red eye","answer":"see a doctor"}"#, "\n",
            r#"{"department":"皮肤科","ask":"eczema","answer":"moisturize"}"#, "\n",
        ),
    )
    .unwrap();
    let allowed = vec!["内科".to_string(), "眼科".to_string()];
    let embedder = FakeEmbedder::new(32);

    let corpus = ExampleCorpus::load(&corpus_path, &allowed, &embedder).unwrap();
    assert_eq!(corpus.len(), 2);
    let cache_path = tmp.path().join("conversations.embeddings.json");
    assert!(cache_path.exists());
    let written = fs::metadata(&cache_path).unwrap().modified().unwrap();

    let cached = ExampleCorpus::load(&corpus_path, &allowed, &embedder).unwrap();
    assert_eq!(cached.records(), corpus.records());
    assert_eq!(fs::metadata(&cache_path).unwrap().modified().unwrap(), written);

    // a different embedder invalidates the cache
    let rebuilt = ExampleCorpus::load(&corpus_path, &allowed, &FakeEmbedder::new(16)).unwrap();
    assert_eq!(rebuilt.index().dim(), 16);
}

#[test]
fn missing_corpus_is_corpus_unavailable() {
    let tmp = TempDir::new().unwrap();
    let err = ExampleCorpus::load(&tmp.path().join("absent.jsonl"), &[], &FakeEmbedder::new(8)).err().unwrap();
    assert!(matches!(err, peds_core::error::Error::CorpusUnavailable(_)));
}

fn two_department_corpus(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("conversations.jsonl");
    fs::write(
        &path,
        concat!(
            r#"{"department":"A","ask":"baby fever","answer":"check temperature"}"#, "\n",
            r#"{"department":"B","ask":"red eye","answer":"see a doctor"}"#, "\n",
        ),
    )
    .unwrap();
    path
}

#[test]
fn changing_the_department_filter_invalidates_the_cache() {
    let tmp = TempDir::new().unwrap();
    let path = two_department_corpus(tmp.path());
    let embedder = FakeEmbedder::new(16);

    let filtered = ExampleCorpus::load(&path, &["A".to_string()], &embedder).unwrap();
    assert_eq!(filtered.len(), 1);

    let unfiltered = ExampleCorpus::load(&path, &[], &embedder).unwrap();
    assert_eq!(unfiltered.len(), 2);

    // same filter in another order and with padding reuses the cache
    let both = ExampleCorpus::load(&path, &[" B".to_string(), "A".to_string()], &embedder).unwrap();
    assert_eq!(both.len(), 2);
    let cache_path = tmp.path().join("conversations.embeddings.json");
    let written = fs::metadata(&cache_path).unwrap().modified().unwrap();
    let reordered = ExampleCorpus::load(&path, &["A".to_string(), "B".to_string()], &embedder).unwrap();
    assert_eq!(reordered.records(), both.records());
    assert_eq!(fs::metadata(&cache_path).unwrap().modified().unwrap(), written);
}

#[cfg(target_os = "linux")]
#[test]
fn failed_flush_is_reported_by_save() {
    let full = Path::new("/dev/full");
    if !full.exists() {
        return;
    }
    let store = PageVectorStore::build(vec![page("A", 1, "alpha")], &FakeEmbedder::new(8)).unwrap();
    assert!(store.save(full).is_err());
}

fn corpus_settings(path: Option<&Path>) -> CorpusSettings {
    CorpusSettings { path: path.map(|p| p.display().to_string()), allowed_departments: vec![], ..CorpusSettings::default() }
}

#[test]
fn selector_without_corpus_never_builds_an_encoder() {
    let selector = DiversitySelector::from_settings(&corpus_settings(None), || -> anyhow::Result<Arc<dyn Embedder>> {
        panic!("encoder must not be loaded")
    });
    assert!(!selector.is_available());
}

#[test]
fn missing_encoder_or_corpus_degrades_to_no_examples() {
    let tmp = TempDir::new().unwrap();
    let path = two_department_corpus(tmp.path());

    let no_encoder = DiversitySelector::from_settings(&corpus_settings(Some(&path)), || Err(anyhow::anyhow!("model directory missing")));
    assert!(!no_encoder.is_available());
    assert!(no_encoder.select("fever", 5, 3).unwrap().is_empty());

    let absent = tmp.path().join("absent.jsonl");
    let no_corpus = DiversitySelector::from_settings(&corpus_settings(Some(&absent)), || Ok(Arc::new(FakeEmbedder::new(8)) as Arc<dyn Embedder>));
    assert!(!no_corpus.is_available());

    let loaded = DiversitySelector::from_settings(&corpus_settings(Some(&path)), || Ok(Arc::new(FakeEmbedder::new(8)) as Arc<dyn Embedder>));
    assert!(loaded.is_available());
    assert_eq!(loaded.select("baby fever", 5, 3).unwrap().len(), 2);
}
