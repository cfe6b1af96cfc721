//! Diversity-constrained example selection.
//!
//! The candidate pool is the `top_k` corpus rows nearest to the query. The
//! nearest one is taken first; each following pick is the remaining
//! candidate whose highest similarity to anything already picked is lowest.

use std::sync::Arc;
use tracing::{debug, info, warn};

use peds_core::config::{expand_path, CorpusSettings};
use peds_core::error::Result;
use peds_core::traits::Embedder;
use peds_core::types::ConversationExample;

use crate::corpus::ExampleCorpus;
use crate::flat::{l2_normalize, FlatIndex};

/// Row ids of the selected examples, in pick order.
pub fn select_diverse(index: &FlatIndex, query: &[f32], top_k: usize, final_k: usize) -> Vec<usize> {
    if final_k == 0 || index.is_empty() {
        return Vec::new();
    }
    let Some(query) = l2_normalize(query) else { return Vec::new() };
    let mut pool: Vec<usize> = index.search(&query, top_k).into_iter().map(|(id, _)| id).collect();
    if pool.is_empty() {
        return Vec::new();
    }
    let mut selected = vec![pool.remove(0)];

    while selected.len() < final_k && !pool.is_empty() {
        let mut best_pos = 0usize;
        let mut best_max_sim = f32::INFINITY;
        for (pos, &candidate) in pool.iter().enumerate() {
            let max_sim = selected.iter().map(|&s| index.similarity(candidate, s)).fold(f32::NEG_INFINITY, f32::max);
            // strict `<` keeps the earliest pool position on ties
            if max_sim < best_max_sim {
                best_max_sim = max_sim;
                best_pos = pos;
            }
        }
        selected.push(pool.remove(best_pos));
    }
    selected
}

pub struct DiversitySelector {
    loaded: Option<(Arc<ExampleCorpus>, Arc<dyn Embedder>)>,
}

impl DiversitySelector {
    pub fn new(corpus: Arc<ExampleCorpus>, embedder: Arc<dyn Embedder>) -> Self {
        if corpus.embedder_id() != embedder.embedder_id() {
            warn!(corpus = corpus.embedder_id(), query = embedder.embedder_id(), "corpus and query embedders differ");
        }
        Self { loaded: Some((corpus, embedder)) }
    }

    /// Selector for a corpus (or its encoder) that failed to load; always
    /// yields no examples.
    pub fn unavailable() -> Self {
        Self { loaded: None }
    }

    /// Load the configured corpus. The encoder is only built when a corpus
    /// is configured; a missing corpus or encoder degrades to
    /// [`DiversitySelector::unavailable`] with a warning.
    pub fn from_settings<F>(settings: &CorpusSettings, encoder: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn Embedder>>,
    {
        let Some(path) = settings.path.as_deref() else {
            info!("no conversation corpus configured");
            return Self::unavailable();
        };
        let embedder = match encoder() {
            Ok(embedder) => embedder,
            Err(e) => {
                warn!(error = %e, "sentence encoder unavailable; answers will use no examples");
                return Self::unavailable();
            }
        };
        match ExampleCorpus::load(&expand_path(path), &settings.allowed_departments, embedder.as_ref()) {
            Ok(corpus) => Self::new(Arc::new(corpus), embedder),
            Err(e) => {
                warn!(error = %e, "conversation corpus unavailable; answers will use no examples");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn select(&self, query: &str, top_k: usize, final_k: usize) -> Result<Vec<ConversationExample>> {
        let Some((corpus, embedder)) = &self.loaded else {
            debug!("no conversation corpus loaded; skipping examples");
            return Ok(vec![]);
        };
        let query_vec = embedder.embed(query)?;
        let picks = select_diverse(corpus.index(), &query_vec, top_k, final_k);
        debug!(?picks, "diverse examples selected");
        Ok(picks
            .into_iter()
            .filter_map(|id| {
                corpus.records().get(id).map(|r| ConversationExample {
                    question: r.question.clone(),
                    answer: r.answer.clone(),
                    embedding_index: id,
                })
            })
            .collect())
    }
}
