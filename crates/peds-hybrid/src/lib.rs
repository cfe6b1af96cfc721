//! peds-hybrid
//!
//! Turns the raw hits of the keyword and semantic channels into one ranked
//! list of sources: group per source, min-max normalize per channel, blend.

pub mod fusion;
pub mod group;
pub mod normalize;

pub use fusion::{fuse, DEFAULT_ALPHA};
pub use group::group;
pub use normalize::normalize;

use std::sync::Arc;
use tracing::{debug, info};

use peds_core::error::{Error, Result};
use peds_core::traits::{Embedder, KeywordSearch, SemanticSearch};
use peds_core::types::FusedResult;

pub struct HybridSearchEngine<K, S> where K: KeywordSearch, S: SemanticSearch {
    keyword: K,
    semantic: S,
    embedder: Arc<dyn Embedder>,
    alpha: f32,
}

impl<K, S> HybridSearchEngine<K, S> where K: KeywordSearch, S: SemanticSearch {
    pub fn new(keyword: K, semantic: S, embedder: Arc<dyn Embedder>, alpha: f32) -> Result<Self> {
        fusion::validate_alpha(alpha)?;
        Ok(Self { keyword, semantic, embedder, alpha })
    }

    /// Query both channels for `2 * top_k` candidates each and return the
    /// fused top `top_k` sources. Either channel failing fails the search.
    pub fn hybrid_search(&self, query: &str, top_k: usize) -> Result<Vec<FusedResult>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("empty query".into()));
        }
        let fetch = top_k.saturating_mul(2);

        let keyword_hits = self.keyword.keyword_search(query, fetch)?;
        let query_vec = self.embedder.embed(query)?;
        let semantic_hits = self.semantic.semantic_search(&query_vec, fetch)?;
        debug!(keyword = keyword_hits.len(), semantic = semantic_hits.len(), "channel hits");

        let keyword = normalize(group(&keyword_hits)?)?;
        let semantic = normalize(group(&semantic_hits)?)?;
        let fused = fuse(keyword, semantic, self.alpha, Some(top_k))?;
        info!(query, results = fused.len(), alpha = self.alpha, "hybrid search");
        Ok(fused)
    }
}
