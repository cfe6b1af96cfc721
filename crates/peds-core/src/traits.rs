use crate::error::Result;
use crate::types::{ChatMessage, SearchHit};

pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `local:bert:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| crate::error::Error::upstream("embedding", "provider returned no vector"))
    }
}

/// Lexical channel: full-text match over the reference pages.
pub trait KeywordSearch: Send + Sync {
    fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// Semantic channel: similarity against stored page embeddings.
pub trait SemanticSearch: Send + Sync {
    fn semantic_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<SearchHit>>;
}

/// Opaque text generation: role-tagged messages in, text out.
pub trait Generator: Send + Sync {
    fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String>;
}

impl<T: Embedder + ?Sized> Embedder for std::sync::Arc<T> {
    fn embedder_id(&self) -> &str { (**self).embedder_id() }
    fn dim(&self) -> usize { (**self).dim() }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { (**self).embed_batch(texts) }
}

impl<T: KeywordSearch + ?Sized> KeywordSearch for std::sync::Arc<T> {
    fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> { (**self).keyword_search(query, limit) }
}

impl<T: SemanticSearch + ?Sized> SemanticSearch for std::sync::Arc<T> {
    fn semantic_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<SearchHit>> { (**self).semantic_search(query_vec, limit) }
}

impl<T: Generator + ?Sized> Generator for std::sync::Arc<T> {
    fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> { (**self).generate(messages, temperature) }
}
