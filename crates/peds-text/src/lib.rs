//! peds-text
//!
//! Lexical search adapters: a local Tantivy index over reference pages and an
//! HTTP client for the Elasticsearch index that serves both retrieval
//! channels in production.

pub mod elastic;
pub mod index;
pub mod tantivy_utils;

pub use elastic::ElasticsearchClient;
pub use index::TantivyIndexer;
