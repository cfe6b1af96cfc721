//! peds-vector
//!
//! Dense retrieval without an external engine: a flat cosine index, the
//! offline page store for the semantic channel, and the conversation corpus
//! with its diversity selector.

pub mod cache;
pub mod corpus;
pub mod flat;
pub mod mmr;
pub mod store;

pub use corpus::{CorpusRecord, ExampleCorpus};
pub use flat::FlatIndex;
pub use mmr::{select_diverse, DiversitySelector};
pub use store::PageVectorStore;
