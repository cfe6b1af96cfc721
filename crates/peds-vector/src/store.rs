//! Offline semantic channel: reference pages with their embeddings, searched
//! by cosine similarity and persisted as a single JSON file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use peds_core::error::Error;
use peds_core::traits::{Embedder, SemanticSearch};
use peds_core::types::{ReferencePage, SearchHit};

use crate::cache::write_json;
use crate::flat::{l2_normalize, FlatIndex};

const EMBED_BATCH: usize = 32;

#[derive(Serialize, Deserialize)]
struct StoredPages {
    embedder_id: String,
    dim: usize,
    created_at: DateTime<Utc>,
    pages: Vec<ReferencePage>,
    vectors: Vec<Vec<f32>>,
}

pub struct PageVectorStore {
    embedder_id: String,
    pages: Vec<ReferencePage>,
    vectors: Vec<Vec<f32>>,
    index: FlatIndex,
}

pub(crate) fn progress_bar(len: usize, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = format!("{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{percent}}%)");
    pb.set_style(ProgressStyle::default_bar().template(&template).unwrap_or_else(|_| ProgressStyle::default_bar()).progress_chars("#>-"));
    pb
}

pub(crate) fn embed_all(embedder: &dyn Embedder, texts: &[String], unit: &str) -> peds_core::error::Result<Vec<Vec<f32>>> {
    let pb = progress_bar(texts.len(), unit);
    let mut out = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH) {
        let vectors = embedder.embed_batch(batch)?;
        if vectors.len() != batch.len() {
            return Err(Error::upstream("embedding", format!("expected {} vectors, got {}", batch.len(), vectors.len())));
        }
        out.extend(vectors);
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();
    Ok(out)
}

impl PageVectorStore {
    pub fn build(pages: Vec<ReferencePage>, embedder: &dyn Embedder) -> Result<Self> {
        let texts: Vec<String> = pages.iter().map(|p| p.original_text.clone()).collect();
        let vectors = embed_all(embedder, &texts, "pages")?;
        info!(pages = pages.len(), embedder = embedder.embedder_id(), "page vectors built");
        Self::from_parts(embedder.embedder_id().to_string(), embedder.dim(), pages, vectors)
    }

    fn from_parts(embedder_id: String, dim: usize, pages: Vec<ReferencePage>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        anyhow::ensure!(pages.len() == vectors.len(), "{} pages but {} vectors", pages.len(), vectors.len());
        let index = FlatIndex::from_rows(dim, vectors.clone())?;
        Ok(Self { embedder_id, pages, vectors, index })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredPages {
            embedder_id: self.embedder_id.clone(),
            dim: self.index.dim(),
            created_at: Utc::now(),
            pages: self.pages.clone(),
            vectors: self.vectors.clone(),
        };
        write_json(path, &stored)?;
        info!(path = %path.display(), pages = self.pages.len(), "page vector store saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let stored: StoredPages = serde_json::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), created_at = %stored.created_at, "page vector store loaded");
        Self::from_parts(stored.embedder_id, stored.dim, stored.pages, stored.vectors)
    }

    pub fn embedder_id(&self) -> &str { &self.embedder_id }
    pub fn len(&self) -> usize { self.pages.len() }
    pub fn is_empty(&self) -> bool { self.pages.is_empty() }
}

impl SemanticSearch for PageVectorStore {
    /// Scores are cosine similarity shifted by +1.0, the same scale the
    /// search engine's script produces.
    fn semantic_search(&self, query_vec: &[f32], limit: usize) -> peds_core::error::Result<Vec<SearchHit>> {
        if query_vec.len() != self.index.dim() {
            return Err(Error::InvalidInput(format!("query has {} dims, store expects {}", query_vec.len(), self.index.dim())));
        }
        let Some(query) = l2_normalize(query_vec) else { return Ok(vec![]) };
        Ok(self
            .index
            .search(&query, limit)
            .into_iter()
            .filter_map(|(id, sim)| self.pages.get(id).map(|page| (page, sim)))
            .map(|(page, sim)| SearchHit {
                score: sim + 1.0,
                source_title: Some(page.title.clone()),
                source_page: Some(page.page_number),
                text: page.original_text.clone(),
                relationships: page.relationships.clone(),
            })
            .collect())
    }
}
