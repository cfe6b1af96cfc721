//! Conversation corpus: real parent questions with doctor answers, embedded
//! once and reused for every request.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use peds_core::error::{Error, Result};
use peds_core::traits::Embedder;

use crate::cache::{cache_path_for, department_key, fingerprint, CorpusCache};
use crate::flat::FlatIndex;
use crate::store::embed_all;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub department: String,
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize)]
struct RawRow {
    department: Option<String>,
    ask: Option<String>,
    answer: Option<String>,
}

/// Parse JSONL rows, dropping malformed or incomplete ones and rows outside
/// `allowed_departments` (an empty list keeps everything).
pub fn parse_rows(text: &str, allowed_departments: &[String]) -> Vec<CorpusRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let row = match serde_json::from_str::<RawRow>(line) {
            Ok(row) => row,
            Err(_) => { dropped += 1; continue; }
        };
        let fields = (row.department.map(|s| s.trim().to_string()), row.ask.map(|s| s.trim().to_string()), row.answer.map(|s| s.trim().to_string()));
        let (Some(department), Some(question), Some(answer)) = fields else { dropped += 1; continue };
        if department.is_empty() || question.is_empty() || answer.is_empty() { dropped += 1; continue; }
        if !allowed_departments.is_empty() && !allowed_departments.iter().any(|d| d == &department) { continue; }
        records.push(CorpusRecord { department, question, answer });
    }
    if dropped > 0 { warn!(dropped, "corpus rows without department/ask/answer skipped"); }
    records
}

pub struct ExampleCorpus {
    records: Vec<CorpusRecord>,
    index: FlatIndex,
    embedder_id: String,
}

impl ExampleCorpus {
    pub fn from_parts(records: Vec<CorpusRecord>, vectors: Vec<Vec<f32>>, dim: usize, embedder_id: impl Into<String>) -> Result<Self> {
        if records.len() != vectors.len() {
            return Err(Error::CorpusUnavailable(format!("{} records but {} vectors", records.len(), vectors.len())));
        }
        let index = FlatIndex::from_rows(dim, vectors).map_err(|e| Error::CorpusUnavailable(e.to_string()))?;
        Ok(Self { records, index, embedder_id: embedder_id.into() })
    }

    /// Load the corpus at `path`, embedding the questions on first use and
    /// reading the cached vectors afterwards.
    pub fn load(path: &Path, allowed_departments: &[String], embedder: &dyn Embedder) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::CorpusUnavailable(format!("{}: {e}", path.display())))?;
        let print = fingerprint(&bytes);
        let departments = department_key(allowed_departments);
        let cache_path = cache_path_for(path);

        if let Some(cache) = CorpusCache::read(&cache_path) {
            if cache.matches(&print, &departments, embedder.embedder_id()) {
                info!(rows = cache.records.len(), path = %cache_path.display(), "conversation embeddings loaded from cache");
                return Self::from_parts(cache.records, cache.vectors, cache.dim, cache.embedder_id);
            }
            warn!(path = %cache_path.display(), "embeddings cache is stale; rebuilding");
        }

        let text = String::from_utf8_lossy(&bytes);
        let records = parse_rows(&text, allowed_departments);
        if records.is_empty() {
            return Err(Error::CorpusUnavailable(format!("no usable rows in {}", path.display())));
        }
        info!(rows = records.len(), embedder = embedder.embedder_id(), "embedding conversation corpus");
        let questions: Vec<String> = records.iter().map(|r| r.question.clone()).collect();
        let vectors = embed_all(embedder, &questions, "questions")?;

        let cache = CorpusCache {
            corpus_path: path.display().to_string(),
            fingerprint: print,
            departments,
            embedder_id: embedder.embedder_id().to_string(),
            dim: embedder.dim(),
            created_at: chrono::Utc::now(),
            records,
            vectors,
        };
        if let Err(e) = cache.write(&cache_path) {
            warn!(error = %e, "could not persist embeddings cache");
        }
        Self::from_parts(cache.records, cache.vectors, cache.dim, cache.embedder_id)
    }

    pub fn records(&self) -> &[CorpusRecord] { &self.records }
    pub fn index(&self) -> &FlatIndex { &self.index }
    pub fn embedder_id(&self) -> &str { &self.embedder_id }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_trimmed_and_filtered() {
        let text = concat!(
            r#"{"department":" 内科 ","ask":" 宝宝发烧怎么办 ","answer":"多喝水"}"#, "\n",
            r#"{"department":"皮肤科","ask":"湿疹","answer":"保湿"}"#, "\n",
            r#"{"department":"内科","ask":"咳嗽"}"#, "\n",
            "garbage\n",
        );
        let allowed = vec!["内科".to_string()];
        let rows = parse_rows(text, &allowed);
        assert_eq!(rows, vec![CorpusRecord { department: "内科".into(), question: "宝宝发烧怎么办".into(), answer: "多喝水".into() }]);
        assert_eq!(parse_rows(text, &[]).len(), 2);
    }
}
