//! On-disk embeddings for the conversation corpus.
//!
//! One JSON file next to the corpus (`<stem>.embeddings.json`), valid while
//! the corpus fingerprint, the department filter and the embedder id all
//! match.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::corpus::CorpusRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusCache {
    pub corpus_path: String,
    pub fingerprint: String,
    /// Normalized allow-list the records were filtered with.
    pub departments: Vec<String>,
    pub embedder_id: String,
    pub dim: usize,
    pub created_at: DateTime<Utc>,
    pub records: Vec<CorpusRecord>,
    pub vectors: Vec<Vec<f32>>,
}

pub fn cache_path_for(corpus: &Path) -> PathBuf {
    let stem = corpus.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| "corpus".into());
    corpus.with_file_name(format!("{stem}.embeddings.json"))
}

pub fn fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Sorted, deduplicated, trimmed; empty means every department.
pub fn department_key(allowed: &[String]) -> Vec<String> {
    let mut key: Vec<String> = allowed.iter().map(|d| d.trim().to_string()).filter(|d| !d.is_empty()).collect();
    key.sort();
    key.dedup();
    key
}

/// Serialize `value` to `path`, surfacing errors from the final flush.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

impl CorpusCache {
    pub fn matches(&self, fingerprint: &str, departments: &[String], embedder_id: &str) -> bool {
        self.fingerprint == fingerprint
            && self.departments == departments
            && self.embedder_id == embedder_id
            && self.records.len() == self.vectors.len()
    }

    /// `None` when there is no cache yet or it cannot be read.
    pub fn read(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => { warn!(path = %path.display(), error = %e, "cannot open embeddings cache"); return None; }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(cache) => Some(cache),
            Err(e) => { warn!(path = %path.display(), error = %e, "unreadable embeddings cache; rebuilding"); None }
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = write_json(&tmp, self) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        std::fs::rename(&tmp, path)?;
        info!(path = %path.display(), rows = self.records.len(), "embeddings cache written");
        Ok(())
    }
}
