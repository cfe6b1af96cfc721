//! Loader for the reference literature feeding the local indexes.
//!
//! Every `*.jsonl` file under the data directory holds one page per line:
//! `{"title": ..., "page_number": ..., "original_text": ..., "relationships": [...]}`.
//! Malformed lines are skipped with a warning instead of aborting the load.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::ReferencePage;

#[derive(Default)]
pub struct ReferenceLoader {
    max_files: Option<usize>,
}

impl ReferenceLoader {
    pub fn new() -> Self { Self::default() }

    pub fn with_max_files(limit: usize) -> Self { Self { max_files: Some(limit) } }

    pub fn load_dir(&self, data_dir: &Path) -> Result<Vec<ReferencePage>> {
        let mut files = list_jsonl_files(data_dir);
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no .jsonl reference files found");
            return Ok(vec![]);
        }
        if let Some(limit) = self.max_files {
            if files.len() > limit {
                files.truncate(limit);
                info!(limit, "limited reference load to first files");
            }
        }
        let mut pages = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            info!(file = %file_path.display(), n = file_index + 1, total = files.len(), "loading reference file");
            pages.extend(self.load_file(file_path)?);
        }
        info!(files = files.len(), pages = pages.len(), "reference pages loaded");
        Ok(pages)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Vec<ReferencePage>> {
        let raw = fs::read(file_path).with_context(|| format!("reading {}", file_path.display()))?;
        let content = String::from_utf8_lossy(&raw);
        let mut pages = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() { continue; }
            match serde_json::from_str::<ReferencePage>(line) {
                Ok(page) if !page.original_text.trim().is_empty() => pages.push(page),
                Ok(_) => warn!(file = %file_path.display(), line = line_no + 1, "skipping page without text"),
                Err(e) => warn!(file = %file_path.display(), line = line_no + 1, error = %e, "skipping malformed page"),
            }
        }
        Ok(pages)
    }
}

fn list_jsonl_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jsonl"))
        .collect();
    files.sort();
    files
}
