use std::cmp::Ordering;
use std::collections::HashMap;

use peds_core::error::{Error, Result};
use peds_core::types::{FusedResult, NormalizedResult};

pub const DEFAULT_ALPHA: f32 = 0.2;

pub fn validate_alpha(alpha: f32) -> Result<()> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("alpha must lie in [0, 1], got {alpha}")))
    }
}

fn single_channel(results: Vec<NormalizedResult>, keyword: bool) -> Vec<FusedResult> {
    results
        .into_iter()
        .map(|r| {
            let score = r.normalized_score;
            let (keyword_score, semantic_score) = if keyword { (score, 0.0) } else { (0.0, score) };
            FusedResult { result: r.result, keyword_score, semantic_score, final_score: score }
        })
        .collect()
}

/// Blend normalized keyword and semantic results per source:
/// `final = alpha * keyword + (1 - alpha) * semantic`.
///
/// When one channel is empty the other is returned as-is (its normalized
/// score becomes the final score), not scaled by `alpha`.
pub fn fuse(keyword: Vec<NormalizedResult>, semantic: Vec<NormalizedResult>, alpha: f32, top_k: Option<usize>) -> Result<Vec<FusedResult>> {
    validate_alpha(alpha)?;
    let mut fused = match (keyword.is_empty(), semantic.is_empty()) {
        (true, true) => Vec::new(),
        (false, true) => single_channel(keyword, true),
        (true, false) => single_channel(semantic, false),
        (false, false) => {
            let mut merged: Vec<FusedResult> = Vec::with_capacity(keyword.len() + semantic.len());
            let mut slot_by_key: HashMap<String, usize> = HashMap::new();
            for r in keyword {
                let key = r.result.source.key();
                if slot_by_key.contains_key(&key) { continue; }
                slot_by_key.insert(key, merged.len());
                merged.push(FusedResult { keyword_score: r.normalized_score, semantic_score: 0.0, final_score: 0.0, result: r.result });
            }
            for r in semantic {
                let key = r.result.source.key();
                match slot_by_key.get(&key) {
                    Some(&slot) => merged[slot].semantic_score = r.normalized_score,
                    None => {
                        slot_by_key.insert(key, merged.len());
                        merged.push(FusedResult { keyword_score: 0.0, semantic_score: r.normalized_score, final_score: 0.0, result: r.result });
                    }
                }
            }
            for f in &mut merged {
                f.final_score = alpha * f.keyword_score + (1.0 - alpha) * f.semantic_score;
            }
            merged.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(Ordering::Equal));
            merged
        }
    };
    if let Some(k) = top_k {
        fused.truncate(k);
    }
    Ok(fused)
}
