use std::collections::{HashMap, HashSet};

use peds_core::error::{Error, Result};
use peds_core::types::{GroupedResult, Relationship, SearchHit};

pub const PREVIEW_WORDS: usize = 20;

/// First `PREVIEW_WORDS` whitespace-separated words, with `...` when cut.
pub fn text_preview(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > PREVIEW_WORDS {
        format!("{}...", words[..PREVIEW_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

fn round3(score: f32) -> f32 {
    ((f64::from(score) * 1000.0).round() / 1000.0) as f32
}

/// Collapse raw hits to one result per `title_page` source key, in
/// first-seen order. The first hit for a key supplies score and text; later
/// hits only contribute relationship triples not already present.
pub fn group(hits: &[SearchHit]) -> Result<Vec<GroupedResult>> {
    let mut grouped: Vec<GroupedResult> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();
    let mut seen_triples: Vec<HashSet<(String, String, String)>> = Vec::new();

    for hit in hits {
        if hit.score.is_nan() {
            return Err(Error::InvalidInput(format!("NaN score for source {}", hit.source().key())));
        }
        let source = hit.source();
        let key = source.key();
        let slot = match slot_by_key.get(&key) {
            Some(&slot) => slot,
            None => {
                slot_by_key.insert(key, grouped.len());
                grouped.push(GroupedResult {
                    score: round3(hit.score),
                    source,
                    text_preview: text_preview(&hit.text),
                    full_text: hit.text.clone(),
                    relationships: Vec::new(),
                });
                seen_triples.push(HashSet::new());
                grouped.len() - 1
            }
        };
        merge_relationships(&mut grouped[slot].relationships, &mut seen_triples[slot], &hit.relationships);
    }
    Ok(grouped)
}

fn merge_relationships(into: &mut Vec<Relationship>, seen: &mut HashSet<(String, String, String)>, incoming: &[Relationship]) {
    for rel in incoming {
        if seen.insert(rel.key()) {
            into.push(rel.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_after_twenty_words() {
        let long = (1..=25).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        assert_eq!(text_preview(&long), format!("{}...", (1..=20).map(|i| i.to_string()).collect::<Vec<_>>().join(" ")));
        assert_eq!(text_preview("short  text"), "short text");
    }

    #[test]
    fn scores_round_to_three_places() {
        assert!((round3(0.123_56) - 0.124).abs() < 1e-6);
        assert_eq!(round3(f32::MAX), f32::MAX);
    }
}
