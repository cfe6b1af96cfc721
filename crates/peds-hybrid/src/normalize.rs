use peds_core::error::{Error, Result};
use peds_core::types::{GroupedResult, NormalizedResult};

/// Min-max scale scores into `[0, 1]`. A batch whose scores are all equal
/// maps every item to 1.0.
pub fn normalize(results: Vec<GroupedResult>) -> Result<Vec<NormalizedResult>> {
    if results.is_empty() {
        return Ok(vec![]);
    }
    if let Some(bad) = results.iter().find(|r| !r.score.is_finite()) {
        return Err(Error::InvalidInput(format!("non-finite score {} for {}", bad.score, bad.source.key())));
    }
    // f64 so the span of extreme f32 scores stays finite
    let min = results.iter().map(|r| f64::from(r.score)).fold(f64::INFINITY, f64::min);
    let max = results.iter().map(|r| f64::from(r.score)).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    Ok(results
        .into_iter()
        .map(|result| {
            let normalized_score =
                if range > 0.0 { ((f64::from(result.score) - min) / range).clamp(0.0, 1.0) as f32 } else { 1.0 };
            NormalizedResult { result, normalized_score }
        })
        .collect())
}
