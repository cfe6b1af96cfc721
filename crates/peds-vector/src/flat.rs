//! Brute-force inner-product index over L2-normalized rows.

use std::cmp::Ordering;

pub fn l2_normalize(v: &[f32]) -> Option<Vec<f32>> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if v.is_empty() || !norm.is_finite() || norm == 0.0 {
        return None;
    }
    Some(v.iter().map(|x| x / norm).collect())
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    dim: usize,
    rows: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, rows: Vec::new() }
    }

    /// Rows are normalized on insert; zero vectors are kept as zeros so row
    /// ids stay aligned with the records they came from.
    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> anyhow::Result<Self> {
        let mut index = Self::new(dim);
        for row in rows {
            index.push(row)?;
        }
        Ok(index)
    }

    pub fn push(&mut self, row: Vec<f32>) -> anyhow::Result<usize> {
        anyhow::ensure!(row.len() == self.dim, "row has {} dims, index expects {}", row.len(), self.dim);
        let row = l2_normalize(&row).unwrap_or_else(|| vec![0.0; self.dim]);
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn row(&self, id: usize) -> Option<&[f32]> { self.rows.get(id).map(Vec::as_slice) }

    /// Top `k` rows by inner product with an already-normalized query,
    /// highest first; equal scores keep row order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self.rows.iter().enumerate().map(|(i, row)| (i, dot(query, row))).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }

    pub fn similarity(&self, a: usize, b: usize) -> f32 {
        match (self.row(a), self.row(b)) {
            (Some(x), Some(y)) => dot(x, y),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_orders_by_similarity_then_row() {
        let index = FlatIndex::from_rows(2, vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 0.0], vec![1.0, 1.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 3);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let mut index = FlatIndex::new(3);
        assert!(index.push(vec![1.0, 2.0]).is_err());
        assert!(l2_normalize(&[0.0, 0.0]).is_none());
    }
}
