//! Sparse term-weight vectors.

use serde::{Deserialize, Serialize};

/// A sparse vector of `(dimension, weight)` pairs sorted by dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build a vector from unordered entries. Zero weights are dropped and
    /// repeated dimensions are summed.
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, weight) in entries {
            match merged.last_mut() {
                Some((last, total)) if *last == idx => *total += weight,
                _ => merged.push((idx, weight)),
            }
        }
        merged.retain(|&(_, weight)| weight != 0.0);

        SparseVector { entries: merged }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero dimensions.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight(&self, idx: usize) -> f64 {
        self.entries
            .binary_search_by_key(&idx, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Scale to unit length. The zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 && norm.is_finite() {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; zero when either vector is empty.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            self.dot(other) / denom
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_merges_and_sorts() {
        let v = SparseVector::from_entries(vec![(5, 1.0), (1, 2.0), (5, 0.5), (3, 0.0)]);
        assert_eq!(v.entries(), &[(1, 2.0), (5, 1.5)]);
        assert_eq!(v.weight(5), 1.5);
        assert_eq!(v.weight(3), 0.0);
    }

    #[test]
    fn test_dot_and_cosine() {
        let a = SparseVector::from_entries(vec![(0, 1.0), (2, 1.0)]);
        let b = SparseVector::from_entries(vec![(2, 3.0), (4, 4.0)]);
        assert_eq!(a.dot(&b), 3.0);
        assert!((a.cosine(&b) - 3.0 / (2f64.sqrt() * 5.0)).abs() < 1e-12);
        assert_eq!(a.cosine(&SparseVector::default()), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = SparseVector::from_entries(vec![(0, 3.0), (1, 4.0)]);
        v.normalize();
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!((v.dot(&v) - 1.0).abs() < 1e-12);

        let mut zero = SparseVector::default();
        zero.normalize();
        assert!(zero.is_empty());
    }
}
