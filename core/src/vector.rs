use crate::error::{MatchError, Result};
use crate::TermId;
use std::cmp::Ordering;

/// Sparse vector in one corpus's vector space.
///
/// Entries are sorted by term id with no duplicates and no explicit zeros. `generation` and
/// `dim` identify the vector space; vectors from different spaces never mix.
#[derive(Debug, Clone, PartialEq)]
pub struct TermVector {
    generation: u64,
    dim: usize,
    entries: Vec<(TermId, f32)>,
}

impl TermVector {
    pub(crate) fn from_sorted(generation: u64, dim: usize, entries: Vec<(TermId, f32)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(entries.iter().all(|(t, _)| (*t as usize) < dim));
        Self { generation, dim, entries }
    }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn dim(&self) -> usize { self.dim }

    pub fn entries(&self) -> &[(TermId, f32)] { &self.entries }

    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Weight of `term`, zero when absent.
    pub fn get(&self, term: TermId) -> f32 {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub(crate) fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.entries.iter_mut() { *w /= norm; }
        }
        self
    }

    /// Fails unless `other` lives in the same vector space.
    pub fn ensure_compatible(&self, other: &TermVector) -> Result<()> {
        self.ensure_space(other.generation, other.dim)
    }

    pub(crate) fn ensure_space(&self, generation: u64, dim: usize) -> Result<()> {
        if self.generation == generation && self.dim == dim {
            Ok(())
        } else {
            Err(MatchError::StaleVectorMismatch {
                expected_generation: generation,
                expected_dim: dim,
                found_generation: self.generation,
                found_dim: self.dim,
            })
        }
    }

    pub fn dot(&self, other: &TermVector) -> Result<f32> {
        self.ensure_compatible(other)?;
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j, mut sum) = (0, 0, 0.0f32);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        Ok(sum)
    }

    /// `a * self + b * other`, merged over the sorted entries.
    pub fn linear_combination(&self, a: f32, other: &TermVector, b: f32) -> Result<TermVector> {
        self.ensure_compatible(other)?;
        let (x, y) = (&self.entries, &other.entries);
        let mut out = Vec::with_capacity(x.len() + y.len());
        let (mut i, mut j) = (0, 0);
        while i < x.len() || j < y.len() {
            let (term, w) = match (x.get(i), y.get(j)) {
                (Some(&(tx, wx)), Some(&(ty, wy))) if tx == ty => {
                    i += 1;
                    j += 1;
                    (tx, a * wx + b * wy)
                }
                (Some(&(tx, wx)), Some(&(ty, _))) if tx < ty => {
                    i += 1;
                    (tx, a * wx)
                }
                (Some(&(tx, wx)), None) => {
                    i += 1;
                    (tx, a * wx)
                }
                (_, Some(&(ty, wy))) => {
                    j += 1;
                    (ty, b * wy)
                }
                (None, None) => unreachable!(),
            };
            if w != 0.0 { out.push((term, w)); }
        }
        Ok(TermVector::from_sorted(self.generation, self.dim, out))
    }
}

/// Cosine similarity; zero when either side has no magnitude.
pub fn cosine(a: &TermVector, b: &TermVector) -> Result<f32> {
    let dot = a.dot(b)?;
    Ok(cosine_from_parts(dot, a.norm(), b.norm()))
}

pub(crate) fn cosine_from_parts(dot: f32, norm_a: f32, norm_b: f32) -> f32 {
    let denom = norm_a * norm_b;
    if denom == 0.0 { 0.0 } else { (dot / denom).clamp(-1.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(generation: u64, entries: Vec<(TermId, f32)>) -> TermVector {
        TermVector::from_sorted(generation, 4, entries)
    }

    #[test]
    fn linear_combination_merges_disjoint_and_shared_terms() {
        let q = v(1, vec![(0, 1.0), (2, 2.0)]);
        let f = v(1, vec![(1, 4.0), (2, 4.0)]);
        let r = q.linear_combination(1.0, &f, 0.75).unwrap();
        assert_eq!(r.entries(), &[(0, 1.0), (1, 3.0), (2, 5.0)]);
    }

    #[test]
    fn zero_vector_has_zero_cosine() {
        let zero = v(1, vec![]);
        let other = v(1, vec![(3, 1.0)]);
        assert_eq!(cosine(&zero, &other).unwrap(), 0.0);
        assert_eq!(cosine(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn vectors_from_other_generations_are_rejected() {
        let a = v(1, vec![(0, 1.0)]);
        let b = v(2, vec![(0, 1.0)]);
        assert!(matches!(a.dot(&b), Err(MatchError::StaleVectorMismatch { .. })));
    }

    #[test]
    fn get_returns_zero_for_missing_terms() {
        let a = v(1, vec![(1, 0.5)]);
        assert_eq!(a.get(1), 0.5);
        assert_eq!(a.get(2), 0.0);
    }
}
