//! Sparse amplitude storage with automatic pruning.

use std::collections::BTreeMap;

use crate::scalar::Scalar;
use faer_traits::math_utils::{abs, conj};

/// Sparse amplitudes: local index → nonzero amplitude.
///
/// Entries with magnitude below `tolerance` are removed after every
/// mutating vector-space operation. Keys are kept ordered so that sums
/// over the support are reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseAmplitudes<ElT: Scalar> {
    entries: BTreeMap<usize, ElT>,
    dim: usize,
    tolerance: f64,
}

impl<ElT: Scalar> SparseAmplitudes<ElT> {
    /// Empty storage over a subspace of dimension `dim`.
    pub fn new(dim: usize, tolerance: f64) -> Self {
        Self {
            entries: BTreeMap::new(),
            dim,
            tolerance,
        }
    }

    /// Dimension of the underlying subspace.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Pruning tolerance.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Stored amplitude at `i`, if any.
    #[inline]
    pub fn get(&self, i: usize) -> Option<ElT> {
        self.entries.get(&i).copied()
    }

    /// Accumulate into entry `i` without pruning.
    #[inline]
    pub(crate) fn add_at(&mut self, i: usize, v: ElT) {
        *self.entries.entry(i).or_insert_with(ElT::zero) += v;
    }

    /// Iterate stored `(index, amplitude)` pairs in ascending index order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, usize, ElT> {
        self.entries.iter()
    }

    /// Drop entries whose magnitude is below the tolerance.
    pub fn prune(&mut self) {
        let tol = self.tolerance;
        self.entries.retain(|_, v| abs(&*v) >= tol);
    }

    pub(crate) fn add_assign(&mut self, other: &Self) {
        for (&i, &v) in &other.entries {
            self.add_at(i, v);
        }
        self.prune();
    }

    pub(crate) fn sub_assign(&mut self, other: &Self) {
        for (&i, &v) in &other.entries {
            self.add_at(i, -v);
        }
        self.prune();
    }

    pub(crate) fn scale(&mut self, x: ElT) {
        for v in self.entries.values_mut() {
            *v *= x;
        }
        self.prune();
    }

    /// Sum of `conj(a) * b` over keys present in both, walking the smaller support.
    pub(crate) fn dot(&self, other: &Self) -> ElT {
        let mut sum = ElT::zero();
        if self.nnz() <= other.nnz() {
            for (i, &a) in &self.entries {
                if let Some(&b) = other.entries.get(i) {
                    sum += conj(&a) * b;
                }
            }
        } else {
            for (i, &b) in &other.entries {
                if let Some(&a) = self.entries.get(i) {
                    sum += conj(&a) * b;
                }
            }
        }
        sum
    }
}
