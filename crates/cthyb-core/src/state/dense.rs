//! Dense amplitude storage.

use crate::scalar::Scalar;
use faer_traits::math_utils::conj;

/// Dense amplitudes - one slot per local basis index, no pruning.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseAmplitudes<ElT: Scalar> {
    data: Vec<ElT>,
}

impl<ElT: Scalar> DenseAmplitudes<ElT> {
    /// Create dense storage with given length, zero-initialized.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![ElT::zero(); len],
        }
    }

    /// Create dense storage from existing vector (takes ownership).
    pub fn from_vec(data: Vec<ElT>) -> Self {
        Self { data }
    }

    /// Length of storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get immutable slice of data.
    #[inline]
    pub fn as_slice(&self) -> &[ElT] {
        &self.data
    }

    /// Entrywise sum. Callers check that both sides have the same length.
    pub(crate) fn add_assign(&mut self, other: &Self) {
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }

    pub(crate) fn sub_assign(&mut self, other: &Self) {
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= b;
        }
    }

    pub(crate) fn scale(&mut self, x: ElT) {
        for a in &mut self.data {
            *a *= x;
        }
    }

    /// Full dot product, conjugating `self`.
    pub(crate) fn dot(&self, other: &Self) -> ElT {
        let mut sum = ElT::zero();
        for (&a, &b) in self.data.iter().zip(other.data.iter()) {
            sum += conj(&a) * b;
        }
        sum
    }
}

impl<ElT: Scalar> std::ops::Index<usize> for DenseAmplitudes<ElT> {
    type Output = ElT;

    #[inline]
    fn index(&self, i: usize) -> &ElT {
        &self.data[i]
    }
}

impl<ElT: Scalar> std::ops::IndexMut<usize> for DenseAmplitudes<ElT> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut ElT {
        &mut self.data[i]
    }
}
