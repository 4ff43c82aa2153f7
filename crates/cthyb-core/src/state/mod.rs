//! Fock state vectors confined to one invariant subspace.
//!
//! A [`State`] pairs a subspace id with an amplitude container. The
//! container is chosen at runtime per subspace (see
//! [`StateLayout`](crate::hilbert::StateLayout)):
//!
//! ```text
//! Amplitudes<ElT>
//! ├── Sparse  - ordered map index → amplitude, pruned below a tolerance
//! └── Dense   - one slot per local index, never pruned
//! ```
//!
//! A state built with [`State::null`] is bound to no subspace. It is what an
//! operator returns when its connectivity says "annihilates to zero"; any
//! arithmetic on it fails with [`CoreError::UnboundState`].
//!
//! # Zero predicate
//!
//! [`State::is_zero`] reports "no stored amplitude". A sparse state becomes
//! zero once every entry has been pruned; a dense state of nonzero
//! dimension is never zero, whatever its entries. Use
//! [`State::is_negligible`] for a threshold-based check.

mod dense;
mod sparse;

pub use dense::DenseAmplitudes;
pub use sparse::SparseAmplitudes;

use crate::error::{CoreError, Result};
use crate::hilbert::{FockState, StateLayout, Subspace, SubspaceId};
use crate::scalar::Scalar;
use faer_traits::math_utils::{abs, abs2, conj, recip};

/// Amplitude container of a [`State`].
#[derive(Debug, Clone, PartialEq)]
pub enum Amplitudes<ElT: Scalar> {
    Sparse(SparseAmplitudes<ElT>),
    Dense(DenseAmplitudes<ElT>),
}

/// A vector of amplitudes over the basis of one subspace.
///
/// # Example
///
/// ```
/// use cthyb_core::hilbert::{StateLayout, Subspace};
/// use cthyb_core::state::State;
///
/// let sp = Subspace::new(0, vec![0b00, 0b01, 0b10]);
/// let mut a: State<f64> = State::zeros(&sp, StateLayout::sparse());
/// a.add_at(1, 2.0).unwrap();
/// let b = a.clone();
/// a.add_assign(&b).unwrap();
/// assert_eq!(a.amplitude(1), 4.0);
/// assert_eq!(a.dot(&b).unwrap(), 8.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct State<ElT: Scalar> {
    subspace: Option<SubspaceId>,
    amplitudes: Amplitudes<ElT>,
}

impl<ElT: Scalar> State<ElT> {
    /// The unbound state.
    pub fn null() -> Self {
        Self {
            subspace: None,
            amplitudes: Amplitudes::Dense(DenseAmplitudes::zeros(0)),
        }
    }

    /// Zero state in `subspace`, representation chosen by `layout`.
    pub fn zeros(subspace: &Subspace, layout: StateLayout) -> Self {
        if layout.is_dense(subspace.dim()) {
            Self::dense(subspace)
        } else {
            Self::sparse(subspace, layout.prune_tolerance)
        }
    }

    /// Zero dense state in `subspace`.
    pub fn dense(subspace: &Subspace) -> Self {
        Self {
            subspace: Some(subspace.id()),
            amplitudes: Amplitudes::Dense(DenseAmplitudes::zeros(subspace.dim())),
        }
    }

    /// Zero sparse state in `subspace`.
    pub fn sparse(subspace: &Subspace, tolerance: f64) -> Self {
        Self {
            subspace: Some(subspace.id()),
            amplitudes: Amplitudes::Sparse(SparseAmplitudes::new(subspace.dim(), tolerance)),
        }
    }

    /// Dense state from explicit amplitudes, one per basis state of `subspace`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `data.len() != subspace.dim()`.
    pub fn from_dense(subspace: &Subspace, data: Vec<ElT>) -> Result<Self> {
        if data.len() != subspace.dim() {
            return Err(CoreError::DimensionMismatch {
                subspace: subspace.id(),
                expected: subspace.dim(),
                found: data.len(),
            });
        }
        Ok(Self {
            subspace: Some(subspace.id()),
            amplitudes: Amplitudes::Dense(DenseAmplitudes::from_vec(data)),
        })
    }

    /// State in `subspace` with amplitude `f(i)` at every local index `i`,
    /// pruned if sparse.
    pub(crate) fn from_fn<F>(subspace: &Subspace, layout: StateLayout, mut f: F) -> Self
    where
        F: FnMut(usize) -> ElT,
    {
        let mut st = Self::zeros(subspace, layout);
        match &mut st.amplitudes {
            Amplitudes::Sparse(s) => {
                for i in 0..subspace.dim() {
                    s.add_at(i, f(i));
                }
                s.prune();
            }
            Amplitudes::Dense(d) => {
                for i in 0..subspace.dim() {
                    d[i] = f(i);
                }
            }
        }
        st
    }

    /// Basis vector `e_i` of `subspace`.
    pub fn basis(subspace: &Subspace, i: usize, layout: StateLayout) -> Result<Self> {
        let mut st = Self::zeros(subspace, layout);
        st.add_at(i, ElT::one())?;
        Ok(st)
    }

    /// Id of the subspace this state lives in.
    #[inline]
    pub fn subspace_id(&self) -> Option<SubspaceId> {
        self.subspace
    }

    /// Whether this state is bound to a subspace.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.subspace.is_some()
    }

    /// Whether the dense representation is used.
    #[inline]
    pub fn is_dense(&self) -> bool {
        matches!(self.amplitudes, Amplitudes::Dense(_))
    }

    /// Amplitude container.
    #[inline]
    pub fn amplitudes(&self) -> &Amplitudes<ElT> {
        &self.amplitudes
    }

    /// Dimension of the subspace (0 for the unbound state).
    pub fn dim(&self) -> usize {
        match &self.amplitudes {
            Amplitudes::Sparse(s) => s.dim(),
            Amplitudes::Dense(d) => d.len(),
        }
    }

    /// Amplitude at local index `i`; zero when not stored.
    pub fn amplitude(&self, i: usize) -> ElT {
        match &self.amplitudes {
            Amplitudes::Sparse(s) => s.get(i).unwrap_or_else(ElT::zero),
            Amplitudes::Dense(d) => d.as_slice().get(i).copied().unwrap_or_else(ElT::zero),
        }
    }

    fn bound_id(&self) -> Result<SubspaceId> {
        self.subspace.ok_or(CoreError::UnboundState)
    }

    fn check_same_space(&self, other: &Self) -> Result<()> {
        let left = self.bound_id()?;
        let right = other.bound_id()?;
        if left != right {
            return Err(CoreError::SubspaceMismatch { left, right });
        }
        if self.dim() != other.dim() {
            return Err(CoreError::DimensionMismatch {
                subspace: left,
                expected: self.dim(),
                found: other.dim(),
            });
        }
        Ok(())
    }

    /// Accumulate `v` into local index `i`. Sparse states are not pruned here.
    ///
    /// # Errors
    ///
    /// `UnboundState` on the null state, `IndexOutOfBounds` if `i >= dim`.
    pub fn add_at(&mut self, i: usize, v: ElT) -> Result<()> {
        self.bound_id()?;
        let dim = self.dim();
        if i >= dim {
            return Err(CoreError::IndexOutOfBounds { index: i, dim });
        }
        match &mut self.amplitudes {
            Amplitudes::Sparse(s) => s.add_at(i, v),
            Amplitudes::Dense(d) => d[i] += v,
        }
        Ok(())
    }

    /// Drop negligible sparse entries (no-op for dense states).
    pub fn prune(&mut self) {
        if let Amplitudes::Sparse(s) = &mut self.amplitudes {
            s.prune();
        }
    }

    /// In-place addition.
    pub fn add_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_space(other)?;
        match (&mut self.amplitudes, &other.amplitudes) {
            (Amplitudes::Dense(a), Amplitudes::Dense(b)) => a.add_assign(b),
            (Amplitudes::Sparse(a), Amplitudes::Sparse(b)) => a.add_assign(b),
            (Amplitudes::Sparse(a), Amplitudes::Dense(b)) => {
                for (i, &v) in b.as_slice().iter().enumerate() {
                    a.add_at(i, v);
                }
                a.prune();
            }
            (Amplitudes::Dense(a), Amplitudes::Sparse(b)) => {
                for (&i, &v) in b.iter() {
                    a[i] += v;
                }
            }
        }
        Ok(())
    }

    /// In-place subtraction.
    pub fn sub_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_space(other)?;
        match (&mut self.amplitudes, &other.amplitudes) {
            (Amplitudes::Dense(a), Amplitudes::Dense(b)) => a.sub_assign(b),
            (Amplitudes::Sparse(a), Amplitudes::Sparse(b)) => a.sub_assign(b),
            (Amplitudes::Sparse(a), Amplitudes::Dense(b)) => {
                for (i, &v) in b.as_slice().iter().enumerate() {
                    a.add_at(i, -v);
                }
                a.prune();
            }
            (Amplitudes::Dense(a), Amplitudes::Sparse(b)) => {
                for (&i, &v) in b.iter() {
                    a[i] -= v;
                }
            }
        }
        Ok(())
    }

    /// In-place multiplication by a scalar.
    pub fn scale(&mut self, x: ElT) -> Result<()> {
        self.bound_id()?;
        match &mut self.amplitudes {
            Amplitudes::Sparse(s) => s.scale(x),
            Amplitudes::Dense(d) => d.scale(x),
        }
        Ok(())
    }

    /// In-place division by a scalar.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DivisionByZero` if `x == 0`.
    pub fn divide(&mut self, x: ElT) -> Result<()> {
        self.bound_id()?;
        if abs(&x) == 0.0 {
            return Err(CoreError::DivisionByZero);
        }
        self.scale(recip(&x))
    }

    /// Inner product `<self|other>`, conjugate-linear in `self`.
    pub fn dot(&self, other: &Self) -> Result<ElT> {
        self.check_same_space(other)?;
        let r = match (&self.amplitudes, &other.amplitudes) {
            (Amplitudes::Dense(a), Amplitudes::Dense(b)) => a.dot(b),
            (Amplitudes::Sparse(a), Amplitudes::Sparse(b)) => a.dot(b),
            (Amplitudes::Sparse(a), Amplitudes::Dense(b)) => {
                let mut sum = ElT::zero();
                for (&i, &v) in a.iter() {
                    sum += conj(&v) * b[i];
                }
                sum
            }
            (Amplitudes::Dense(a), Amplitudes::Sparse(b)) => {
                let mut sum = ElT::zero();
                for (&i, &v) in b.iter() {
                    sum += conj(&a[i]) * v;
                }
                sum
            }
        };
        Ok(r)
    }

    /// Euclidean norm of the stored amplitudes.
    pub fn norm(&self) -> f64 {
        self.iter().map(|(_, v)| abs2(&v)).sum::<f64>().sqrt()
    }

    /// "No stored amplitude".
    ///
    /// True for the unbound state and for a sparse state with every entry
    /// pruned. A dense state is zero only if its subspace has dimension 0.
    pub fn is_zero(&self) -> bool {
        match &self.amplitudes {
            Amplitudes::Sparse(s) => s.nnz() == 0,
            Amplitudes::Dense(d) => d.is_empty(),
        }
    }

    /// Every stored amplitude has magnitude below `tolerance`.
    pub fn is_negligible(&self, tolerance: f64) -> bool {
        self.iter().all(|(_, v)| abs(&v) < tolerance)
    }

    /// Iterate stored `(local index, amplitude)` pairs.
    ///
    /// Sparse states yield stored entries only, dense states every index in
    /// ascending order.
    pub fn iter(&self) -> StateIter<'_, ElT> {
        match &self.amplitudes {
            Amplitudes::Sparse(s) => StateIter::Sparse(s.iter()),
            Amplitudes::Dense(d) => StateIter::Dense(d.as_slice().iter().enumerate()),
        }
    }

    /// Invoke `f(basis mask, amplitude)` for every stored entry.
    ///
    /// # Errors
    ///
    /// `UnboundState` on the null state, `SubspaceMismatch` if `subspace`
    /// is not the one this state lives in, `DimensionMismatch` if the
    /// storage disagrees with its dimension.
    pub fn for_each<F>(&self, subspace: &Subspace, mut f: F) -> Result<()>
    where
        F: FnMut(FockState, ElT),
    {
        self.check_subspace(subspace)?;
        for (i, v) in self.iter() {
            let fock = subspace.fock_state(i).ok_or(CoreError::IndexOutOfBounds {
                index: i,
                dim: subspace.dim(),
            })?;
            f(fock, v);
        }
        Ok(())
    }

    /// Check that this state lives in `subspace` and spans its whole basis.
    pub(crate) fn check_subspace(&self, subspace: &Subspace) -> Result<()> {
        let id = self.bound_id()?;
        if id != subspace.id() {
            return Err(CoreError::SubspaceMismatch {
                left: id,
                right: subspace.id(),
            });
        }
        if self.dim() != subspace.dim() {
            return Err(CoreError::DimensionMismatch {
                subspace: id,
                expected: subspace.dim(),
                found: self.dim(),
            });
        }
        Ok(())
    }
}

/// Iterator over the stored entries of a [`State`].
pub enum StateIter<'a, ElT: Scalar> {
    Sparse(std::collections::btree_map::Iter<'a, usize, ElT>),
    Dense(std::iter::Enumerate<std::slice::Iter<'a, ElT>>),
}

impl<ElT: Scalar> Iterator for StateIter<'_, ElT> {
    type Item = (usize, ElT);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            StateIter::Sparse(it) => it.next().map(|(&i, &v)| (i, v)),
            StateIter::Dense(it) => it.next().map(|(i, &v)| (i, v)),
        }
    }
}
