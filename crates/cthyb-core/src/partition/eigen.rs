//! Per-subspace diagonalization of the Hamiltonian.

use faer::linalg::solvers::EvdError;
use faer::{Mat, MatRef};

use crate::error::{CoreError, Result};
use crate::hilbert::{StateLayout, Subspace};
use crate::operator::FockOperator;
use crate::state::State;

/// Spectrum of the Hamiltonian restricted to one subspace.
///
/// `unitary` holds the eigenvectors as columns in the subspace basis, so
/// `H = U · diag(eigenvalues + E0) · Uᵀ` with `E0` the ground-state energy.
#[derive(Clone, Debug)]
pub struct Eigensystem {
    /// Ascending, shifted by the global ground-state energy.
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors as dense states of the subspace.
    pub eigenstates: Vec<State<f64>>,
    pub unitary: Mat<f64>,
}

impl Eigensystem {
    /// Dimension of the subspace.
    #[inline]
    pub fn dim(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Lowest eigenvalue, `None` for an empty subspace.
    pub fn lowest(&self) -> Option<f64> {
        self.eigenvalues.first().copied()
    }

    pub(crate) fn shift(&mut self, e0: f64) {
        for e in &mut self.eigenvalues {
            *e -= e0;
        }
    }
}

/// Matrix of `h` in the basis of `subspace`, column-major.
///
/// Column `j` is `h` applied to the basis vector `e_j`.
pub(crate) fn block_matrix(h: &FockOperator, subspace: &Subspace) -> Result<Vec<f64>> {
    let n = subspace.dim();
    let mut data = vec![0.0; n * n];
    for j in 0..n {
        let ej: State<f64> = State::basis(subspace, j, StateLayout::dense())?;
        let col = h.apply(&ej)?;
        for (i, v) in col.iter() {
            data[j * n + i] = v;
        }
    }
    Ok(data)
}

/// Diagonalize `h` on `subspace`. Eigenvalues are not shifted yet.
pub(crate) fn diagonalize(h: &FockOperator, subspace: &Subspace) -> Result<Eigensystem> {
    let n = subspace.dim();
    let data = block_matrix(h, subspace)?;
    let mat = MatRef::from_column_major_slice(&data, n, n);

    let evd = mat
        .self_adjoint_eigen(faer::Side::Lower)
        .map_err(|e: EvdError| CoreError::EigenError {
            subspace: subspace.id(),
            message: format!("{:?}", e),
        })?;

    let s = evd.S();
    let u = evd.U();

    // faer returns nondecreasing eigenvalues; sort anyway so the order is
    // a property of this module.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| s[a].total_cmp(&s[b]));

    let eigenvalues = order.iter().map(|&k| s[k]).collect();
    let unitary = Mat::from_fn(n, n, |i, j| u[(i, order[j])]);
    let eigenstates = order
        .iter()
        .map(|&k| State::from_dense(subspace, (0..n).map(|i| u[(i, k)]).collect()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Eigensystem {
        eigenvalues,
        eigenstates,
        unitary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hilbert::{FundamentalOperatorSet, SubspaceRegistry};
    use crate::operator::{c, c_dag, n};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn test_block_matrix_hopping() {
        let fops = FundamentalOperatorSet::from_labels([0, 1]).unwrap();
        let reg = Arc::new(SubspaceRegistry::from_bases(
            vec![vec![0b01, 0b10]],
            StateLayout::default(),
        ));
        let h = -(c_dag(0) * c(1) + c_dag(1) * c(0));
        let h = FockOperator::new(&h, &fops, reg.clone()).unwrap();
        let m = block_matrix(&h, reg.get(0).unwrap()).unwrap();
        assert_eq!(m, vec![0.0, -1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_diagonalize_two_level() {
        let fops = FundamentalOperatorSet::from_labels([0, 1]).unwrap();
        let reg = Arc::new(SubspaceRegistry::from_bases(
            vec![vec![0b01, 0b10]],
            StateLayout::default(),
        ));
        let h = 0.5 * n(0) - (c_dag(0) * c(1) + c_dag(1) * c(0));
        let h = FockOperator::new(&h, &fops, reg.clone()).unwrap();
        let es = diagonalize(&h, reg.get(0).unwrap()).unwrap();

        let root = (0.25f64 * 0.25 + 1.0).sqrt();
        assert_relative_eq!(es.eigenvalues[0], 0.25 - root, epsilon = 1e-12);
        assert_relative_eq!(es.eigenvalues[1], 0.25 + root, epsilon = 1e-12);
        for (k, v) in es.eigenstates.iter().enumerate() {
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
            let hv = h.apply(v).unwrap();
            for i in 0..2 {
                assert_relative_eq!(hv.amplitude(i), es.eigenvalues[k] * v.amplitude(i), epsilon = 1e-12);
                assert_relative_eq!(es.unitary[(i, k)], v.amplitude(i), epsilon = 1e-15);
            }
        }
    }
}
