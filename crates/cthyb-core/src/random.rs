//! Random state construction.
//!
//! Random states seed Krylov iterations and drive the randomized
//! consistency checks between the sparse and dense representations.

use faer_traits::math_utils::{abs2, from_f64};
use rand::Rng;
use rand::distr::StandardUniform;
use rand_distr::StandardNormal;

use crate::hilbert::{StateLayout, Subspace};
use crate::scalar::{Scalar, c64};
use crate::state::State;

/// Amplitude types that can be drawn at random.
pub trait RandomAmplitude: Scalar {
    /// Uniform in [0, 1) (each component for complex types).
    fn uniform<R: Rng>(rng: &mut R) -> Self;

    /// Standard normal, with `E|z|^2 = 1`.
    fn normal<R: Rng>(rng: &mut R) -> Self;
}

impl RandomAmplitude for f64 {
    fn uniform<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }

    fn normal<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl RandomAmplitude for c64 {
    fn uniform<R: Rng>(rng: &mut R) -> Self {
        c64::new(rng.sample(StandardUniform), rng.sample(StandardUniform))
    }

    fn normal<R: Rng>(rng: &mut R) -> Self {
        let scale = std::f64::consts::FRAC_1_SQRT_2;
        c64::new(
            rng.sample::<f64, _>(StandardNormal) * scale,
            rng.sample::<f64, _>(StandardNormal) * scale,
        )
    }
}

impl<ElT: RandomAmplitude> State<ElT> {
    /// State in `subspace` with every amplitude uniform in [0, 1).
    pub fn random(subspace: &Subspace, layout: StateLayout) -> Self {
        Self::random_with_rng(subspace, layout, &mut rand::rng())
    }

    /// Uniform random state using a specific RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use cthyb_core::hilbert::{StateLayout, Subspace};
    /// use cthyb_core::state::State;
    ///
    /// let sp = Subspace::new(0, vec![1, 2, 4]);
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let s: State<f64> = State::random_with_rng(&sp, StateLayout::dense(), &mut rng);
    /// assert_eq!(s.dim(), 3);
    /// ```
    pub fn random_with_rng<R: Rng>(subspace: &Subspace, layout: StateLayout, rng: &mut R) -> Self {
        Self::from_fn(subspace, layout, |_| ElT::uniform(rng))
    }

    /// Normalized state with Gaussian amplitudes, using a specific RNG.
    pub fn randn_with_rng<R: Rng>(subspace: &Subspace, layout: StateLayout, rng: &mut R) -> Self {
        let values: Vec<ElT> = (0..subspace.dim()).map(|_| ElT::normal(rng)).collect();
        let n = values.iter().map(|v| abs2(v)).sum::<f64>().sqrt();
        let inv: ElT = from_f64(if n > 0.0 { 1.0 / n } else { 1.0 });
        Self::from_fn(subspace, layout, |i| values[i] * inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_reproducible() {
        let sp = Subspace::new(0, (0..10).collect());
        let a: State<f64> =
            State::random_with_rng(&sp, StateLayout::sparse(), &mut StdRng::seed_from_u64(7));
        let b: State<f64> =
            State::random_with_rng(&sp, StateLayout::sparse(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        for (_, v) in a.iter() {
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_randn_normalized() {
        let sp = Subspace::new(2, (0..16).collect());
        let mut rng = StdRng::seed_from_u64(11);
        let s: State<c64> = State::randn_with_rng(&sp, StateLayout::dense(), &mut rng);
        assert!((s.norm() - 1.0).abs() < 1e-12);
        assert_eq!(s.subspace_id(), Some(2));
    }

    #[test]
    fn test_randn_sparse_matches_dense() {
        let sp = Subspace::new(1, (0..12).collect());
        let s: State<f64> =
            State::randn_with_rng(&sp, StateLayout::sparse(), &mut StdRng::seed_from_u64(3));
        let d: State<f64> =
            State::randn_with_rng(&sp, StateLayout::dense(), &mut StdRng::seed_from_u64(3));
        assert!(!s.is_dense());
        assert!(d.is_dense());
        assert!((s.norm() - 1.0).abs() < 1e-12);
        for i in 0..sp.dim() {
            assert_eq!(s.amplitude(i), d.amplitude(i));
        }
    }
}
