//! Scalar trait for state amplitudes.

use faer_traits::ComplexField;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

pub use faer::c64;

/// Trait for amplitude types supported by Fock states.
///
/// This wraps faer's `ComplexField` with a real type fixed to `f64`:
/// operator coefficients are always real while amplitudes may be real or
/// complex. Conjugation, modulus and inversion come from
/// `faer_traits::math_utils`.
pub trait Scalar:
    ComplexField<Real = f64>
    + Copy
    + Debug
    + Default
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + 'static
{
    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;
}

impl Scalar for f64 {
    fn one() -> Self {
        1.0
    }
}

impl Scalar for c64 {
    fn one() -> Self {
        c64::new(1.0, 0.0)
    }
}
