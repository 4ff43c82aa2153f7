//! Symbolic second-quantized operators.
//!
//! A [`ManyBodyOperator`] is a real linear combination of normal-ordered
//! [`Monomial`]s. Products are normal ordered on the fly with the canonical
//! anticommutation relations
//!
//! ```text
//! {c_i, c†_j} = δ_ij      {c_i, c_j} = {c†_i, c†_j} = 0
//! ```
//!
//! so that every stored monomial reads `c†_a c†_b … c_y c_z` with creators
//! in ascending and annihilators in descending label order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use smallvec::SmallVec;

use crate::hilbert::{Indices, IntoIndices};

/// A single creation (`dagger == true`) or annihilation operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalOp {
    pub dagger: bool,
    pub indices: Indices,
}

impl CanonicalOp {
    /// Hermitian conjugate.
    pub fn conjugate(&self) -> Self {
        Self {
            dagger: !self.dagger,
            indices: self.indices.clone(),
        }
    }
}

impl PartialOrd for CanonicalOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalOp {
    /// Normal order: creators before annihilators, creators ascending,
    /// annihilators descending.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.dagger, other.dagger) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => self.indices.cmp(&other.indices),
            (false, false) => other.indices.cmp(&self.indices),
        }
    }
}

impl fmt::Display for CanonicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.dagger { "c_dag" } else { "c" };
        write!(f, "{}{}", name, self.indices)
    }
}

/// A normal-ordered product of canonical operators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial(SmallVec<[CanonicalOp; 4]>);

impl Monomial {
    /// Operators from left to right.
    #[inline]
    pub fn ops(&self) -> &[CanonicalOp] {
        &self.0
    }

    /// Number of operators (0 for the identity).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "1");
        }
        for op in &self.0 {
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// Bring an arbitrary product of operators to normal order.
///
/// Returns the resulting `(coefficient, monomial)` pairs; contractions
/// `c_i c†_i = 1 - c†_i c_i` spawn extra terms and repeated operators
/// vanish.
fn normal_order(coeff: f64, ops: Vec<CanonicalOp>) -> Vec<(f64, Monomial)> {
    let mut out = Vec::new();
    let mut work = vec![(coeff, ops)];
    while let Some((mut c, mut ops)) = work.pop() {
        loop {
            let pos = (1..ops.len()).find(|&k| ops[k - 1] >= ops[k]);
            let Some(k) = pos else {
                out.push((c, Monomial(ops.into_iter().collect())));
                break;
            };
            if ops[k - 1] == ops[k] {
                break;
            }
            if !ops[k - 1].dagger && ops[k].dagger && ops[k - 1].indices == ops[k].indices {
                let mut contracted = ops.clone();
                contracted.drain(k - 1..=k);
                work.push((c, contracted));
            }
            ops.swap(k - 1, k);
            c = -c;
        }
    }
    out
}

/// Real linear combination of normal-ordered monomials.
///
/// Terms are kept in a `BTreeMap`, so iteration order is deterministic and
/// equal monomials merge.
///
/// # Example
///
/// ```
/// use cthyb_core::operator::{c, c_dag, n};
///
/// // c c† = 1 - c† c
/// let a = c(0) * c_dag(0);
/// let b = 1.0 - n(0);
/// assert_eq!(a, b);
///
/// let h = 2.0 * n(0) * n(1);
/// assert_eq!(h.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManyBodyOperator {
    terms: BTreeMap<Monomial, f64>,
}

impl ManyBodyOperator {
    /// The zero operator.
    pub fn zero() -> Self {
        Self::default()
    }

    /// `x` times the identity.
    pub fn scalar(x: f64) -> Self {
        let mut op = Self::zero();
        op.add_term(Monomial::default(), x);
        op
    }

    /// Product of the given operators, normal ordered.
    pub fn product(coeff: f64, ops: Vec<CanonicalOp>) -> Self {
        let mut op = Self::zero();
        for (c, m) in normal_order(coeff, ops) {
            op.add_term(m, c);
        }
        op
    }

    fn add_term(&mut self, m: Monomial, c: f64) {
        match self.terms.entry(m) {
            Entry::Vacant(e) => {
                if c != 0.0 {
                    e.insert(c);
                }
            }
            Entry::Occupied(mut e) => {
                *e.get_mut() += c;
                if *e.get() == 0.0 {
                    e.remove();
                }
            }
        }
    }

    /// Number of monomials.
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether this is the zero operator.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }

    /// Iterate `(monomial, coefficient)` in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&Monomial, f64)> {
        self.terms.iter().map(|(m, &c)| (m, c))
    }

    /// Hermitian conjugate.
    pub fn dagger(&self) -> Self {
        let mut out = Self::zero();
        for (m, &c) in &self.terms {
            let ops = m.ops().iter().rev().map(CanonicalOp::conjugate).collect();
            out += Self::product(c, ops);
        }
        out
    }
}

/// Annihilation operator on mode `indices`.
pub fn c(indices: impl IntoIndices) -> ManyBodyOperator {
    ManyBodyOperator::product(
        1.0,
        vec![CanonicalOp {
            dagger: false,
            indices: indices.into_indices(),
        }],
    )
}

/// Creation operator on mode `indices`.
pub fn c_dag(indices: impl IntoIndices) -> ManyBodyOperator {
    ManyBodyOperator::product(
        1.0,
        vec![CanonicalOp {
            dagger: true,
            indices: indices.into_indices(),
        }],
    )
}

/// Number operator `c† c` on mode `indices`.
pub fn n(indices: impl IntoIndices) -> ManyBodyOperator {
    let ind = indices.into_indices();
    ManyBodyOperator::product(
        1.0,
        vec![
            CanonicalOp {
                dagger: true,
                indices: ind.clone(),
            },
            CanonicalOp {
                dagger: false,
                indices: ind,
            },
        ],
    )
}

impl AddAssign<&ManyBodyOperator> for ManyBodyOperator {
    fn add_assign(&mut self, rhs: &ManyBodyOperator) {
        for (m, &c) in &rhs.terms {
            self.add_term(m.clone(), c);
        }
    }
}

impl AddAssign for ManyBodyOperator {
    fn add_assign(&mut self, rhs: ManyBodyOperator) {
        *self += &rhs;
    }
}

impl SubAssign<&ManyBodyOperator> for ManyBodyOperator {
    fn sub_assign(&mut self, rhs: &ManyBodyOperator) {
        for (m, &c) in &rhs.terms {
            self.add_term(m.clone(), -c);
        }
    }
}

impl SubAssign for ManyBodyOperator {
    fn sub_assign(&mut self, rhs: ManyBodyOperator) {
        *self -= &rhs;
    }
}

impl Add for ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn add(mut self, rhs: ManyBodyOperator) -> ManyBodyOperator {
        self += &rhs;
        self
    }
}

impl Sub for ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn sub(mut self, rhs: ManyBodyOperator) -> ManyBodyOperator {
        self -= &rhs;
        self
    }
}

impl Neg for ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn neg(mut self) -> ManyBodyOperator {
        for c in self.terms.values_mut() {
            *c = -*c;
        }
        self
    }
}

impl Mul<&ManyBodyOperator> for &ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn mul(self, rhs: &ManyBodyOperator) -> ManyBodyOperator {
        let mut out = ManyBodyOperator::zero();
        for (m1, &c1) in &self.terms {
            for (m2, &c2) in &rhs.terms {
                let ops: Vec<CanonicalOp> = m1.ops().iter().chain(m2.ops()).cloned().collect();
                for (c, m) in normal_order(c1 * c2, ops) {
                    out.add_term(m, c);
                }
            }
        }
        out
    }
}

impl Mul for ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn mul(self, rhs: ManyBodyOperator) -> ManyBodyOperator {
        &self * &rhs
    }
}

impl Mul<f64> for ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn mul(mut self, x: f64) -> ManyBodyOperator {
        if x == 0.0 {
            return ManyBodyOperator::zero();
        }
        for c in self.terms.values_mut() {
            *c *= x;
        }
        self
    }
}

impl Mul<ManyBodyOperator> for f64 {
    type Output = ManyBodyOperator;

    fn mul(self, op: ManyBodyOperator) -> ManyBodyOperator {
        op * self
    }
}

impl Add<f64> for ManyBodyOperator {
    type Output = ManyBodyOperator;

    fn add(self, x: f64) -> ManyBodyOperator {
        self + ManyBodyOperator::scalar(x)
    }
}

impl Add<ManyBodyOperator> for f64 {
    type Output = ManyBodyOperator;

    fn add(self, op: ManyBodyOperator) -> ManyBodyOperator {
        ManyBodyOperator::scalar(self) + op
    }
}

impl Sub<ManyBodyOperator> for f64 {
    type Output = ManyBodyOperator;

    fn sub(self, op: ManyBodyOperator) -> ManyBodyOperator {
        ManyBodyOperator::scalar(self) - op
    }
}

impl fmt::Display for ManyBodyOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (m, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}*{}", c, m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anticommutator() {
        // {c_0, c†_0} = 1
        let ac = c(0) * c_dag(0) + c_dag(0) * c(0);
        assert_eq!(ac, ManyBodyOperator::scalar(1.0));
        // {c_0, c†_1} = 0
        let ac = c(0) * c_dag(1) + c_dag(1) * c(0);
        assert!(ac.is_zero());
    }

    #[test]
    fn test_nilpotent() {
        assert!((c(2) * c(2)).is_zero());
        assert!((c_dag(2) * c_dag(2)).is_zero());
        assert!((n(1) * c_dag(1) * c_dag(1)).is_zero());
    }

    #[test]
    fn test_number_operator_idempotent() {
        assert_eq!(n(("up", 0)) * n(("up", 0)), n(("up", 0)));
    }

    #[test]
    fn test_normal_order_sign() {
        // c_0 c_1 = -c_1 c_0; normal order keeps annihilators descending: c_1 c_0
        let op = c(0) * c(1);
        assert_eq!(op.len(), 1);
        let (m, coeff) = op.iter().next().unwrap();
        assert_eq!(coeff, -1.0);
        assert_eq!(m.to_string(), "c(1)c(0)");
    }

    #[test]
    fn test_dagger() {
        let hop = c_dag(0) * c(1);
        assert_eq!(hop.dagger(), c_dag(1) * c(0));
        let h = 2.0 * n(0) * n(1) - 0.5 * (c_dag(0) * c(1) + c_dag(1) * c(0));
        assert_eq!(h.dagger(), h);
    }

    #[test]
    fn test_scalar_cancellation() {
        let op = n(0) + 1.0 - n(0) - 1.0;
        assert!(op.is_zero());
        assert_eq!(op.to_string(), "0");
    }

    #[test]
    fn test_display() {
        let op = 2.0 * c_dag(("up", 0)) * c(("up", 1));
        assert_eq!(op.to_string(), "2*c_dag(up,0)c(up,1)");
    }
}
