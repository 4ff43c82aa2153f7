//! Global fermionic sign of a configuration.
//!
//! The time-ordered product is traversed right to left (increasing time).
//! Pass 1 counts the transpositions that sort the traversal into
//! contiguous runs of increasing block index, each run holding its
//! annihilators before its creators. Pass 2 adds `n(n+1)/2` per block of
//! determinant size `n`, which brings each run into the alternating order
//! of the hybridization determinant.

use std::fmt;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::configuration::{Configuration, OpDesc};

/// `+1` or `-1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    /// `Minus` for an odd count.
    pub fn from_parity(odd: bool) -> Self {
        if odd { Sign::Minus } else { Sign::Plus }
    }

    pub fn value(self) -> i32 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.value())
    }

    pub fn flip(self) -> Self {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        Sign::from_parity(self != rhs)
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Plus => write!(f, "+1"),
            Sign::Minus => write!(f, "-1"),
        }
    }
}

/// Result of [`SignTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignUpdate {
    pub current: Sign,
    pub previous: Sign,
}

impl SignUpdate {
    /// `current / previous`.
    pub fn ratio(self) -> Sign {
        self.current * self.previous
    }
}

/// Number of transpositions that bring `ops` (traversal order) into
/// block-grouped order, plus the determinant reordering per block.
pub fn flip_count<'a, I>(ops: I, det_sizes: &[usize]) -> usize
where
    I: IntoIterator<Item = &'a OpDesc>,
{
    let mut n_ops = vec![0usize; det_sizes.len()];
    let mut n_created = vec![0usize; det_sizes.len()];
    let mut flips = 0usize;

    for op in ops {
        let b = op.block_index;
        if b >= n_ops.len() {
            n_ops.resize(b + 1, 0);
            n_created.resize(b + 1, 0);
        }
        flips += n_ops[b + 1..].iter().sum::<usize>();
        n_ops[b] += 1;
        if op.dagger {
            n_created[b] += 1;
        } else {
            flips += n_created[b];
        }
    }

    for &n in det_sizes {
        flips += n * (n + 1) / 2;
    }
    flips
}

/// Running configuration sign with the value before the last update.
///
/// # Example
///
/// ```
/// use cthyb_core::sign::{OpDesc, Sign, SignTracker};
///
/// let mut tracker = SignTracker::new();
/// let ops = [OpDesc::annihilation(0, 0, 0), OpDesc::creation(0, 0, 0)];
/// let upd = tracker.update(&ops, &[1]);
/// assert_eq!(upd.current, Sign::Minus);
/// assert_eq!(upd.previous, Sign::Plus);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTracker {
    current: Sign,
    previous: Sign,
}

impl SignTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> Sign {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> Sign {
        self.previous
    }

    /// Recompute the sign from `ops` in traversal order and the current
    /// determinant size of every block.
    pub fn update<'a, I>(&mut self, ops: I, det_sizes: &[usize]) -> SignUpdate
    where
        I: IntoIterator<Item = &'a OpDesc>,
    {
        self.previous = self.current;
        self.current = Sign::from_parity(flip_count(ops, det_sizes) % 2 == 1);
        log::trace!("sign update: {} -> {}", self.previous, self.current);
        SignUpdate {
            current: self.current,
            previous: self.previous,
        }
    }

    /// [`update`](Self::update) over a configuration's operators.
    pub fn update_from(&mut self, config: &Configuration, det_sizes: &[usize]) -> SignUpdate {
        self.update(config.ops(), det_sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_algebra() {
        assert_eq!(Sign::Minus * Sign::Minus, Sign::Plus);
        assert_eq!(Sign::Plus * Sign::Minus, Sign::Minus);
        assert_eq!(Sign::Minus.flip(), Sign::Plus);
        assert_eq!(Sign::Minus.as_f64(), -1.0);
        assert_eq!(Sign::Minus.to_string(), "-1");
    }

    #[test]
    fn test_empty_is_plus() {
        let none: [OpDesc; 0] = [];
        let mut t = SignTracker::new();
        assert_eq!(t.update(&none, &[]).current, Sign::Plus);
        assert_eq!(t.update(&none, &[0, 0, 0]).current, Sign::Plus);
    }

    #[test]
    fn test_single_pair() {
        let mut t = SignTracker::new();
        let pair = [OpDesc::creation(0, 0, 0), OpDesc::annihilation(0, 0, 0)];
        // one block flip plus 1*2/2
        assert_eq!(flip_count(&pair, &[1]), 2);
        assert_eq!(t.update(&pair, &[1]).current, Sign::Plus);
    }

    #[test]
    fn test_interleaved_blocks() {
        let ops = [
            OpDesc::creation(0, 0, 0),
            OpDesc::creation(1, 0, 1),
            OpDesc::annihilation(0, 0, 0),
            OpDesc::annihilation(1, 0, 1),
        ];
        // c0: 1 higher-block op + 1 creation in block 0; c1: 1 creation in block 1
        assert_eq!(flip_count(&ops, &[1, 1]), 5);
        let mut t = SignTracker::new();
        let upd = t.update(&ops, &[1, 1]);
        assert_eq!(upd.current, Sign::Minus);
        assert_eq!(upd.ratio(), Sign::Minus);
    }

    #[test]
    fn test_block_index_beyond_det_sizes() {
        let ops = [OpDesc::creation(3, 0, 0), OpDesc::annihilation(0, 0, 1)];
        assert_eq!(flip_count(&ops, &[]), 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut t = SignTracker::new();
        t.update(&[OpDesc::annihilation(0, 0, 0), OpDesc::creation(0, 0, 0)], &[1]);
        let json = serde_json::to_string(&t).unwrap();
        let back: SignTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.current(), Sign::Minus);
    }
}
