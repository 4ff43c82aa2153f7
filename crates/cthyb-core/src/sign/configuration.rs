//! Time-ordered operator configurations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A configuration operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpDesc {
    /// Hybridization block.
    pub block_index: usize,
    /// Position inside the block.
    pub inner_index: usize,
    /// Creation operator if `true`.
    pub dagger: bool,
    /// Mode bit position.
    pub mode: usize,
}

impl OpDesc {
    pub fn creation(block_index: usize, inner_index: usize, mode: usize) -> Self {
        Self {
            block_index,
            inner_index,
            dagger: true,
            mode,
        }
    }

    pub fn annihilation(block_index: usize, inner_index: usize, mode: usize) -> Self {
        Self {
            block_index,
            inner_index,
            dagger: false,
            mode,
        }
    }
}

/// Imaginary time on a fixed integer grid over `[0, β]`.
///
/// Integer ticks keep the ordering exact; two operators can never compare
/// equal by rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimePoint(u64);

impl TimePoint {
    /// Ticks representing `β`.
    pub const TICKS: u64 = 1 << 52;

    pub fn new(ticks: u64) -> Self {
        Self(ticks.min(Self::TICKS))
    }

    /// Nearest grid point to `tau`, clamped to `[0, beta]`.
    pub fn from_tau(tau: f64, beta: f64) -> Self {
        let x = (tau / beta).clamp(0.0, 1.0);
        Self((x * Self::TICKS as f64).round() as u64)
    }

    pub fn to_tau(self, beta: f64) -> f64 {
        self.0 as f64 / Self::TICKS as f64 * beta
    }

    #[inline]
    pub fn ticks(self) -> u64 {
        self.0
    }
}

/// Operators of one Monte Carlo configuration keyed by time.
///
/// [`Configuration::iter`] walks increasing time, which is right to left in
/// the time-ordered product `O(τ_n) … O(τ_1)`. This is the traversal order
/// the sign tracker expects.
///
/// # Example
///
/// ```
/// use cthyb_core::sign::{Configuration, OpDesc, TimePoint};
///
/// let mut config = Configuration::new(10.0);
/// config.insert(TimePoint::from_tau(1.0, 10.0), OpDesc::creation(0, 0, 0)).unwrap();
/// config.insert(TimePoint::from_tau(4.0, 10.0), OpDesc::annihilation(0, 0, 0)).unwrap();
/// assert!(config.insert(TimePoint::from_tau(4.0, 10.0), OpDesc::creation(0, 0, 0)).is_err());
/// let daggers: Vec<bool> = config.iter().map(|(_, op)| op.dagger).collect();
/// assert_eq!(daggers, vec![true, false]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigurationRepr", into = "ConfigurationRepr")]
pub struct Configuration {
    beta: f64,
    ops: BTreeMap<TimePoint, OpDesc>,
}

/// Serialized form: maps with struct keys do not survive JSON.
#[derive(Serialize, Deserialize)]
struct ConfigurationRepr {
    beta: f64,
    ops: Vec<(TimePoint, OpDesc)>,
}

impl From<ConfigurationRepr> for Configuration {
    fn from(r: ConfigurationRepr) -> Self {
        Self {
            beta: r.beta,
            ops: r.ops.into_iter().collect(),
        }
    }
}

impl From<Configuration> for ConfigurationRepr {
    fn from(c: Configuration) -> Self {
        Self {
            beta: c.beta,
            ops: c.ops.into_iter().collect(),
        }
    }
}

impl Configuration {
    pub fn new(beta: f64) -> Self {
        Self {
            beta,
            ops: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Insert `op` at time `t`.
    ///
    /// # Errors
    ///
    /// `CoreError::TimeOccupied` if an operator already sits at `t`.
    pub fn insert(&mut self, t: TimePoint, op: OpDesc) -> Result<()> {
        if self.ops.contains_key(&t) {
            return Err(CoreError::TimeOccupied { time: t.ticks() });
        }
        self.ops.insert(t, op);
        Ok(())
    }

    /// Remove and return the operator at `t`.
    pub fn remove(&mut self, t: TimePoint) -> Option<OpDesc> {
        self.ops.remove(&t)
    }

    pub fn get(&self, t: TimePoint) -> Option<&OpDesc> {
        self.ops.get(&t)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Operators in increasing time.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (TimePoint, &OpDesc)> {
        self.ops.iter().map(|(&t, op)| (t, op))
    }

    /// Operators in increasing time, without their times.
    pub fn ops(&self) -> impl DoubleEndedIterator<Item = &OpDesc> {
        self.ops.values()
    }

    /// Number of operators in block `block`.
    pub fn count_in_block(&self, block: usize) -> usize {
        self.ops.values().filter(|op| op.block_index == block).count()
    }
}
