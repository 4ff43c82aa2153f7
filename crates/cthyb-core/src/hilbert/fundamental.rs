//! Mode labels and the mode index.
//!
//! A mode is identified by a short sequence of labels such as `("up", 0)`.
//! The [`FundamentalOperatorSet`] assigns each mode a bit position in
//! insertion order; a [`BlockStructure`] groups modes into named blocks
//! for bookkeeping (hybridization blocks, Green's function blocks).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{CoreError, Result};

/// Maximum number of modes: one bit of a `u64` per mode.
pub const MAX_MODES: usize = 64;

/// A single label of a mode: an integer or a name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexLabel {
    Int(i64),
    Name(String),
}

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLabel::Int(i) => write!(f, "{}", i),
            IndexLabel::Name(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for IndexLabel {
    fn from(i: i64) -> Self {
        IndexLabel::Int(i)
    }
}

impl From<i32> for IndexLabel {
    fn from(i: i32) -> Self {
        IndexLabel::Int(i as i64)
    }
}

impl From<usize> for IndexLabel {
    fn from(i: usize) -> Self {
        IndexLabel::Int(i as i64)
    }
}

impl From<&str> for IndexLabel {
    fn from(s: &str) -> Self {
        IndexLabel::Name(s.to_string())
    }
}

impl From<String> for IndexLabel {
    fn from(s: String) -> Self {
        IndexLabel::Name(s)
    }
}

/// Full label of a mode.
///
/// Uses `SmallVec<[IndexLabel; 2]>`: the common `(block, orbital)` pair
/// lives on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Indices(SmallVec<[IndexLabel; 2]>);

impl Indices {
    /// Create indices from a sequence of labels.
    pub fn new<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<IndexLabel>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// The labels as a slice.
    #[inline]
    pub fn labels(&self) -> &[IndexLabel] {
        &self.0
    }
}

impl fmt::Display for Indices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, l) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", l)?;
        }
        write!(f, ")")
    }
}

/// Conversion into [`Indices`], so that `c("up", 0)`, `c(3)` and
/// `c(indices)` all work.
pub trait IntoIndices {
    fn into_indices(self) -> Indices;
}

impl IntoIndices for Indices {
    fn into_indices(self) -> Indices {
        self
    }
}

impl IntoIndices for &Indices {
    fn into_indices(self) -> Indices {
        self.clone()
    }
}

macro_rules! impl_into_indices_single {
    ($($t:ty),*) => {
        $(impl IntoIndices for $t {
            fn into_indices(self) -> Indices {
                Indices::new([IndexLabel::from(self)])
            }
        })*
    };
}

impl_into_indices_single!(i64, i32, usize, &str, String);

impl<A: Into<IndexLabel>, B: Into<IndexLabel>> IntoIndices for (A, B) {
    fn into_indices(self) -> Indices {
        Indices(SmallVec::from_iter([self.0.into(), self.1.into()]))
    }
}

/// Bijection between mode labels and bit positions `0..64`.
///
/// # Example
///
/// ```
/// use cthyb_core::hilbert::FundamentalOperatorSet;
///
/// let mut fops = FundamentalOperatorSet::new();
/// fops.insert(("up", 0)).unwrap();
/// fops.insert(("down", 0)).unwrap();
/// assert_eq!(fops.len(), 2);
/// assert_eq!(fops.position(("down", 0)).unwrap(), 1);
/// assert_eq!(fops.dimension(), 4);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FundamentalOperatorSet {
    modes: Vec<Indices>,
    #[serde(skip)]
    lookup: HashMap<Indices, usize>,
}

impl FundamentalOperatorSet {
    /// Create an empty mode index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode index with one mode per entry of `labels`, in order.
    pub fn from_labels<I, T>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoIndices,
    {
        let mut fops = Self::new();
        for l in labels {
            fops.insert(l)?;
        }
        Ok(fops)
    }

    /// Register a mode, returning its bit position.
    pub fn insert(&mut self, indices: impl IntoIndices) -> Result<usize> {
        let indices = indices.into_indices();
        if self.lookup.contains_key(&indices) {
            return Err(CoreError::DuplicateMode {
                label: indices.to_string(),
            });
        }
        if self.modes.len() == MAX_MODES {
            return Err(CoreError::TooManyModes {
                count: MAX_MODES + 1,
                max: MAX_MODES,
            });
        }
        let pos = self.modes.len();
        self.lookup.insert(indices.clone(), pos);
        self.modes.push(indices);
        Ok(pos)
    }

    /// Bit position of a mode.
    pub fn position(&self, indices: impl IntoIndices) -> Result<usize> {
        let indices = indices.into_indices();
        self.position_of(&indices)
    }

    /// Bit position of a mode given by reference.
    pub fn position_of(&self, indices: &Indices) -> Result<usize> {
        match self.lookup.get(indices) {
            Some(&p) => Ok(p),
            // The lookup is not serialized; fall back to a scan after deserialization.
            None => self
                .modes
                .iter()
                .position(|m| m == indices)
                .ok_or_else(|| CoreError::UnknownMode {
                    label: indices.to_string(),
                }),
        }
    }

    /// Labels of the mode at bit position `pos`.
    pub fn indices(&self, pos: usize) -> Option<&Indices> {
        self.modes.get(pos)
    }

    /// Number of modes.
    #[inline]
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Dimension of the full Fock space, `2^len`. Saturates at `usize::MAX`.
    pub fn dimension(&self) -> usize {
        1usize.checked_shl(self.modes.len() as u32).unwrap_or(usize::MAX)
    }

    /// Iterate `(bit position, labels)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Indices)> {
        self.modes.iter().enumerate()
    }
}

/// A named group of modes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDesc {
    pub name: String,
    pub indices: Vec<Indices>,
}

impl BlockDesc {
    pub fn new<I, T>(name: impl Into<String>, indices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIndices,
    {
        Self {
            name: name.into(),
            indices: indices.into_iter().map(IntoIndices::into_indices).collect(),
        }
    }

    /// Number of modes in the block.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Grouping of modes into named blocks, resolved against a mode index.
///
/// Maps `(block_index, inner_index)` to the mode bit position.
#[derive(Clone, Debug, Default)]
pub struct BlockStructure {
    blocks: Vec<BlockDesc>,
    positions: Vec<Vec<usize>>,
}

impl BlockStructure {
    /// Resolve block descriptions against `fops`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownMode` if a block lists a mode absent from `fops`.
    pub fn new(blocks: Vec<BlockDesc>, fops: &FundamentalOperatorSet) -> Result<Self> {
        let positions = blocks
            .iter()
            .map(|b| b.indices.iter().map(|i| fops.position_of(i)).collect())
            .collect::<Result<Vec<Vec<usize>>>>()?;
        Ok(Self { blocks, positions })
    }

    /// One block per mode, named after the mode.
    pub fn one_block_per_mode(fops: &FundamentalOperatorSet) -> Self {
        let blocks = fops
            .iter()
            .map(|(_, ind)| BlockDesc {
                name: ind.to_string(),
                indices: vec![ind.clone()],
            })
            .collect();
        let positions = (0..fops.len()).map(|p| vec![p]).collect();
        Self { blocks, positions }
    }

    /// Number of blocks.
    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Block descriptions.
    pub fn blocks(&self) -> &[BlockDesc] {
        &self.blocks
    }

    /// Bit position of mode `inner` of block `block`.
    pub fn mode(&self, block: usize, inner: usize) -> Result<usize> {
        self.positions
            .get(block)
            .and_then(|b| b.get(inner))
            .copied()
            .ok_or(CoreError::UnknownBlockIndex { block, inner })
    }

    /// Size of each block.
    pub fn block_sizes(&self) -> Vec<usize> {
        self.positions.iter().map(Vec::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut fops = FundamentalOperatorSet::new();
        for i in 0..2 {
            fops.insert(("up", i)).unwrap();
        }
        for i in 0..2 {
            fops.insert(("down", i)).unwrap();
        }
        assert_eq!(fops.len(), 4);
        assert_eq!(fops.dimension(), 16);
        assert_eq!(fops.position(("down", 0)).unwrap(), 2);
        assert_eq!(fops.indices(3).unwrap().to_string(), "(down,1)");
    }

    #[test]
    fn test_duplicate_mode() {
        let mut fops = FundamentalOperatorSet::new();
        fops.insert(0).unwrap();
        assert!(matches!(fops.insert(0), Err(CoreError::DuplicateMode { .. })));
    }

    #[test]
    fn test_unknown_mode() {
        let fops = FundamentalOperatorSet::from_labels([0, 1]).unwrap();
        assert!(matches!(fops.position(5), Err(CoreError::UnknownMode { .. })));
    }

    #[test]
    fn test_too_many_modes() {
        let mut fops = FundamentalOperatorSet::from_labels(0..64_i64).unwrap();
        assert_eq!(fops.len(), MAX_MODES);
        assert!(matches!(
            fops.insert(64),
            Err(CoreError::TooManyModes { max: 64, .. })
        ));
    }

    #[test]
    fn test_block_structure() {
        let fops = FundamentalOperatorSet::from_labels([("up", 0), ("down", 0), ("up", 1)]).unwrap();
        let bs = BlockStructure::new(
            vec![
                BlockDesc::new("up", [("up", 0), ("up", 1)]),
                BlockDesc::new("down", [("down", 0)]),
            ],
            &fops,
        )
        .unwrap();
        assert_eq!(bs.n_blocks(), 2);
        assert_eq!(bs.mode(0, 1).unwrap(), 2);
        assert_eq!(bs.mode(1, 0).unwrap(), 1);
        assert_eq!(bs.block_sizes(), vec![2, 1]);
        assert!(matches!(
            bs.mode(1, 1),
            Err(CoreError::UnknownBlockIndex { block: 1, inner: 1 })
        ));
    }

    #[test]
    fn test_block_structure_unknown_mode() {
        let fops = FundamentalOperatorSet::from_labels([0]).unwrap();
        let r = BlockStructure::new(vec![BlockDesc::new("b", [1])], &fops);
        assert!(matches!(r, Err(CoreError::UnknownMode { .. })));
    }
}
