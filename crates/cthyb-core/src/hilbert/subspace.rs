//! Invariant subspaces and the registry that owns them.
//!
//! A [`Subspace`] is an ordered list of basis masks with a reverse lookup.
//! Subspaces are built once, stored by value in a [`SubspaceRegistry`] and
//! referenced everywhere else by their [`SubspaceId`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Occupation-number basis state: bit `i` set means mode `i` is occupied.
pub type FockState = u64;

/// Stable index of a subspace inside its registry.
pub type SubspaceId = usize;

/// Parity (mod 2 population count) of a mask.
#[inline]
pub fn parity(mask: FockState) -> bool {
    mask.count_ones() % 2 == 1
}

/// Render the lowest `n_modes` bits of a fock state, mode 0 rightmost.
pub fn format_fock_state(f: FockState, n_modes: usize) -> String {
    (0..n_modes)
        .rev()
        .map(|i| if (f >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// An invariant subspace of the Fock space.
///
/// # Example
///
/// ```
/// use cthyb_core::hilbert::Subspace;
///
/// let sp = Subspace::new(0, vec![0b00, 0b01]);
/// assert_eq!(sp.dim(), 2);
/// assert_eq!(sp.local_index(0b01), Some(1));
/// assert_eq!(sp.local_index(0b10), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subspace {
    id: SubspaceId,
    fock_states: Vec<FockState>,
    index_of: HashMap<FockState, usize>,
}

impl Subspace {
    /// Create a subspace from its ordered basis.
    ///
    /// Duplicate masks are ignored after their first occurrence.
    pub fn new(id: SubspaceId, fock_states: Vec<FockState>) -> Self {
        let mut index_of = HashMap::with_capacity(fock_states.len());
        let mut basis = Vec::with_capacity(fock_states.len());
        for f in fock_states {
            if let std::collections::hash_map::Entry::Vacant(e) = index_of.entry(f) {
                e.insert(basis.len());
                basis.push(f);
            }
        }
        Self {
            id,
            fock_states: basis,
            index_of,
        }
    }

    /// The full Fock space over `n_modes` modes, masks in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TooManyModes` if `2^n_modes` does not fit the
    /// enumeration limit `max_modes`.
    pub fn full(id: SubspaceId, n_modes: usize, max_modes: usize) -> Result<Self> {
        if n_modes > max_modes || n_modes >= usize::BITS as usize {
            return Err(CoreError::TooManyModes {
                count: n_modes,
                max: max_modes,
            });
        }
        Ok(Self::new(id, (0..1u64 << n_modes).collect()))
    }

    /// Id of this subspace inside its registry.
    #[inline]
    pub fn id(&self) -> SubspaceId {
        self.id
    }

    /// Dimension (number of basis states).
    #[inline]
    pub fn dim(&self) -> usize {
        self.fock_states.len()
    }

    /// Basis masks in local order.
    #[inline]
    pub fn fock_states(&self) -> &[FockState] {
        &self.fock_states
    }

    /// Basis mask at local index `i`.
    #[inline]
    pub fn fock_state(&self, i: usize) -> Option<FockState> {
        self.fock_states.get(i).copied()
    }

    /// Local index of a basis mask, if it belongs to this subspace.
    #[inline]
    pub fn local_index(&self, f: FockState) -> Option<usize> {
        self.index_of.get(&f).copied()
    }

    /// Local index of a basis mask.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::FockStateNotInSubspace` if `f` is not a member.
    #[inline]
    pub fn require_index(&self, f: FockState) -> Result<usize> {
        self.local_index(f).ok_or(CoreError::FockStateNotInSubspace {
            fock_state: f,
            subspace: self.id,
        })
    }

    /// Whether `f` is a member of this subspace.
    #[inline]
    pub fn contains(&self, f: FockState) -> bool {
        self.index_of.contains_key(&f)
    }
}

/// Runtime choice of the state representation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateLayout {
    /// Subspaces with dimension up to this value get dense states.
    pub dense_threshold: usize,
    /// Sparse states drop entries whose magnitude falls below this.
    pub prune_tolerance: f64,
}

/// Default pruning tolerance of sparse states.
pub const DEFAULT_PRUNE_TOLERANCE: f64 = 1e-10;

/// Default dense/sparse threshold on subspace dimension.
pub const DEFAULT_DENSE_THRESHOLD: usize = 64;

impl Default for StateLayout {
    fn default() -> Self {
        Self {
            dense_threshold: DEFAULT_DENSE_THRESHOLD,
            prune_tolerance: DEFAULT_PRUNE_TOLERANCE,
        }
    }
}

impl StateLayout {
    /// Always dense.
    pub fn dense() -> Self {
        Self {
            dense_threshold: usize::MAX,
            ..Self::default()
        }
    }

    /// Always sparse.
    pub fn sparse() -> Self {
        Self {
            dense_threshold: 0,
            ..Self::default()
        }
    }

    /// Whether a subspace of dimension `dim` uses the dense representation.
    #[inline]
    pub fn is_dense(&self, dim: usize) -> bool {
        dim <= self.dense_threshold
    }
}

/// Owning arena of subspaces, addressed by [`SubspaceId`].
#[derive(Clone, Debug, Default)]
pub struct SubspaceRegistry {
    spaces: Vec<Subspace>,
    layout: StateLayout,
}

impl SubspaceRegistry {
    /// Build a registry from lists of basis masks; ids follow list order.
    pub fn from_bases(bases: Vec<Vec<FockState>>, layout: StateLayout) -> Self {
        let spaces = bases
            .into_iter()
            .enumerate()
            .map(|(id, b)| Subspace::new(id, b))
            .collect();
        Self { spaces, layout }
    }

    /// Registry holding only the full Fock space over `n_modes` modes.
    pub fn full(n_modes: usize, max_modes: usize, layout: StateLayout) -> Result<Self> {
        Ok(Self {
            spaces: vec![Subspace::full(0, n_modes, max_modes)?],
            layout,
        })
    }

    /// Number of subspaces.
    #[inline]
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Subspace by id.
    pub fn get(&self, id: SubspaceId) -> Result<&Subspace> {
        self.spaces.get(id).ok_or(CoreError::UnknownSubspace {
            id,
            count: self.spaces.len(),
        })
    }

    /// All subspaces in id order.
    #[inline]
    pub fn spaces(&self) -> &[Subspace] {
        &self.spaces
    }

    /// Representation policy.
    #[inline]
    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    /// Id of the subspace containing `f`, if any.
    pub fn find(&self, f: FockState) -> Option<SubspaceId> {
        self.spaces.iter().position(|s| s.contains(f))
    }
}

impl fmt::Display for Subspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subspace {} (dim {}):", self.id, self.dim())?;
        for fs in &self.fock_states {
            write!(f, " {:#b}", fs)?;
        }
        Ok(())
    }
}
