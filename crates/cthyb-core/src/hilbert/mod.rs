//! Mode index and invariant subspaces of the Fock space.
//!
//! ```text
//! FundamentalOperatorSet   labels  → bit position
//! BlockStructure           (block, inner) → bit position
//! Subspace                 ordered basis masks + reverse lookup
//! SubspaceRegistry         arena of subspaces addressed by id
//! ```

mod fundamental;
mod subspace;

pub use fundamental::{
    BlockDesc, BlockStructure, FundamentalOperatorSet, IndexLabel, Indices, IntoIndices, MAX_MODES,
};
pub use subspace::{
    DEFAULT_DENSE_THRESHOLD, DEFAULT_PRUNE_TOLERANCE, FockState, StateLayout, Subspace, SubspaceId,
    SubspaceRegistry, format_fock_state, parity,
};
