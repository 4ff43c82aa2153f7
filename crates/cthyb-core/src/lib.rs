//! cthyb-core - algebraic core of a hybridization-expansion impurity solver
//!
//! This crate provides the Fock-space machinery that the trace and Monte
//! Carlo layers of a CT-HYB solver are built on.
//!
//! # Architecture
//!
//! ```text
//! hilbert    mode index, block structure, subspaces and their registry
//! state      Fock state vectors (sparse or dense, chosen per subspace)
//! operator   symbolic operators → bitmask terms → action on states
//! partition  invariant subspaces, per-block spectra, connectivity
//! sign       configurations and the global fermionic sign
//! ```
//!
//! # Example
//!
//! ```
//! use cthyb_core::hilbert::{BlockStructure, FundamentalOperatorSet};
//! use cthyb_core::operator::n;
//! use cthyb_core::partition::{OperatorId, SpacePartition};
//!
//! let fops = FundamentalOperatorSet::from_labels([("up", 0), ("dn", 0)]).unwrap();
//! let blocks = BlockStructure::one_block_per_mode(&fops);
//! let h = 2.0 * n(("up", 0)) * n(("dn", 0)) - 1.0 * (n(("up", 0)) + n(("dn", 0)));
//! let qns = [n(("up", 0)), n(("dn", 0))];
//!
//! let sp = SpacePartition::with_quantum_numbers(&h, &qns, &fops, blocks).unwrap();
//! assert_eq!(sp.n_subspaces(), 4);
//!
//! // c†_up takes the vacuum to the singly occupied block
//! let vacuum = sp.registry().find(0b00).unwrap();
//! let up = sp.registry().find(0b01).unwrap();
//! assert_eq!(sp.connect(OperatorId::new(true, 0), vacuum).unwrap(), Some(up));
//! ```

pub mod error;
pub mod hilbert;
pub mod operator;
pub mod partition;
pub mod random;
pub mod scalar;
pub mod sign;
pub mod state;

pub use error::{CoreError, ErrorKind, Result};
pub use hilbert::{FockState, FundamentalOperatorSet, Subspace, SubspaceId, SubspaceRegistry};
pub use operator::{FockOperator, ManyBodyOperator, c, c_dag, n};
pub use partition::{SpaceOptions, SpacePartition};
pub use scalar::{Scalar, c64};
pub use sign::{Configuration, Sign, SignTracker};
pub use state::State;
