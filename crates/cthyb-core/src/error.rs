//! Error types for cthyb-core.
//!
//! Every failure in this crate is a programming or configuration error:
//! nothing is retried and there are no partial results. Errors fall in two
//! classes, exposed through [`CoreError::kind`]:
//!
//! - [`ErrorKind::Domain`]: a caller violated a precondition.
//! - [`ErrorKind::Numerical`]: a dense eigensolver failed on a block.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Precondition violated by the caller.
    Domain,
    /// Numerical routine failed (fatal).
    Numerical,
}

/// Errors that can occur in Fock-space, partitioning and sign operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Arithmetic or operator application on a state bound to no subspace.
    #[error("state is not bound to any subspace")]
    UnboundState,

    /// Binary state operation with operands living in different subspaces.
    #[error("subspace mismatch: left operand in subspace {left}, right operand in subspace {right}")]
    SubspaceMismatch { left: usize, right: usize },

    /// Subspace id not present in the registry.
    #[error("subspace {id} does not exist (registry holds {count} subspaces)")]
    UnknownSubspace { id: usize, count: usize },

    /// A basis state produced by an operator is absent from its target subspace.
    #[error("fock state {fock_state:#b} is not a member of subspace {subspace}")]
    FockStateNotInSubspace { fock_state: u64, subspace: usize },

    /// State storage whose length disagrees with its subspace dimension.
    #[error("state in subspace {subspace} holds {found} amplitudes, expected {expected}")]
    DimensionMismatch {
        subspace: usize,
        expected: usize,
        found: usize,
    },

    /// Division of a state by a zero scalar.
    #[error("division of a state by zero")]
    DivisionByZero,

    /// Local index outside the subspace dimension.
    #[error("local index {index} out of range for subspace of dimension {dim}")]
    IndexOutOfBounds { index: usize, dim: usize },

    /// Mode label not registered in the mode index.
    #[error("mode {label} is not part of the mode index")]
    UnknownMode { label: String },

    /// Mode label inserted twice.
    #[error("mode {label} is already part of the mode index")]
    DuplicateMode { label: String },

    /// Too many modes for the requested operation.
    #[error("too many modes: {count} exceeds the limit of {max}")]
    TooManyModes { count: usize, max: usize },

    /// Block or inner index outside the block structure.
    #[error("no fundamental operator at block {block}, inner index {inner}")]
    UnknownBlockIndex { block: usize, inner: usize },

    /// A quantum-number operator is not diagonal in the occupation basis.
    #[error("quantum number {qn} is not diagonal on fock state {fock_state:#b}")]
    NonDiagonalQuantumNumber { qn: usize, fock_state: u64 },

    /// An operator sends one subspace into several subspaces.
    #[error(
        "operator {operator} connects subspace {source_space} to both subspace {first} and subspace {second}"
    )]
    InconsistentConnectivity {
        operator: String,
        source_space: usize,
        first: usize,
        second: usize,
    },

    /// Two configuration operators at the same time point.
    #[error("time point {time} is already occupied")]
    TimeOccupied { time: u64 },

    /// Dense eigensolver failure on a block.
    #[error("eigendecomposition of subspace {subspace} failed: {message}")]
    EigenError { subspace: usize, message: String },
}

impl CoreError {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::EigenError { .. } => ErrorKind::Numerical,
            _ => ErrorKind::Domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(CoreError::UnboundState.kind(), ErrorKind::Domain);
        assert_eq!(CoreError::DivisionByZero.kind(), ErrorKind::Domain);
        let e = CoreError::DimensionMismatch {
            subspace: 0,
            expected: 4,
            found: 6,
        };
        assert_eq!(e.kind(), ErrorKind::Domain);
        let e = CoreError::EigenError {
            subspace: 3,
            message: "no convergence".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Numerical);
    }

    #[test]
    fn test_display() {
        let e = CoreError::FockStateNotInSubspace {
            fock_state: 0b101,
            subspace: 2,
        };
        assert_eq!(e.to_string(), "fock state 0b101 is not a member of subspace 2");
    }
}
