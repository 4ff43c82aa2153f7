//! Partitioning options.

use serde::{Deserialize, Serialize};

use crate::hilbert::StateLayout;

/// How the Fock space is split into invariant subspaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionMethod {
    /// Group basis states by the eigenvalues of the quantum-number
    /// operators. An empty list yields one block.
    #[default]
    QuantumNumbers,
    /// One block holding the full basis.
    None,
    /// Discover blocks from the Hamiltonian and the fundamental operators.
    Autopartition,
}

/// Options for [`SpacePartition`](super::SpacePartition).
///
/// # Example
///
/// ```
/// use cthyb_core::partition::{PartitionMethod, SpaceOptions};
///
/// let opts = SpaceOptions::default()
///     .with_method(PartitionMethod::Autopartition)
///     .with_dense_threshold(16);
/// assert_eq!(opts.layout.dense_threshold, 16);
/// assert_eq!(opts.max_modes, 24);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceOptions {
    pub method: PartitionMethod,
    pub layout: StateLayout,
    /// Largest mode count for which the full basis may be enumerated.
    pub max_modes: usize,
}

/// Default limit on enumerated modes (2^24 basis states).
pub const DEFAULT_MAX_MODES: usize = 24;

impl Default for SpaceOptions {
    fn default() -> Self {
        Self {
            method: PartitionMethod::default(),
            layout: StateLayout::default(),
            max_modes: DEFAULT_MAX_MODES,
        }
    }
}

impl SpaceOptions {
    pub fn with_method(mut self, method: PartitionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_layout(mut self, layout: StateLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Subspaces of dimension up to `threshold` use dense states.
    pub fn with_dense_threshold(mut self, threshold: usize) -> Self {
        self.layout.dense_threshold = threshold;
        self
    }

    pub fn with_prune_tolerance(mut self, tolerance: f64) -> Self {
        self.layout.prune_tolerance = tolerance;
        self
    }

    pub fn with_max_modes(mut self, max_modes: usize) -> Self {
        self.max_modes = max_modes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SpaceOptions::default();
        assert_eq!(opts.method, PartitionMethod::QuantumNumbers);
        assert_eq!(opts.layout.dense_threshold, 64);
        assert_eq!(opts.layout.prune_tolerance, 1e-10);
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let opts: SpaceOptions = serde_json::from_str(r#"{"method":"None"}"#).unwrap();
        assert_eq!(opts.method, PartitionMethod::None);
        assert_eq!(opts.max_modes, DEFAULT_MAX_MODES);

        let back: SpaceOptions = serde_json::from_str(&serde_json::to_string(&opts).unwrap()).unwrap();
        assert_eq!(back, opts);
    }
}
