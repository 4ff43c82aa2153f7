//! Invariant-subspace partitioning of the local Fock space.
//!
//! [`SpacePartition::new`] runs the full setup once:
//!
//! 1. split the `2^n` basis states into blocks ([`PartitionMethod`])
//! 2. diagonalize the Hamiltonian on every block
//! 3. subtract the global ground-state energy from every eigenvalue
//! 4. build one connected [`FockOperator`] per fundamental `c`/`c†`
//!
//! The result is immutable and can be shared between threads.

mod autopartition;
mod eigen;
mod options;

pub use eigen::Eigensystem;
pub use options::{DEFAULT_MAX_MODES, PartitionMethod, SpaceOptions};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::hilbert::{
    BlockStructure, FockState, FundamentalOperatorSet, StateLayout, Subspace, SubspaceId,
    SubspaceRegistry, format_fock_state,
};
use crate::operator::{
    CompiledTerm, FockOperator, ManyBodyOperator, Routing, c, c_dag, compile_terms,
};
use crate::scalar::Scalar;
use crate::state::State;

/// Quantum-number values closer than this fall into the same block.
const QN_RESOLUTION: f64 = 1e-8;

/// A fundamental operator: `c†` (`dagger`) or `c` on mode bit `mode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId {
    pub dagger: bool,
    pub mode: usize,
}

impl OperatorId {
    pub fn new(dagger: bool, mode: usize) -> Self {
        Self { dagger, mode }
    }

    #[inline]
    fn slot(self) -> usize {
        2 * self.mode + usize::from(self.dagger)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dagger {
            write!(f, "c_dag[{}]", self.mode)
        } else {
            write!(f, "c[{}]", self.mode)
        }
    }
}

/// Invariant subspaces of a local Hamiltonian with their spectra and the
/// connectivity of every fundamental operator.
///
/// # Example
///
/// ```
/// use cthyb_core::hilbert::{BlockStructure, FundamentalOperatorSet};
/// use cthyb_core::operator::n;
/// use cthyb_core::partition::{SpaceOptions, SpacePartition};
///
/// let fops = FundamentalOperatorSet::from_labels([0, 1]).unwrap();
/// let blocks = BlockStructure::one_block_per_mode(&fops);
/// let h = 2.0 * n(0) * n(1);
///
/// let sp = SpacePartition::new(&h, &[n(0)], &fops, blocks, SpaceOptions::default()).unwrap();
/// assert_eq!(sp.n_subspaces(), 2);
/// assert_eq!(sp.ground_state_energy(), 0.0);
/// ```
#[derive(Debug)]
pub struct SpacePartition {
    fops: FundamentalOperatorSet,
    blocks: BlockStructure,
    options: SpaceOptions,
    registry: Arc<SubspaceRegistry>,
    quantum_numbers: Vec<Vec<f64>>,
    hamiltonian: FockOperator,
    eigensystems: Vec<Eigensystem>,
    ground_state_energy: f64,
    /// Indexed by [`OperatorId::slot`].
    fundamental: Vec<FockOperator>,
}

impl SpacePartition {
    /// Partition the Fock space of `fops` for Hamiltonian `h`.
    ///
    /// `quantum_numbers` is used by [`PartitionMethod::QuantumNumbers`] and
    /// ignored otherwise.
    pub fn new(
        h: &ManyBodyOperator,
        quantum_numbers: &[ManyBodyOperator],
        fops: &FundamentalOperatorSet,
        blocks: BlockStructure,
        options: SpaceOptions,
    ) -> Result<Self> {
        let n_modes = fops.len();
        if n_modes > options.max_modes || n_modes >= usize::BITS as usize {
            return Err(CoreError::TooManyModes {
                count: n_modes,
                max: options.max_modes,
            });
        }
        let h_terms = compile_terms(h, fops)?;

        let (bases, qn_values) = match options.method {
            PartitionMethod::QuantumNumbers if !quantum_numbers.is_empty() => {
                refine_by_quantum_numbers(quantum_numbers, fops, options)?
            }
            PartitionMethod::QuantumNumbers | PartitionMethod::None => {
                let full = Subspace::full(0, n_modes, options.max_modes)?;
                (vec![full.fock_states().to_vec()], vec![Vec::new()])
            }
            PartitionMethod::Autopartition => {
                let fundamental: Vec<CompiledTerm> = fundamental_terms(fops)?
                    .into_iter()
                    .map(|(_, t)| t)
                    .collect();
                let bases = autopartition::autopartition(&h_terms, &fundamental, n_modes);
                let empty = vec![Vec::new(); bases.len()];
                (bases, empty)
            }
        };

        let registry = Arc::new(SubspaceRegistry::from_bases(bases, options.layout));
        log::info!(
            "partitioned {} modes into {} subspaces ({:?})",
            n_modes,
            registry.len(),
            options.method
        );

        let hamiltonian = FockOperator::new(h, fops, registry.clone())?;
        let mut eigensystems = registry
            .spaces()
            .iter()
            .map(|sp| eigen::diagonalize(&hamiltonian, sp))
            .collect::<Result<Vec<_>>>()?;

        let ground_state_energy = eigensystems
            .iter()
            .filter_map(Eigensystem::lowest)
            .fold(f64::INFINITY, f64::min);
        for es in &mut eigensystems {
            es.shift(ground_state_energy);
        }
        log::info!("ground state energy {}", ground_state_energy);

        let fundamental = build_connected_operators(fops, &registry)?;

        let partition = Self {
            fops: fops.clone(),
            blocks,
            options,
            registry,
            quantum_numbers: qn_values,
            hamiltonian,
            eigensystems,
            ground_state_energy,
            fundamental,
        };
        for sp in partition.registry.spaces() {
            log::debug!(
                "subspace {}: dim {}, lowest shifted energy {:?}",
                sp.id(),
                sp.dim(),
                partition.eigensystems[sp.id()].lowest()
            );
        }
        Ok(partition)
    }

    /// Partition using the quantum-number method.
    pub fn with_quantum_numbers(
        h: &ManyBodyOperator,
        quantum_numbers: &[ManyBodyOperator],
        fops: &FundamentalOperatorSet,
        blocks: BlockStructure,
    ) -> Result<Self> {
        let options = SpaceOptions::default().with_method(PartitionMethod::QuantumNumbers);
        Self::new(h, quantum_numbers, fops, blocks, options)
    }

    /// Partition by discovering blocks from `h` alone.
    pub fn autopartition(
        h: &ManyBodyOperator,
        fops: &FundamentalOperatorSet,
        blocks: BlockStructure,
    ) -> Result<Self> {
        let options = SpaceOptions::default().with_method(PartitionMethod::Autopartition);
        Self::new(h, &[], fops, blocks, options)
    }

    /// Number of invariant subspaces.
    #[inline]
    pub fn n_subspaces(&self) -> usize {
        self.registry.len()
    }

    /// Subspace by id.
    pub fn subspace(&self, id: SubspaceId) -> Result<&Subspace> {
        self.registry.get(id)
    }

    /// Registry shared by every operator of this partition.
    #[inline]
    pub fn registry(&self) -> &Arc<SubspaceRegistry> {
        &self.registry
    }

    /// Spectrum of subspace `id`.
    pub fn eigensystem(&self, id: SubspaceId) -> Result<&Eigensystem> {
        self.eigensystems.get(id).ok_or(CoreError::UnknownSubspace {
            id,
            count: self.eigensystems.len(),
        })
    }

    #[inline]
    pub fn eigensystems(&self) -> &[Eigensystem] {
        &self.eigensystems
    }

    /// Lowest eigenvalue of the Hamiltonian before the shift.
    #[inline]
    pub fn ground_state_energy(&self) -> f64 {
        self.ground_state_energy
    }

    /// Hamiltonian with identity routing.
    #[inline]
    pub fn hamiltonian(&self) -> &FockOperator {
        &self.hamiltonian
    }

    /// Quantum-number values shared by all states of subspace `id`.
    ///
    /// Empty unless the quantum-number method was used.
    pub fn quantum_numbers(&self, id: SubspaceId) -> Result<&[f64]> {
        self.quantum_numbers
            .get(id)
            .map(Vec::as_slice)
            .ok_or(CoreError::UnknownSubspace {
                id,
                count: self.quantum_numbers.len(),
            })
    }

    /// Target of operator `op` acting on subspace `id`, `None` if it
    /// annihilates the whole subspace.
    pub fn connect(&self, op: OperatorId, id: SubspaceId) -> Result<Option<SubspaceId>> {
        self.operator(op)?.target(id)
    }

    /// Target of `c†`/`c` for `(block, inner)` acting on subspace `id`.
    pub fn connect_block(
        &self,
        dagger: bool,
        block: usize,
        inner: usize,
        id: SubspaceId,
    ) -> Result<Option<SubspaceId>> {
        let mode = self.blocks.mode(block, inner)?;
        self.connect(OperatorId::new(dagger, mode), id)
    }

    /// Connected engine of a fundamental operator.
    pub fn operator(&self, op: OperatorId) -> Result<&FockOperator> {
        self.fundamental
            .get(op.slot())
            .ok_or(CoreError::UnknownMode {
                label: op.to_string(),
            })
    }

    /// Connected engine of `c†`/`c` for `(block, inner)`.
    pub fn fundamental_operator(&self, dagger: bool, block: usize, inner: usize) -> Result<&FockOperator> {
        let mode = self.blocks.mode(block, inner)?;
        self.operator(OperatorId::new(dagger, mode))
    }

    /// Zero state of subspace `id` in its configured representation.
    pub fn zero_state<ElT: Scalar>(&self, id: SubspaceId) -> Result<State<ElT>> {
        Ok(State::zeros(self.registry.get(id)?, self.registry.layout()))
    }

    /// `Σ exp(-β E)` over all shifted eigenvalues.
    pub fn partition_function(&self, beta: f64) -> f64 {
        self.eigensystems
            .iter()
            .flat_map(|es| es.eigenvalues.iter())
            .map(|&e| (-beta * e).exp())
            .sum()
    }

    #[inline]
    pub fn fundamental_operator_set(&self) -> &FundamentalOperatorSet {
        &self.fops
    }

    #[inline]
    pub fn block_structure(&self) -> &BlockStructure {
        &self.blocks
    }

    #[inline]
    pub fn options(&self) -> &SpaceOptions {
        &self.options
    }

    /// Representation policy of the states.
    #[inline]
    pub fn layout(&self) -> StateLayout {
        self.registry.layout()
    }
}

impl fmt::Display for SpacePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_modes = self.fops.len();
        writeln!(
            f,
            "{} subspaces over {} modes, ground state energy {}",
            self.n_subspaces(),
            n_modes,
            self.ground_state_energy
        )?;
        for (sp, es) in self.registry.spaces().iter().zip(&self.eigensystems) {
            write!(f, "subspace {} (dim {})", sp.id(), sp.dim())?;
            if let Some(qn) = self.quantum_numbers.get(sp.id()).filter(|q| !q.is_empty()) {
                write!(f, " qn {:?}", qn)?;
            }
            writeln!(f)?;
            write!(f, "  states:")?;
            for &fs in sp.fock_states() {
                write!(f, " |{}>", format_fock_state(fs, n_modes))?;
            }
            writeln!(f)?;
            writeln!(f, "  energies: {:?}", es.eigenvalues)?;
        }
        Ok(())
    }
}

/// Group basis states by the values of the quantum-number operators.
///
/// Blocks are ordered by their first basis state; each block carries its
/// quantum-number values.
fn refine_by_quantum_numbers(
    quantum_numbers: &[ManyBodyOperator],
    fops: &FundamentalOperatorSet,
    options: SpaceOptions,
) -> Result<(Vec<Vec<FockState>>, Vec<Vec<f64>>)> {
    let full = Arc::new(SubspaceRegistry::full(
        fops.len(),
        options.max_modes,
        StateLayout::sparse(),
    )?);
    let qn_ops = quantum_numbers
        .iter()
        .map(|q| FockOperator::new(q, fops, full.clone()))
        .collect::<Result<Vec<_>>>()?;
    let space = full.get(0)?;

    let mut block_of: HashMap<Vec<i64>, usize> = HashMap::new();
    let mut bases: Vec<Vec<FockState>> = Vec::new();
    let mut values: Vec<Vec<f64>> = Vec::new();

    for (i, &f) in space.fock_states().iter().enumerate() {
        let e = State::<f64>::basis(space, i, full.layout())?;
        let mut qn = Vec::with_capacity(qn_ops.len());
        for (k, op) in qn_ops.iter().enumerate() {
            let out = op.apply(&e)?;
            let mut value = 0.0;
            for (j, v) in out.iter() {
                if j != i {
                    return Err(CoreError::NonDiagonalQuantumNumber { qn: k, fock_state: f });
                }
                value = v;
            }
            qn.push(value);
        }
        let key: Vec<i64> = qn.iter().map(|v| (v / QN_RESOLUTION).round() as i64).collect();
        let b = *block_of.entry(key).or_insert_with(|| {
            bases.push(Vec::new());
            values.push(qn);
            bases.len() - 1
        });
        bases[b].push(f);
    }
    Ok((bases, values))
}

/// Compiled single-term `c`/`c†` for every mode, in slot order.
fn fundamental_terms(fops: &FundamentalOperatorSet) -> Result<Vec<(OperatorId, CompiledTerm)>> {
    let mut out = Vec::with_capacity(2 * fops.len());
    for (mode, ind) in fops.iter() {
        for dagger in [false, true] {
            let op = if dagger { c_dag(ind.clone()) } else { c(ind.clone()) };
            for term in compile_terms(&op, fops)? {
                out.push((OperatorId::new(dagger, mode), term));
            }
        }
    }
    Ok(out)
}

/// Connectivity of every fundamental operator.
///
/// Every basis state of a source subspace is probed; all non-vanishing
/// images must land in the same target subspace.
fn build_connected_operators(
    fops: &FundamentalOperatorSet,
    registry: &Arc<SubspaceRegistry>,
) -> Result<Vec<FockOperator>> {
    let mut block_of: HashMap<FockState, SubspaceId> = HashMap::new();
    for sp in registry.spaces() {
        for &f in sp.fock_states() {
            block_of.insert(f, sp.id());
        }
    }

    let mut out = Vec::with_capacity(2 * fops.len());
    for (id, term) in fundamental_terms(fops)? {
        let mut map: Vec<Option<SubspaceId>> = vec![None; registry.len()];
        for sp in registry.spaces() {
            for &f in sp.fock_states() {
                let Some((g, _)) = term.act(f) else {
                    continue;
                };
                let target = *block_of.get(&g).ok_or(CoreError::FockStateNotInSubspace {
                    fock_state: g,
                    subspace: sp.id(),
                })?;
                match map[sp.id()] {
                    None => map[sp.id()] = Some(target),
                    Some(first) if first != target => {
                        return Err(CoreError::InconsistentConnectivity {
                            operator: id.to_string(),
                            source_space: sp.id(),
                            first,
                            second: target,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        log::debug!("connectivity of {}: {:?}", id, map);
        out.push(FockOperator::from_terms(
            vec![term],
            registry.clone(),
            Routing::Connected(map),
        ));
    }
    Ok(out)
}
