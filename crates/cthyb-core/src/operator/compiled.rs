//! Bitmask form of operators and their action on states.
//!
//! Each monomial is reduced to four `u64` masks. With the occupation
//! convention `|f> = c†_{p1} c†_{p2} … |0>`, `p1 < p2 < …`, acting with a
//! monomial on `f` is
//!
//! ```text
//! (f & annihilate) == annihilate          else zero
//! f'  = f & !annihilate
//! (f' & create) == 0                      else zero
//! f'' = f' | create
//! sign = parity((f' & annihilate_count) ^ (f'' & create_count))
//! ```
//!
//! where the count masks flag the positions whose occupation contributes to
//! the fermionic sign when the operators are moved into place.

use std::sync::Arc;

use faer_traits::math_utils::from_f64;

use crate::error::{CoreError, Result};
use crate::hilbert::{FockState, FundamentalOperatorSet, MAX_MODES, SubspaceId, SubspaceRegistry, parity};
use crate::operator::many_body::{ManyBodyOperator, Monomial};
use crate::scalar::Scalar;
use crate::state::State;

/// One monomial in bitmask form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompiledTerm {
    pub coeff: f64,
    pub annihilate_mask: u64,
    pub create_mask: u64,
    pub annihilate_count_mask: u64,
    pub create_count_mask: u64,
}

/// Count mask for operators at `positions`.
///
/// Bit `p` is set iff `p` is not one of the positions and an odd number of
/// positions lie above it.
fn count_mask(positions: &[usize]) -> u64 {
    let mut mask = 0u64;
    let mut on = positions.len() % 2 == 1;
    for p in 0..MAX_MODES {
        if positions.contains(&p) {
            on = !on;
        } else if on {
            mask |= 1u64 << p;
        }
    }
    mask
}

/// Number of pairs `i < j` with `cmp(v[i], v[j])` true.
fn count_pairs(v: &[usize], cmp: impl Fn(usize, usize) -> bool) -> usize {
    let mut n = 0;
    for i in 0..v.len() {
        for j in i + 1..v.len() {
            if cmp(v[i], v[j]) {
                n += 1;
            }
        }
    }
    n
}

impl CompiledTerm {
    /// Compile a normal-ordered monomial against the mode index.
    ///
    /// Symbolic normal order sorts by label; the bit form needs creators
    /// ascending and annihilators descending by bit position. The parity of
    /// that reordering is folded into `coeff`.
    pub fn compile(coeff: f64, monomial: &Monomial, fops: &FundamentalOperatorSet) -> Result<Self> {
        let mut create = Vec::new();
        let mut annihilate = Vec::new();
        for op in monomial.ops() {
            let p = fops.position_of(&op.indices)?;
            if op.dagger {
                create.push(p);
            } else {
                annihilate.push(p);
            }
        }
        let swaps = count_pairs(&create, |a, b| a > b) + count_pairs(&annihilate, |a, b| a < b);
        let coeff = if swaps % 2 == 1 { -coeff } else { coeff };
        Ok(Self {
            coeff,
            annihilate_mask: annihilate.iter().fold(0, |m, &p| m | (1u64 << p)),
            create_mask: create.iter().fold(0, |m, &p| m | (1u64 << p)),
            annihilate_count_mask: count_mask(&annihilate),
            create_count_mask: count_mask(&create),
        })
    }

    /// Action on a basis state: destination and `±1`, or `None` if the
    /// term annihilates `f`.
    #[inline]
    pub fn act(&self, f: FockState) -> Option<(FockState, f64)> {
        if f & self.annihilate_mask != self.annihilate_mask {
            return None;
        }
        let f1 = f & !self.annihilate_mask;
        if f1 & self.create_mask != 0 {
            return None;
        }
        let f2 = f1 | self.create_mask;
        let odd = parity((f1 & self.annihilate_count_mask) ^ (f2 & self.create_count_mask));
        Some((f2, if odd { -1.0 } else { 1.0 }))
    }
}

/// Where an operator sends each subspace.
#[derive(Clone, Debug, PartialEq)]
pub enum Routing {
    /// Every subspace maps to itself (Hamiltonian, quantum numbers).
    Identity,
    /// Per source subspace, the target or `None` if the operator annihilates it.
    Connected(Vec<Option<SubspaceId>>),
}

/// An operator compiled to bitmask terms, acting on states of a registry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cthyb_core::hilbert::{FundamentalOperatorSet, StateLayout, SubspaceRegistry};
/// use cthyb_core::operator::{FockOperator, c_dag, c};
/// use cthyb_core::state::State;
///
/// let fops = FundamentalOperatorSet::from_labels([0, 1]).unwrap();
/// let reg = Arc::new(SubspaceRegistry::full(2, 24, StateLayout::sparse()).unwrap());
/// let hop = FockOperator::new(&(c_dag(1) * c(0)), &fops, reg.clone()).unwrap();
///
/// let sp = reg.get(0).unwrap();
/// let psi: State<f64> = State::basis(sp, 0b01, reg.layout()).unwrap();
/// let out = hop.apply(&psi).unwrap();
/// assert_eq!(out.amplitude(0b10), 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct FockOperator {
    terms: Vec<CompiledTerm>,
    registry: Arc<SubspaceRegistry>,
    routing: Routing,
}

impl FockOperator {
    /// Compile `op`; every subspace maps to itself.
    pub fn new(
        op: &ManyBodyOperator,
        fops: &FundamentalOperatorSet,
        registry: Arc<SubspaceRegistry>,
    ) -> Result<Self> {
        Self::with_routing(op, fops, registry, Routing::Identity)
    }

    /// Compile `op` with an explicit subspace routing.
    pub fn with_routing(
        op: &ManyBodyOperator,
        fops: &FundamentalOperatorSet,
        registry: Arc<SubspaceRegistry>,
        routing: Routing,
    ) -> Result<Self> {
        Ok(Self::from_terms(compile_terms(op, fops)?, registry, routing))
    }

    pub(crate) fn from_terms(
        terms: Vec<CompiledTerm>,
        registry: Arc<SubspaceRegistry>,
        routing: Routing,
    ) -> Self {
        Self {
            terms,
            registry,
            routing,
        }
    }

    /// Compiled terms.
    #[inline]
    pub fn terms(&self) -> &[CompiledTerm] {
        &self.terms
    }

    /// Registry the operator acts on.
    #[inline]
    pub fn registry(&self) -> &Arc<SubspaceRegistry> {
        &self.registry
    }

    #[inline]
    pub fn routing(&self) -> &Routing {
        &self.routing
    }

    /// Target of `source`, or `None` if the operator annihilates it.
    pub fn target(&self, source: SubspaceId) -> Result<Option<SubspaceId>> {
        self.registry.get(source)?;
        match &self.routing {
            Routing::Identity => Ok(Some(source)),
            Routing::Connected(map) => map.get(source).copied().ok_or(CoreError::UnknownSubspace {
                id: source,
                count: map.len(),
            }),
        }
    }

    /// Apply the operator to `state`.
    ///
    /// Returns [`State::null`] when the source subspace is routed to zero.
    /// Fails with [`CoreError::FockStateNotInSubspace`] when a term leaves
    /// the target subspace.
    pub fn apply<ElT: Scalar>(&self, state: &State<ElT>) -> Result<State<ElT>> {
        let src_id = state.subspace_id().ok_or(CoreError::UnboundState)?;
        let src = self.registry.get(src_id)?;
        state.check_subspace(src)?;
        let Some(tgt_id) = self.target(src_id)? else {
            return Ok(State::null());
        };
        let tgt = self.registry.get(tgt_id)?;
        let mut out = State::zeros(tgt, self.registry.layout());

        for (i, amp) in state.iter() {
            if amp == ElT::zero() {
                continue;
            }
            let f = src.fock_state(i).ok_or(CoreError::IndexOutOfBounds {
                index: i,
                dim: src.dim(),
            })?;
            for term in &self.terms {
                if let Some((f2, sign)) = term.act(f) {
                    let j = tgt.require_index(f2)?;
                    out.add_at(j, amp * from_f64::<ElT>(sign * term.coeff))?;
                }
            }
        }
        out.prune();
        Ok(out)
    }
}

pub(crate) fn compile_terms(
    op: &ManyBodyOperator,
    fops: &FundamentalOperatorSet,
) -> Result<Vec<CompiledTerm>> {
    op.iter()
        .map(|(m, c)| CompiledTerm::compile(c, m, fops))
        .collect()
}
