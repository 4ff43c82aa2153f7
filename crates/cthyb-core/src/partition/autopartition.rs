//! Block discovery without quantum numbers.
//!
//! Phase 1 joins every pair of basis states connected by a Hamiltonian
//! term. Phase 2 merges blocks until each fundamental operator maps every
//! block into at most one block.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::hilbert::FockState;
use crate::operator::CompiledTerm;

/// Split the `2^n_modes` basis states into blocks.
///
/// Blocks are ordered by their smallest member; members are ascending.
pub(crate) fn autopartition(
    hamiltonian: &[CompiledTerm],
    fundamental: &[CompiledTerm],
    n_modes: usize,
) -> Vec<Vec<FockState>> {
    let dim = 1usize << n_modes;
    let mut uf = UnionFind::<usize>::new(dim);

    for f in 0..dim {
        for term in hamiltonian {
            if term.coeff == 0.0 {
                continue;
            }
            if let Some((g, _)) = term.act(f as FockState) {
                uf.union(f, g as usize);
            }
        }
    }
    log::debug!("autopartition: phase 1 done");

    let mut rounds = 0;
    loop {
        let mut merged = false;
        for op in fundamental {
            let mut target_of: HashMap<usize, usize> = HashMap::new();
            for f in 0..dim {
                let Some((g, _)) = op.act(f as FockState) else {
                    continue;
                };
                let src = uf.find_mut(f);
                let dst = uf.find_mut(g as usize);
                match target_of.get(&src) {
                    None => {
                        target_of.insert(src, dst);
                    }
                    Some(&first) => {
                        if uf.union(first, dst) {
                            merged = true;
                        }
                    }
                }
            }
        }
        rounds += 1;
        if !merged {
            break;
        }
    }
    log::debug!("autopartition: phase 2 converged after {} rounds", rounds);

    let mut block_of_root: HashMap<usize, usize> = HashMap::new();
    let mut bases: Vec<Vec<FockState>> = Vec::new();
    for f in 0..dim {
        let root = uf.find_mut(f);
        let b = *block_of_root.entry(root).or_insert_with(|| {
            bases.push(Vec::new());
            bases.len() - 1
        });
        bases[b].push(f as FockState);
    }
    bases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hilbert::FundamentalOperatorSet;
    use crate::operator::{ManyBodyOperator, c, c_dag, compile_terms, n};

    fn fundamental(fops: &FundamentalOperatorSet) -> Vec<CompiledTerm> {
        let mut out = Vec::new();
        for (_, ind) in fops.iter() {
            out.extend(compile_terms(&c(ind.clone()), fops).unwrap());
            out.extend(compile_terms(&c_dag(ind.clone()), fops).unwrap());
        }
        out
    }

    #[test]
    fn test_diagonal_hamiltonian_keeps_singletons() {
        let fops = FundamentalOperatorSet::from_labels([0, 1]).unwrap();
        let h = 2.0 * n(0) * n(1);
        let bases = autopartition(&compile_terms(&h, &fops).unwrap(), &fundamental(&fops), 2);
        assert_eq!(bases, vec![vec![0b00], vec![0b01], vec![0b10], vec![0b11]]);
    }

    #[test]
    fn test_fundamental_operators_force_merge() {
        let fops = FundamentalOperatorSet::from_labels(0..3).unwrap();
        let h = c_dag(0) * c(1) + c_dag(1) * c(0);
        let bases = autopartition(&compile_terms(&h, &fops).unwrap(), &fundamental(&fops), 3);
        // c†_2 sends 001 and 010 to 101 and 110, which must then share a block
        assert_eq!(
            bases,
            vec![
                vec![0b000],
                vec![0b001, 0b010],
                vec![0b011],
                vec![0b100],
                vec![0b101, 0b110],
                vec![0b111],
            ]
        );
    }

    #[test]
    fn test_no_hamiltonian_no_operators() {
        let bases = autopartition(&[], &[], 2);
        assert_eq!(bases.len(), 4);
    }

    #[test]
    fn test_hopping_joins_states() {
        let fops = FundamentalOperatorSet::from_labels(0..3).unwrap();
        let h: ManyBodyOperator = c_dag(0) * c(2) + c_dag(2) * c(0);
        let bases = autopartition(&compile_terms(&h, &fops).unwrap(), &[], 3);
        assert!(bases.contains(&vec![0b001, 0b100]));
        assert_eq!(bases.iter().map(Vec::len).sum::<usize>(), 8);
    }
}
