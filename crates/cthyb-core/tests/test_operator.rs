//! Tests for the operator engine against explicit occupation-string algebra.
//!
//! Covers:
//! - fermionic signs of random operator products versus one-mode-at-a-time application
//! - applying a monomial and then its Hermitian conjugate
//! - hermiticity of a compiled hopping Hamiltonian

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cthyb_core::hilbert::{FundamentalOperatorSet, StateLayout, SubspaceRegistry};
use cthyb_core::operator::{FockOperator, ManyBodyOperator, c, c_dag};
use cthyb_core::state::State;

const N_MODES: usize = 8;

/// Labels inserted out of order so that label order and bit order differ.
const LABEL_ORDER: [i64; N_MODES] = [3, 0, 7, 1, 5, 2, 6, 4];

fn setup() -> (FundamentalOperatorSet, Arc<SubspaceRegistry>) {
    let fops = FundamentalOperatorSet::from_labels(LABEL_ORDER).unwrap();
    let reg = Arc::new(SubspaceRegistry::full(N_MODES, 24, StateLayout::sparse()).unwrap());
    (fops, reg)
}

#[derive(Clone, Copy, Debug)]
struct NaiveOp {
    dagger: bool,
    bit: usize,
}

/// Apply `o_1 o_2 … o_k` to `|f>` right to left, one mode at a time.
fn naive_apply(ops: &[NaiveOp], f: u64) -> Option<(u64, f64)> {
    let mut state = f;
    let mut sign = 1.0;
    for op in ops.iter().rev() {
        let occupied = (state >> op.bit) & 1 == 1;
        if occupied == op.dagger {
            return None;
        }
        let below = state & ((1u64 << op.bit) - 1);
        if below.count_ones() % 2 == 1 {
            sign = -sign;
        }
        state ^= 1u64 << op.bit;
    }
    Some((state, sign))
}

/// Full-space image of `|f>` as `(index, amplitude)` pairs.
fn image(op: &FockOperator, reg: &SubspaceRegistry, f: u64) -> Vec<(usize, f64)> {
    let sp = reg.get(0).unwrap();
    let psi: State<f64> = State::basis(sp, f as usize, reg.layout()).unwrap();
    op.apply(&psi).unwrap().iter().collect()
}

/// Random products of up to four operators, including repeated modes.
#[test]
fn test_sign_matches_brute_force() {
    let (fops, reg) = setup();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..200 {
        let len = rng.random_range(1..=4);
        let mut naive = Vec::with_capacity(len);
        let mut product = ManyBodyOperator::scalar(1.0);
        for _ in 0..len {
            let label = rng.random_range(0..N_MODES as i64);
            let dagger = rng.random_bool(0.5);
            naive.push(NaiveOp {
                dagger,
                bit: fops.position(label).unwrap(),
            });
            product = product * if dagger { c_dag(label) } else { c(label) };
        }

        let op = FockOperator::new(&product, &fops, reg.clone()).unwrap();
        for f in 0..1u64 << N_MODES {
            let expected: Vec<(usize, f64)> = naive_apply(&naive, f)
                .map(|(g, s)| vec![(g as usize, s)])
                .unwrap_or_default();
            assert_eq!(image(&op, &reg, f), expected, "ops {:?} on {:#b}", naive, f);
        }
    }
}

#[test]
fn test_single_operators_match_brute_force() {
    let (fops, reg) = setup();
    for &label in &LABEL_ORDER {
        let bit = fops.position(label).unwrap();
        for dagger in [false, true] {
            let sym = if dagger { c_dag(label) } else { c(label) };
            let op = FockOperator::new(&sym, &fops, reg.clone()).unwrap();
            for f in 0..1u64 << N_MODES {
                let expected: Vec<(usize, f64)> = naive_apply(&[NaiveOp { dagger, bit }], f)
                    .map(|(g, s)| vec![(g as usize, s)])
                    .unwrap_or_default();
                assert_eq!(image(&op, &reg, f), expected);
            }
        }
    }
}

/// `M† M |f>` is `|f>` or zero.
#[test]
fn test_apply_then_conjugate() {
    let (fops, reg) = setup();
    let mut monomials = Vec::new();
    for a in 0..4i64 {
        for b in 0..4i64 {
            monomials.push(c_dag(a) * c(b));
            for d in 4..N_MODES as i64 {
                if a != b {
                    monomials.push(c_dag(a) * c_dag(d) * c(b));
                    monomials.push(c_dag(a) * c_dag(b) * c(d) * c(7 - a));
                }
            }
        }
    }

    let sp = reg.get(0).unwrap();
    for m in monomials.into_iter().filter(|m| !m.is_zero()) {
        let op = FockOperator::new(&m, &fops, reg.clone()).unwrap();
        let conj = FockOperator::new(&m.dagger(), &fops, reg.clone()).unwrap();
        for f in 0..1u64 << N_MODES {
            let psi: State<f64> = State::basis(sp, f as usize, reg.layout()).unwrap();
            let back: Vec<(usize, f64)> = conj.apply(&op.apply(&psi).unwrap()).unwrap().iter().collect();
            assert!(
                back.is_empty() || back == vec![(f as usize, 1.0)],
                "{} on {:#b} gave {:?}",
                m,
                f,
                back
            );
        }
    }
}

#[test]
fn test_hopping_is_hermitian() {
    let (fops, reg) = setup();
    let mut h = ManyBodyOperator::zero();
    for i in 0..N_MODES as i64 - 1 {
        h += -1.0 * (c_dag(i) * c(i + 1) + c_dag(i + 1) * c(i));
    }
    h += 0.5 * (c_dag(0) * c_dag(1) * c(5) * c(4) + c_dag(4) * c_dag(5) * c(1) * c(0));
    assert_eq!(h.dagger(), h);

    let op = FockOperator::new(&h, &fops, reg.clone()).unwrap();
    let dim = 1usize << N_MODES;
    let mut matrix = vec![0.0; dim * dim];
    for f in 0..dim {
        for (g, v) in image(&op, &reg, f as u64) {
            matrix[g * dim + f] = v;
        }
    }
    for i in 0..dim {
        for j in 0..dim {
            assert_eq!(matrix[i * dim + j], matrix[j * dim + i]);
        }
    }
}
