//! Tests for configurations and the sign tracker.
//!
//! Covers:
//! - the block-regrouping count equals a brute-force inversion count
//! - insert/remove sequences on a configuration
//! - persistence of the tracker and the configuration through serde_json

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cthyb_core::sign::{Configuration, OpDesc, Sign, SignTracker, TimePoint, flip_count};

/// Inversions relative to: blocks ascending, annihilators before creators
/// inside a block.
fn brute_force_inversions(ops: &[OpDesc]) -> usize {
    let key = |op: &OpDesc| (op.block_index, op.dagger);
    let mut n = 0;
    for i in 0..ops.len() {
        for j in i + 1..ops.len() {
            if key(&ops[i]) > key(&ops[j]) {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn test_regrouping_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..500 {
        let len = rng.random_range(0..12);
        let ops: Vec<OpDesc> = (0..len)
            .map(|_| OpDesc {
                block_index: rng.random_range(0..4),
                inner_index: 0,
                dagger: rng.random_bool(0.5),
                mode: 0,
            })
            .collect();
        assert_eq!(flip_count(&ops, &[]), brute_force_inversions(&ops), "{:?}", ops);

        let det_sizes = [1usize, 2, 0, 3];
        let extra: usize = det_sizes.iter().map(|n| n * (n + 1) / 2).sum();
        assert_eq!(flip_count(&ops, &det_sizes), brute_force_inversions(&ops) + extra);
    }
}

#[test]
fn test_empty_configuration() {
    let config = Configuration::new(10.0);
    let mut tracker = SignTracker::new();
    let upd = tracker.update_from(&config, &[0]);
    assert_eq!(upd.current, Sign::Plus);
    assert_eq!(upd.previous, Sign::Plus);
}

#[test]
fn test_insert_pair_restores_plus() {
    let beta = 10.0;
    let mut config = Configuration::new(beta);
    let mut tracker = SignTracker::new();

    config
        .insert(TimePoint::from_tau(2.0, beta), OpDesc::creation(0, 0, 0))
        .unwrap();
    config
        .insert(TimePoint::from_tau(3.0, beta), OpDesc::annihilation(0, 0, 0))
        .unwrap();
    let upd = tracker.update_from(&config, &[1]);
    assert_eq!(upd.current, Sign::Plus);

    // pair in the other time order
    let mut swapped = Configuration::new(beta);
    swapped
        .insert(TimePoint::from_tau(2.0, beta), OpDesc::annihilation(0, 0, 0))
        .unwrap();
    swapped
        .insert(TimePoint::from_tau(3.0, beta), OpDesc::creation(0, 0, 0))
        .unwrap();
    let upd = tracker.update_from(&swapped, &[1]);
    assert_eq!(upd.current, Sign::Minus);
    assert_eq!(upd.previous, Sign::Plus);
    assert_eq!(upd.ratio(), Sign::Minus);

    // removing the pair returns to the empty configuration
    swapped.remove(TimePoint::from_tau(2.0, beta)).unwrap();
    swapped.remove(TimePoint::from_tau(3.0, beta)).unwrap();
    let upd = tracker.update_from(&swapped, &[0]);
    assert_eq!(upd.current, Sign::Plus);
    assert_eq!(upd.previous, Sign::Minus);
}

/// Moving a whole same-block pair past another pair does not change the sign.
#[test]
fn test_pairs_commute() {
    let a = [
        OpDesc::creation(0, 0, 0),
        OpDesc::annihilation(0, 0, 0),
        OpDesc::creation(1, 0, 1),
        OpDesc::annihilation(1, 0, 1),
    ];
    let b = [a[2], a[3], a[0], a[1]];
    assert_eq!(
        flip_count(&a, &[1, 1]) % 2,
        flip_count(&b, &[1, 1]) % 2
    );
}

#[test]
fn test_sign_state_persists() {
    let beta = 4.0;
    let mut config = Configuration::new(beta);
    config
        .insert(TimePoint::from_tau(0.5, beta), OpDesc::annihilation(1, 0, 2))
        .unwrap();
    config
        .insert(TimePoint::from_tau(1.5, beta), OpDesc::creation(1, 0, 2))
        .unwrap();
    let mut tracker = SignTracker::new();
    tracker.update_from(&config, &[0, 1]);

    let config_json = serde_json::to_string(&config).unwrap();
    let tracker_json = serde_json::to_string(&tracker).unwrap();
    let config_back: Configuration = serde_json::from_str(&config_json).unwrap();
    let mut tracker_back: SignTracker = serde_json::from_str(&tracker_json).unwrap();

    assert_eq!(config_back, config);
    assert_eq!(tracker_back.current(), tracker.current());
    let upd = tracker_back.update_from(&config_back, &[0, 1]);
    assert_eq!(upd.current, upd.previous);
}
