//! Monte Carlo configurations and their fermionic sign.

mod configuration;
mod tracker;

pub use configuration::{Configuration, OpDesc, TimePoint};
pub use tracker::{Sign, SignTracker, SignUpdate, flip_count};
