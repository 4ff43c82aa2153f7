//! Second-quantized operators.
//!
//! - [`ManyBodyOperator`]: symbolic, normal-ordered form built from
//!   [`c`], [`c_dag`] and [`n`]
//! - [`FockOperator`]: compiled bitmask form that acts on [`State`](crate::state::State)s

mod compiled;
mod many_body;

pub use compiled::{CompiledTerm, FockOperator, Routing};
pub use many_body::{CanonicalOp, ManyBodyOperator, Monomial, c, c_dag, n};

pub(crate) use compiled::compile_terms;
