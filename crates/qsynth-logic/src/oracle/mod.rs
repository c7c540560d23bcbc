//! Truth-table oracles: Quine–McCluskey minimization and the emitter that
//! turns a cover into multi-controlled X blocks.

mod emitter;
pub mod qm;

pub use emitter::{OracleTable, disjoint_cover, emit_oracle, synthesize_oracle};
pub use qm::{Implicant, minimize};
