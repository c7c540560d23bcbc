//! qsynth Reversible Logic Synthesis
//!
//! This crate compiles classical boolean descriptions into reversible gate
//! sequences: logic networks driven by a synthesis schedule, and truth-table
//! oracles minimized with Quine–McCluskey.
//!
//! # Architecture
//!
//! ```text
//! LogicNetwork ──► MappingStrategy ──► Vec<Step>
//!                                          │
//!                                          ▼
//!                  ActionInterpreter (AncillaPool, QubitLocationTable,
//!                                     level batching, LUT callback)
//!                                          │
//!                                          ▼
//!                                      GateSink
//!
//! OracleTable ──► minimize ──► disjoint cover ──► one MCX per term
//! ```
//!
//! # Example: Synthesizing a Full Adder
//!
//! ```rust
//! use qsynth_ir::{Circuit, classical};
//! use qsynth_logic::{BennettStrategy, LogicSynthesisParams, Network, synthesize_network};
//!
//! let mut ntk = Network::new();
//! let a = ntk.create_pi();
//! let b = ntk.create_pi();
//! let c = ntk.create_pi();
//! let sum = ntk.create_xor3(a, b, c);
//! let carry = ntk.create_maj(a, b, c);
//! ntk.create_po(sum);
//! ntk.create_po(carry);
//!
//! let mut circuit = Circuit::new("adder");
//! let stats = synthesize_network(
//!     &mut circuit,
//!     &ntk,
//!     &mut BennettStrategy::new(),
//!     None,
//!     LogicSynthesisParams::default(),
//! )
//! .unwrap();
//!
//! let out = classical::simulate(&circuit, &[true, true, false, false, false]).unwrap();
//! assert!(!out[stats.output_indexes[0].index()]);
//! assert!(out[stats.output_indexes[1].index()]);
//! ```
//!
//! # Example: Compiling an Oracle
//!
//! ```rust
//! use qsynth_logic::oracle::{OracleTable, minimize, synthesize_oracle};
//!
//! assert_eq!(minimize(2, &[1, 3]), vec!["-1"]);
//!
//! let table = OracleTable::new(2, vec![vec![1, 3]]).unwrap();
//! let circuit = synthesize_oracle(&table).unwrap();
//! assert_eq!(circuit.len(), 1);
//! ```

pub mod ancilla;
pub mod config;
pub mod error;
pub mod interpreter;
mod level;
pub mod lut;
pub mod network;
pub mod oracle;
pub mod schedule;
pub mod synthesis;
pub mod truth_table;

pub use ancilla::{AncillaPool, AncillaStats, QubitLocationTable};
pub use config::LogicSynthesisParams;
pub use error::{SynthError, SynthResult};
pub use interpreter::ActionInterpreter;
pub use lut::{PprmSynthesis, SingleTargetSynthesis};
pub use network::{LogicNetwork, Network, NodeId, NodeKind, Signal};
pub use schedule::{
    Action, BennettStrategy, CellOverride, Cone, FixedSchedule, LevelNode, MappingStrategy, Step,
};
pub use synthesis::{SynthesisStats, synthesize_network};
pub use truth_table::TruthTable;
