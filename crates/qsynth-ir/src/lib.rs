//! qsynth Gate Intermediate Representation
//!
//! This crate provides the gate-level data structures shared by the qsynth
//! synthesizers: qubit handles, polarity-tagged controls, the elementary gate
//! set, and the append-only [`GateSink`] every synthesizer writes into.
//!
//! # Core Components
//!
//! - **Qubits and Controls**: [`QubitId`] indexes a monotonically growing
//!   register; [`Control`] tags a qubit with the polarity it fires on
//! - **Gates**: [`StandardGate`] (X, CX, MCX, Rx, Ry, Rz, P, U3, global phase)
//! - **Instructions**: [`Instruction`] combining a gate with controls and target
//! - **Sink**: [`GateSink`], implemented by the [`Circuit`] builder
//! - **Verification**: [`unitary`] builds dense unitaries, [`classical`]
//!   simulates reversible circuits on basis states
//!
//! # Example: Building a Toffoli with a Negative Control
//!
//! ```rust
//! use qsynth_ir::{Circuit, Control, QubitId, classical};
//!
//! let mut circuit = Circuit::with_size("toffoli", 3);
//! circuit
//!     .mcx([Control::positive(QubitId(0)), Control::negative(QubitId(1))], QubitId(2))
//!     .unwrap();
//!
//! let out = classical::simulate(&circuit, &[true, false, false]).unwrap();
//! assert_eq!(out, vec![true, false, true]);
//! ```
//!
//! Qubit `i` is bit `i` of a basis-state index throughout.

pub mod circuit;
pub mod classical;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod matrix;
pub mod qubit;
pub mod sink;
pub mod unitary;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::Instruction;
pub use matrix::{Unitary2x2, ZyzAngles};
pub use qubit::{Control, QubitId};
pub use sink::GateSink;
pub use unitary::DenseUnitary;
