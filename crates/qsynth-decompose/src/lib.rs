//! qsynth Controlled-Gate Decomposition
//!
//! This crate rewrites gates with arbitrarily many controls into the
//! elementary set: uncontrolled single-qubit gates, X with any number of
//! controls, and global phase. Every rewrite is exact, global phase included.
//!
//! # Techniques
//!
//! - **Gray code** ([`gray_code`]): multi-controlled `Rx`, `Ry`, `Rz`, and
//!   phase gates as `2^n − 1` singly controlled rotations chained by CNOTs
//! - **ABC** ([`abc`]): multi-controlled U3 with two multiplexed X gates
//! - **Multiplexed phase** ([`multiplexed`]): a phase on the all-ones
//!   subspace, either through a borrowed incrementer or by recursion
//! - **Dispatch** ([`Decomposer`]): picks the technique per instruction and
//!   conjugates negative controls with X
//!
//! # Example: Decomposing a Doubly Controlled Ry
//!
//! ```rust
//! use qsynth_decompose::{DecomposeConfig, Decomposer};
//! use qsynth_ir::{Circuit, Control, Instruction, QubitId, StandardGate};
//!
//! let mut circuit = Circuit::with_size("ccry", 3);
//! circuit
//!     .apply(Instruction::gate(
//!         StandardGate::Ry(0.5),
//!         [Control::positive(QubitId(0)), Control::negative(QubitId(1))],
//!         Some(QubitId(2)),
//!     ))
//!     .unwrap();
//!
//! let decomposed = Decomposer::new(DecomposeConfig::default())
//!     .decompose_circuit(&circuit)
//!     .unwrap();
//! assert!(decomposed.instructions().iter().all(Instruction::is_elementary));
//! assert_eq!(decomposed.count_ops()["x"], 2);
//! ```

pub mod abc;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gray_code;
pub mod multiplexed;

pub use abc::controlled_u3;
pub use config::{DecomposeConfig, PhaseStrategy};
pub use dispatch::Decomposer;
pub use error::{DecomposeError, DecomposeResult};
pub use gray_code::{RotationAxis, gray_code, multiplexed_rotation};
pub use multiplexed::{multiplexed_phase, multiplexed_x};
