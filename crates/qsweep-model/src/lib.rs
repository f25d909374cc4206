//! QUBO model construction for the agent-to-slot assignment problem.
//!
//! `N` agents are assigned to `D` time slots through binary variables
//! `x[n,d]`. The energy function penalises
//!
//! - two consecutive slots taken by the same agent (adjacency, weight `A`),
//! - slots not covered by exactly one agent (`λ`),
//! - agents not holding exactly one slot (`γ`),
//!
//! and is compiled into an immutable [`BinaryQuadraticModel`] through a
//! sparse [`QuboAccumulator`]. Two builds from the same inputs produce
//! bit-identical models.
//!
//! # Example
//!
//! ```rust
//! use qsweep_model::{ProblemWeights, build_model};
//!
//! let weights = ProblemWeights::new(0.3, 1.3, 3.5);
//! let bqm = build_model(3, 5, &weights).unwrap();
//! assert_eq!(bqm.num_variables(), 15);
//!
//! // Agents 0, 1, 2 take slots 0, 2, 4: two slots stay empty.
//! let mut state = vec![0u8; 15];
//! state[0] = 1;
//! state[5 + 2] = 1;
//! state[10 + 4] = 1;
//! assert!((bqm.energy(&state).unwrap() - 0.6).abs() < 1e-9);
//! ```

pub mod error;
pub mod grid;
pub mod penalty;
pub mod problem;
pub mod qubo;

pub use error::{ModelError, ModelResult};
pub use grid::{AssignmentGrid, VariableLabel};
pub use penalty::{PenaltyEntry, PenaltyTensor};
pub use problem::{AssignmentProblem, ProblemWeights, build_model};
pub use qubo::{BinaryQuadraticModel, QuboAccumulator, Vartype};
