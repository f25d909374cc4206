//! The agent-to-slot assignment problem and its QUBO compilation.
//!
//! ```text
//!   E = α·H1 + λ·H2 + γ·H3
//!
//!   H1 = Σ J(n1,d1,n2,d2)·x[n1,d1]·x[n2,d2]     adjacency penalty
//!   H2 = Σ_d (Σ_n x[n,d] − 1)²                  one agent per slot
//!   H3 = Σ_n (Σ_d x[n,d] − 1)²                  one slot per agent
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult, check_state};
use crate::grid::AssignmentGrid;
use crate::penalty::PenaltyTensor;
use crate::qubo::{BinaryQuadraticModel, QuboAccumulator};

/// Penalty weights of the energy function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemWeights {
    /// Weight of the adjacency term H1 (conventionally 1.0).
    pub alpha: f64,
    /// Weight of the per-slot exclusivity term H2.
    pub lambda: f64,
    /// Weight of the per-agent exclusivity term H3.
    pub gamma: f64,
    /// Adjacency penalty constant `A` populating the tensor.
    pub adjacency: f64,
}

impl ProblemWeights {
    /// Weights with `α = 1.0`.
    pub fn new(lambda: f64, gamma: f64, adjacency: f64) -> Self {
        Self {
            alpha: 1.0,
            lambda,
            gamma,
            adjacency,
        }
    }

    /// Override α.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Reject NaN and infinite weights.
    pub fn validate(&self) -> ModelResult<()> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("lambda", self.lambda),
            ("gamma", self.gamma),
            ("adjacency", self.adjacency),
        ] {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteWeight { name, value });
            }
        }
        Ok(())
    }
}

impl Default for ProblemWeights {
    fn default() -> Self {
        Self::new(0.3, 1.3, 3.5)
    }
}

/// One problem instance: grid, weights and adjacency tensor.
#[derive(Debug, Clone)]
pub struct AssignmentProblem {
    grid: AssignmentGrid,
    weights: ProblemWeights,
    penalty: PenaltyTensor,
}

impl AssignmentProblem {
    /// Create a problem instance.
    pub fn new(agents: usize, slots: usize, weights: ProblemWeights) -> ModelResult<Self> {
        let grid = AssignmentGrid::new(agents, slots)?;
        weights.validate()?;
        Ok(Self {
            grid,
            weights,
            penalty: PenaltyTensor::new(grid, weights.adjacency),
        })
    }

    /// The variable grid.
    pub fn grid(&self) -> &AssignmentGrid {
        &self.grid
    }

    /// The penalty weights.
    pub fn weights(&self) -> &ProblemWeights {
        &self.weights
    }

    /// The adjacency tensor.
    pub fn penalty(&self) -> &PenaltyTensor {
        &self.penalty
    }

    /// H1 evaluated directly on `state` (without α).
    pub fn adjacency_energy(&self, state: &[u8]) -> ModelResult<f64> {
        check_state(state, self.grid.num_variables())?;
        Ok(self
            .penalty
            .support()
            .filter(|e| {
                state[self.grid.index(e.agent, e.slot)] == 1
                    && state[self.grid.index(e.agent, e.slot + 1)] == 1
            })
            .map(|e| e.weight)
            .sum())
    }

    /// H2 evaluated directly on `state` (without λ).
    pub fn slot_exclusivity_energy(&self, state: &[u8]) -> ModelResult<f64> {
        check_state(state, self.grid.num_variables())?;
        Ok((0..self.grid.slots())
            .map(|d| squared_deviation(self.grid.slot_group(d).map(|i| state[i])))
            .sum())
    }

    /// H3 evaluated directly on `state` (without γ).
    pub fn agent_exclusivity_energy(&self, state: &[u8]) -> ModelResult<f64> {
        check_state(state, self.grid.num_variables())?;
        Ok((0..self.grid.agents())
            .map(|n| squared_deviation(self.grid.agent_group(n).map(|i| state[i])))
            .sum())
    }

    /// `α·H1 + λ·H2 + γ·H3` evaluated term by term.
    pub fn energy(&self, state: &[u8]) -> ModelResult<f64> {
        let w = &self.weights;
        Ok(w.alpha * self.adjacency_energy(state)?
            + w.lambda * self.slot_exclusivity_energy(state)?
            + w.gamma * self.agent_exclusivity_energy(state)?)
    }

    /// Compile into a binary quadratic model.
    pub fn compile(&self) -> BinaryQuadraticModel {
        let grid = &self.grid;
        let w = &self.weights;
        let mut acc = QuboAccumulator::new(grid.num_variables());

        for entry in self.penalty.support() {
            acc.add_quadratic(
                grid.index(entry.agent, entry.slot),
                grid.index(entry.agent, entry.slot + 1),
                w.alpha * entry.weight,
            );
        }

        let mut group = Vec::with_capacity(grid.agents().max(grid.slots()));
        for d in 0..grid.slots() {
            group.clear();
            group.extend(grid.slot_group(d));
            acc.add_squared_sum_minus_one(&group, w.lambda);
        }
        for n in 0..grid.agents() {
            group.clear();
            group.extend(grid.agent_group(n));
            acc.add_squared_sum_minus_one(&group, w.gamma);
        }

        acc.build()
    }
}

fn squared_deviation(values: impl Iterator<Item = u8>) -> f64 {
    let sum: f64 = values.map(f64::from).sum();
    (sum - 1.0).powi(2)
}

/// Build the compiled model for an `agents × slots` instance.
pub fn build_model(
    agents: usize,
    slots: usize,
    weights: &ProblemWeights,
) -> ModelResult<BinaryQuadraticModel> {
    Ok(AssignmentProblem::new(agents, slots, *weights)?.compile())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_dimensions() {
        let w = ProblemWeights::default();
        assert!(matches!(
            build_model(0, 3, &w),
            Err(ModelError::InvalidDimensions { agents: 0, slots: 3 })
        ));
        assert!(build_model(2, 0, &w).is_err());
    }

    #[test]
    fn test_rejects_non_finite_weight() {
        let w = ProblemWeights::new(f64::NAN, 1.0, 1.0);
        assert!(matches!(
            build_model(2, 2, &w),
            Err(ModelError::NonFiniteWeight { name: "lambda", .. })
        ));
    }

    #[test]
    fn test_single_variable_model() {
        let w = ProblemWeights::new(0.3, 1.3, 3.5);
        let bqm = build_model(1, 1, &w).unwrap();
        assert_eq!(bqm.num_variables(), 1);
        assert_eq!(bqm.num_interactions(), 0);
        assert!((bqm.energy(&[1]).unwrap()).abs() < 1e-12);
        assert!((bqm.energy(&[0]).unwrap() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_adjacency_pairs_accumulate_with_agent_terms() {
        let w = ProblemWeights::new(0.3, 1.3, 3.5);
        let problem = AssignmentProblem::new(2, 3, w).unwrap();
        let bqm = problem.compile();
        let g = problem.grid();
        // Consecutive slots of one agent: A + 2γ.
        assert!((bqm.quadratic(g.index(0, 0), g.index(0, 1)) - (3.5 + 2.6)).abs() < 1e-12);
        // Non-consecutive slots of one agent: 2γ.
        assert!((bqm.quadratic(g.index(0, 0), g.index(0, 2)) - 2.6).abs() < 1e-12);
        // Same slot, different agents: 2λ.
        assert!((bqm.quadratic(g.index(0, 1), g.index(1, 1)) - 0.6).abs() < 1e-12);
        // Different agent and slot: no term.
        assert_eq!(bqm.quadratic(g.index(0, 0), g.index(1, 1)), 0.0);
    }

    #[test]
    fn test_linear_and_offset() {
        let w = ProblemWeights::new(0.3, 1.3, 3.5);
        let bqm = build_model(3, 5, &w).unwrap();
        for i in 0..bqm.num_variables() {
            assert!((bqm.linear(i) + 1.6).abs() < 1e-12);
        }
        assert!((bqm.offset() - (5.0 * 0.3 + 3.0 * 1.3)).abs() < 1e-12);
    }

    #[test]
    fn test_weights_default() {
        let w = ProblemWeights::default();
        assert_eq!(w.alpha, 1.0);
        assert_eq!(w.lambda, 0.3);
        assert_eq!(w.gamma, 1.3);
        assert_eq!(w.adjacency, 3.5);
    }
}
