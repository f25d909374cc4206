//! Adjacency penalty tensor.
//!
//! `J(n1, d1, n2, d2) = A` when `n1 == n2` and `d2 == d1 + 1`, zero otherwise.
//! Only the constant and the grid are stored; the dense `N×D×N×D` tensor is
//! never materialised.

use crate::grid::AssignmentGrid;

/// One non-zero tensor entry: `(n, d) → (n, d + 1)` with its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyEntry {
    /// Agent the entry belongs to.
    pub agent: usize,
    /// Earlier of the two consecutive slots.
    pub slot: usize,
    /// Penalty weight (the adjacency constant).
    pub weight: f64,
}

/// Sparse adjacency penalty tensor for one grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyTensor {
    grid: AssignmentGrid,
    weight: f64,
}

impl PenaltyTensor {
    /// Build the tensor for `grid` with adjacency constant `weight`.
    pub fn new(grid: AssignmentGrid, weight: f64) -> Self {
        Self { grid, weight }
    }

    /// Value at `(n1, d1, n2, d2)`. Out-of-range indices read as zero.
    pub fn get(&self, n1: usize, d1: usize, n2: usize, d2: usize) -> f64 {
        let in_range = n1 < self.grid.agents()
            && n2 < self.grid.agents()
            && d1 < self.grid.slots()
            && d2 < self.grid.slots();
        if in_range && n1 == n2 && d2 == d1 + 1 {
            self.weight
        } else {
            0.0
        }
    }

    /// Iterate the support: every consecutive-slot pair of every agent.
    pub fn support(&self) -> impl Iterator<Item = PenaltyEntry> + '_ {
        let slots = self.grid.slots();
        (0..self.grid.agents()).flat_map(move |agent| {
            (0..slots.saturating_sub(1)).map(move |slot| PenaltyEntry {
                agent,
                slot,
                weight: self.weight,
            })
        })
    }

    /// Number of structurally non-zero entries, `N·(D−1)`.
    pub fn support_len(&self) -> usize {
        self.grid.agents() * self.grid.slots().saturating_sub(1)
    }
}
