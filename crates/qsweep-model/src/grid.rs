//! The agent × slot grid of binary decision variables.
//!
//! Variable `x[n,d]` is 1 when agent `n` is assigned to slot `d`. Variables
//! are laid out row-major, so agent `n`'s slots occupy the contiguous index
//! range `n·D .. (n+1)·D`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult, check_state};

/// Label of one decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableLabel {
    /// Agent index.
    pub agent: usize,
    /// Slot index.
    pub slot: usize,
}

impl fmt::Display for VariableLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x[{},{}]", self.agent, self.slot)
    }
}

/// Rectangular `agents × slots` variable grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentGrid {
    agents: usize,
    slots: usize,
}

impl AssignmentGrid {
    /// Create a grid. Both dimensions must be at least 1.
    pub fn new(agents: usize, slots: usize) -> ModelResult<Self> {
        if agents == 0 || slots == 0 {
            return Err(ModelError::InvalidDimensions { agents, slots });
        }
        Ok(Self { agents, slots })
    }

    /// Number of agents (N).
    pub fn agents(&self) -> usize {
        self.agents
    }

    /// Number of slots (D).
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Total number of variables, `N·D`.
    pub fn num_variables(&self) -> usize {
        self.agents * self.slots
    }

    /// Flat index of `x[agent, slot]`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if either coordinate is out of range.
    pub fn index(&self, agent: usize, slot: usize) -> usize {
        debug_assert!(agent < self.agents && slot < self.slots);
        agent * self.slots + slot
    }

    /// Inverse of [`index`](Self::index).
    pub fn label(&self, index: usize) -> VariableLabel {
        VariableLabel {
            agent: index / self.slots,
            slot: index % self.slots,
        }
    }

    /// All labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = VariableLabel> + '_ {
        (0..self.num_variables()).map(|i| self.label(i))
    }

    /// Indices of every agent's variable for one slot (a grid column).
    pub fn slot_group(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.agents).map(move |n| self.index(n, slot))
    }

    /// Indices of every slot variable for one agent (a grid row).
    pub fn agent_group(&self, agent: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.slots).map(move |d| self.index(agent, d))
    }

    /// Selected slots per agent.
    pub fn decode(&self, state: &[u8]) -> ModelResult<Vec<Vec<usize>>> {
        check_state(state, self.num_variables())?;
        Ok((0..self.agents)
            .map(|n| {
                (0..self.slots)
                    .filter(|&d| state[self.index(n, d)] == 1)
                    .collect()
            })
            .collect())
    }

    /// True when every row and every column of the grid selects exactly one
    /// variable, i.e. both exclusivity terms vanish.
    pub fn is_feasible(&self, state: &[u8]) -> ModelResult<bool> {
        check_state(state, self.num_variables())?;
        let rows_ok = (0..self.agents).all(|n| {
            self.agent_group(n)
                .map(|i| usize::from(state[i]))
                .sum::<usize>()
                == 1
        });
        let cols_ok = (0..self.slots).all(|d| {
            self.slot_group(d)
                .map(|i| usize::from(state[i]))
                .sum::<usize>()
                == 1
        });
        Ok(rows_ok && cols_ok)
    }
}

impl fmt::Display for AssignmentGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.agents, self.slots)
    }
}
