//! Binary quadratic models and the sparse coefficient accumulator that
//! builds them.
//!
//! A model over `x ∈ {0,1}^n` has energy
//!
//!   E(x) = offset + Σ_i h_i·x_i + Σ_{i<j} Q_ij·x_i·x_j
//!
//! Self-pairs fold into the linear vector because `x_i² = x_i`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelResult, check_state};

/// Variable domain of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vartype {
    /// Variables take values in {0, 1}.
    Binary,
}

/// Mutable pair → coefficient map used while compiling an energy function.
#[derive(Debug, Clone)]
pub struct QuboAccumulator {
    linear: Vec<f64>,
    quadratic: BTreeMap<(usize, usize), f64>,
    offset: f64,
}

impl QuboAccumulator {
    /// Start an empty accumulator over `num_variables` variables.
    pub fn new(num_variables: usize) -> Self {
        Self {
            linear: vec![0.0; num_variables],
            quadratic: BTreeMap::new(),
            offset: 0.0,
        }
    }

    /// Add `coeff · x_i`.
    pub fn add_linear(&mut self, i: usize, coeff: f64) {
        self.linear[i] += coeff;
    }

    /// Add `coeff · x_i · x_j`. Keys are canonicalised to `i < j`; `i == j`
    /// is routed to the linear vector.
    pub fn add_quadratic(&mut self, i: usize, j: usize, coeff: f64) {
        if i == j {
            self.add_linear(i, coeff);
            return;
        }
        let key = if i < j { (i, j) } else { (j, i) };
        *self.quadratic.entry(key).or_insert(0.0) += coeff;
    }

    /// Add a constant.
    pub fn add_offset(&mut self, value: f64) {
        self.offset += value;
    }

    /// Add `weight · (Σ_{i∈group} x_i − 1)²`.
    ///
    /// Expanding with `x² = x`: every member gets `−weight`, every unordered
    /// pair gets `+2·weight`, and the constant gets `+weight`.
    pub fn add_squared_sum_minus_one(&mut self, group: &[usize], weight: f64) {
        for (pos, &i) in group.iter().enumerate() {
            self.add_linear(i, -weight);
            for &j in &group[pos + 1..] {
                self.add_quadratic(i, j, 2.0 * weight);
            }
        }
        self.add_offset(weight);
    }

    /// Freeze into an immutable model. Quadratic entries that accumulated to
    /// exactly zero are dropped.
    pub fn build(self) -> BinaryQuadraticModel {
        let quadratic = self
            .quadratic
            .into_iter()
            .filter(|(_, c)| *c != 0.0)
            .collect();
        BinaryQuadraticModel {
            linear: self.linear,
            quadratic,
            offset: self.offset,
        }
    }
}

/// Immutable binary quadratic model.
///
/// Quadratic terms are kept in a `BTreeMap`, so iteration order (and thus
/// every downstream float sum) is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryQuadraticModel {
    linear: Vec<f64>,
    quadratic: BTreeMap<(usize, usize), f64>,
    offset: f64,
}

impl BinaryQuadraticModel {
    /// Always [`Vartype::Binary`].
    pub fn vartype(&self) -> Vartype {
        Vartype::Binary
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    /// Number of non-zero quadratic terms.
    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    /// Linear coefficient of variable `i` (self-pair term).
    pub fn linear(&self, i: usize) -> f64 {
        self.linear.get(i).copied().unwrap_or(0.0)
    }

    /// All linear coefficients in index order.
    pub fn linear_terms(&self) -> &[f64] {
        &self.linear
    }

    /// Quadratic coefficient of `(i, j)` in either order.
    pub fn quadratic(&self, i: usize, j: usize) -> f64 {
        let key = if i < j { (i, j) } else { (j, i) };
        self.quadratic.get(&key).copied().unwrap_or(0.0)
    }

    /// Quadratic terms as `((i, j), coeff)` with `i < j`, ordered by key.
    pub fn interactions(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.quadratic.iter().map(|(&k, &c)| (k, c))
    }

    /// Constant offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Largest absolute linear or quadratic coefficient.
    pub fn max_abs_coefficient(&self) -> f64 {
        self.linear
            .iter()
            .chain(self.quadratic.values())
            .fold(0.0_f64, |acc, c| acc.max(c.abs()))
    }

    /// Per-variable neighbour lists `(j, Q_ij)`, symmetric.
    pub fn adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); self.num_variables()];
        for (&(i, j), &c) in &self.quadratic {
            adj[i].push((j, c));
            adj[j].push((i, c));
        }
        adj
    }

    /// Energy of a binary state.
    pub fn energy(&self, state: &[u8]) -> ModelResult<f64> {
        check_state(state, self.num_variables())?;
        let mut e = self.offset;
        for (h, &x) in self.linear.iter().zip(state) {
            if x == 1 {
                e += h;
            }
        }
        for (&(i, j), &c) in &self.quadratic {
            if state[i] == 1 && state[j] == 1 {
                e += c;
            }
        }
        Ok(e)
    }
}
